use crate::models::SetupRequest;
use crate::secret::ColdWalletSecret;
use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub ripple_rest: RippleRestConfig,
    pub ledger: LedgerConfig,
    pub wizard: WizardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Domain the admin login is derived from (admin@<domain>).
    pub domain: String,
    /// Path of the JSON settings file the wizard persists into.
    pub settings_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RippleRestConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Base URL of the gateway daemon's admin API.
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WizardConfig {
    /// Operator's cold wallet address.
    pub ripple_address: String,
    /// Used only to sign funding and issuance payments.
    pub cold_wallet_secret: String,
    /// Currency code -> issuance limit, limits as decimal strings.
    #[serde(default)]
    pub currencies: HashMap<String, String>,
    /// XRP sent to seed the hot wallet.
    #[serde(with = "rust_decimal::serde::str")]
    pub funding_amount: Decimal,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            // Start with default configuration
            .set_default("gateway.domain", "")?
            .set_default("gateway.settings_path", "config/gatewayd.json")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 5)?
            .set_default("ripple_rest.url", "")?
            .set_default("ripple_rest.timeout_secs", 10)?
            .set_default("ledger.base_url", "http://localhost:5000")?
            .set_default("ledger.timeout_secs", 10)?
            .set_default("wizard.ripple_address", "")?
            .set_default("wizard.cold_wallet_secret", "")?
            .set_default("wizard.funding_amount", "100")?;

        // Add environment-specific config file if it exists
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder
                .add_source(File::with_name(&format!("config/{}", environment)).required(false));
        }

        // Override with environment variables
        builder = builder.add_source(
            Environment::with_prefix("PROVISIONING_ENGINE")
                .separator("__")
                .list_separator(","),
        );

        // Special handling for common env vars
        if let Ok(db_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", db_url)?;
        }

        if let Ok(rest_url) = env::var("RIPPLE_REST_URL") {
            builder = builder.set_override("ripple_rest.url", rest_url)?;
        }

        if let Ok(gatewayd_url) = env::var("GATEWAYD_URL") {
            builder = builder.set_override("ledger.base_url", gatewayd_url)?;
        }

        if let Ok(domain) = env::var("GATEWAY_DOMAIN") {
            builder = builder.set_override("gateway.domain", domain)?;
        }

        if let Ok(address) = env::var("RIPPLE_ADDRESS") {
            builder = builder.set_override("wizard.ripple_address", address)?;
        }

        if let Ok(secret) = env::var("COLD_WALLET_SECRET") {
            builder = builder.set_override("wizard.cold_wallet_secret", secret)?;
        }

        // CURRENCIES=USD:1000,EUR:500
        if let Ok(raw) = env::var("CURRENCIES") {
            for pair in raw.split(',') {
                if let Some((code, limit)) = pair.split_once(':') {
                    builder = builder.set_override(
                        format!("wizard.currencies.{}", code.trim()),
                        limit.trim(),
                    )?;
                }
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Operational sanity checks. Operator-supplied wizard inputs are
    /// deliberately not checked here: those go through the validator,
    /// which reports them as field errors instead of aborting startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.gateway.domain.is_empty() {
            return Err("Gateway domain is required (GATEWAY_DOMAIN)".to_string());
        }

        if self.gateway.settings_path.is_empty() {
            return Err("Settings path cannot be empty".to_string());
        }

        if self.ledger.base_url.is_empty() {
            return Err("Gateway daemon URL is required (GATEWAYD_URL)".to_string());
        }

        if self.ledger.timeout_secs == 0 || self.ripple_rest.timeout_secs == 0 {
            return Err("Timeouts must be greater than zero".to_string());
        }

        if self.wizard.funding_amount <= Decimal::ZERO {
            return Err("Funding amount must be positive".to_string());
        }

        Ok(())
    }

    /// Assemble the raw setup request from the loaded configuration.
    pub fn setup_request(&self) -> SetupRequest {
        SetupRequest {
            currencies: self.wizard.currencies.clone(),
            ripple_address: self.wizard.ripple_address.clone(),
            database_url: self.database.url.clone(),
            ripple_rest_url: self.ripple_rest.url.clone(),
            cold_wallet_secret: ColdWalletSecret::new(self.wizard.cold_wallet_secret.clone()),
        }
    }
}
