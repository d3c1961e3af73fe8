use crate::errors::{ProvisioningError, Result};
use crate::metrics::METRICS;
use crate::models::AccountSettings;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: Option<AccountSettings>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PingResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

/// Ripple-REST surface the wizard needs: account settings updates,
/// a liveness probe and the cold wallet balance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RippleRestApi: Send + Sync {
    async fn update_account_settings(
        &self,
        account: &str,
        secret: &str,
        settings: AccountSettings,
    ) -> Result<SettingsResponse>;

    async fn ping(&self) -> Result<PingResponse>;

    async fn get_account_balance(&self, address: &str) -> Result<BalanceResponse>;
}

#[derive(Debug, Serialize)]
struct UpdateSettingsBody<'a> {
    secret: &'a str,
    settings: AccountSettings,
}

/// HTTP client for a Ripple-REST server.
pub struct RippleRestClient {
    base_url: String,
    client: Client,
}

impl RippleRestClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap();

        RippleRestClient { base_url, client }
    }
}

#[async_trait]
impl RippleRestApi for RippleRestClient {
    async fn update_account_settings(
        &self,
        account: &str,
        secret: &str,
        settings: AccountSettings,
    ) -> Result<SettingsResponse> {
        let url = format!("{}/v1/accounts/{}/settings", self.base_url, account);
        let body = UpdateSettingsBody { secret, settings };
        METRICS.rest_calls_total.inc();

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!("Settings update for {} failed: {}", account, e);
            ProvisioningError::RestGateway(format!("settings update failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProvisioningError::RestGateway(format!(
                "settings update returned status {}: {}",
                status, error_text
            )));
        }

        let parsed = response.json::<SettingsResponse>().await.map_err(|e| {
            ProvisioningError::RestGateway(format!("cannot parse settings response: {}", e))
        })?;

        info!("Account settings updated for {}", account);
        Ok(parsed)
    }

    async fn ping(&self) -> Result<PingResponse> {
        let url = format!("{}/v1/server/connected", self.base_url);
        METRICS.rest_calls_total.inc();

        let response = self.client.get(&url).send().await.map_err(|e| {
            ProvisioningError::RestGateway(format!("ping failed: {}", e))
        })?;

        response.json::<PingResponse>().await.map_err(|e| {
            ProvisioningError::RestGateway(format!("cannot parse ping response: {}", e))
        })
    }

    async fn get_account_balance(&self, address: &str) -> Result<BalanceResponse> {
        let url = format!("{}/v1/accounts/{}/balances", self.base_url, address);
        METRICS.rest_calls_total.inc();

        let response = self.client.get(&url).send().await.map_err(|e| {
            ProvisioningError::RestGateway(format!("balance request failed: {}", e))
        })?;

        response.json::<BalanceResponse>().await.map_err(|e| {
            ProvisioningError::RestGateway(format!("cannot parse balance response: {}", e))
        })
    }
}
