use crate::secret::ColdWalletSecret;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ledger-native currency code.
pub const NATIVE_CURRENCY: &str = "XRP";

/// Raw operator input for a provisioning run. Currency limits arrive
/// as strings and are validated as positive decimals before use.
///
/// Not `Serialize`: the embedded cold wallet secret must never be
/// written anywhere.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupRequest {
    pub currencies: HashMap<String, String>,
    pub ripple_address: String,
    pub database_url: String,
    pub ripple_rest_url: String,
    pub cold_wallet_secret: ColdWalletSecret,
}

/// Address/secret pair for the generated hot wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub address: String,
    pub secret: String,
}

/// Account flags pushed to both wallets during configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSettings {
    pub disallow_xrp: bool,
    pub require_destination_tag: bool,
}

impl AccountSettings {
    /// Settings every gateway wallet gets: refuse direct XRP payments
    /// and require destination tags so deposits can be attributed.
    pub fn gateway_defaults() -> Self {
        AccountSettings {
            disallow_xrp: true,
            require_destination_tag: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustLine {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub limit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyRegistration {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub limit: Decimal,
}

/// Confirmation of one issuance payment from the cold wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuanceReceipt {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Accumulated outcome of a provisioning run. Created empty, populated
/// monotonically by each phase that succeeds, owned by the wizard for
/// the duration of the run. Cannot contain the cold wallet secret:
/// that type is not serializable and is never stored here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetupResult {
    pub hot_wallet: Option<Wallet>,
    /// Hash of the funding payment.
    pub hash: Option<String>,
    pub cold_wallet_settings: Option<AccountSettings>,
    pub hot_wallet_settings: Option<AccountSettings>,
    pub trust_lines: Vec<TrustLine>,
    pub currencies: Vec<CurrencyRegistration>,
    pub currencies_issued: Vec<IssuanceReceipt>,
    pub ripple_rest_url: Option<String>,
    pub database_url: Option<String>,
    pub admin_login: Option<AdminCredentials>,
}
