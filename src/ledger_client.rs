use crate::errors::{ProvisioningError, Result};
use crate::metrics::METRICS;
use crate::models::{CurrencyRegistration, IssuanceReceipt, TrustLine, Wallet};
use crate::secret::ColdWalletSecret;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Payment instruction for seeding the hot wallet from the cold wallet.
#[derive(Debug, Clone)]
pub struct FundingInstruction {
    pub amount: Decimal,
    pub currency: String,
    pub secret: ColdWalletSecret,
    pub destination_tag: u32,
}

/// Issuance payment from the cold wallet onto a trust line.
#[derive(Debug, Clone)]
pub struct IssuanceInstruction {
    pub amount: Decimal,
    pub currency: String,
    pub secret: ColdWalletSecret,
    pub destination_tag: u32,
}

/// Confirmation of a submitted ledger payment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub hash: String,
}

/// Administrative API of the gateway daemon: wallet registration,
/// trust lines, currency issuance and derived configuration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn set_cold_wallet(&self, address: &str) -> Result<String>;
    async fn generate_wallet(&self) -> Result<Wallet>;
    async fn set_hot_wallet(&self, address: &str, secret: &str) -> Result<Wallet>;
    async fn fund_hot_wallet(&self, instruction: FundingInstruction) -> Result<PaymentReceipt>;
    async fn set_trust_line(&self, currency: &str, limit: Decimal) -> Result<TrustLine>;
    async fn add_currency(&self, currency: &str, limit: Decimal) -> Result<CurrencyRegistration>;
    async fn issue_currency(&self, instruction: IssuanceInstruction) -> Result<IssuanceReceipt>;
    async fn set_ripple_rest_url(&self, url: &str) -> Result<String>;
    /// Generate and persist a fresh administrative key, returning it.
    async fn set_key(&self) -> Result<String>;
    async fn set_last_payment_hash(&self, hash: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct SetWalletBody<'a> {
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FundPaymentBody<'a> {
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    currency: &'a str,
    secret: &'a str,
    destination_tag: u32,
}

#[derive(Debug, Serialize)]
struct CurrencyBody<'a> {
    currency: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    limit: Decimal,
}

#[derive(Debug, Serialize)]
struct ValueBody<'a> {
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    address: String,
}

#[derive(Debug, Deserialize)]
struct FundResponse {
    transaction: PaymentReceipt,
}

#[derive(Debug, Deserialize)]
struct ValueResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: String,
}

/// HTTP client for the gateway daemon's admin API.
pub struct GatewaydClient {
    base_url: String,
    client: Client,
}

impl GatewaydClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap();

        GatewaydClient { base_url, client }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        METRICS.ledger_calls_total.inc();

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            error!("Ledger API request to {} failed: {}", path, e);
            ProvisioningError::LedgerApi(format!("request to {} failed: {}", path, e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProvisioningError::LedgerApi(format!(
                "{} returned status {}: {}",
                path, status, error_text
            )));
        }

        response.json::<R>().await.map_err(|e| {
            ProvisioningError::LedgerApi(format!("cannot parse response from {}: {}", path, e))
        })
    }
}

#[async_trait]
impl LedgerGateway for GatewaydClient {
    async fn set_cold_wallet(&self, address: &str) -> Result<String> {
        let body = SetWalletBody {
            address,
            secret: None,
        };
        let response: AddressResponse = self.post("/v1/wallets/cold", &body).await?;
        info!("Cold wallet registered: {}", response.address);
        Ok(response.address)
    }

    async fn generate_wallet(&self) -> Result<Wallet> {
        let wallet: Wallet = self.post("/v1/wallets/generate", &()).await?;
        info!("Generated wallet {}", wallet.address);
        Ok(wallet)
    }

    async fn set_hot_wallet(&self, address: &str, secret: &str) -> Result<Wallet> {
        let body = SetWalletBody {
            address,
            secret: Some(secret),
        };
        let wallet: Wallet = self.post("/v1/wallets/hot", &body).await?;
        info!("Hot wallet registered: {}", wallet.address);
        Ok(wallet)
    }

    async fn fund_hot_wallet(&self, instruction: FundingInstruction) -> Result<PaymentReceipt> {
        let body = FundPaymentBody {
            amount: instruction.amount,
            currency: &instruction.currency,
            secret: instruction.secret.expose(),
            destination_tag: instruction.destination_tag,
        };
        let response: FundResponse = self.post("/v1/wallets/hot/fund", &body).await?;
        info!(
            "Hot wallet funded with {} {}, hash {}",
            instruction.amount, instruction.currency, response.transaction.hash
        );
        Ok(response.transaction)
    }

    async fn set_trust_line(&self, currency: &str, limit: Decimal) -> Result<TrustLine> {
        let body = CurrencyBody { currency, limit };
        let line: TrustLine = self.post("/v1/trust_lines", &body).await?;
        info!("Trust line set for {} limit {}", line.currency, line.limit);
        Ok(line)
    }

    async fn add_currency(&self, currency: &str, limit: Decimal) -> Result<CurrencyRegistration> {
        let body = CurrencyBody { currency, limit };
        self.post("/v1/currencies", &body).await
    }

    async fn issue_currency(&self, instruction: IssuanceInstruction) -> Result<IssuanceReceipt> {
        let body = FundPaymentBody {
            amount: instruction.amount,
            currency: &instruction.currency,
            secret: instruction.secret.expose(),
            destination_tag: instruction.destination_tag,
        };
        let receipt: IssuanceReceipt = self.post("/v1/currencies/issue", &body).await?;
        info!("Issued {} {}", receipt.amount, receipt.currency);
        Ok(receipt)
    }

    async fn set_ripple_rest_url(&self, url: &str) -> Result<String> {
        let body = ValueBody { value: url };
        let response: ValueResponse = self.post("/v1/config/ripple_rest", &body).await?;
        Ok(response.value)
    }

    async fn set_key(&self) -> Result<String> {
        // The key is generated client-side and pushed to the daemon so
        // the operator sees exactly what was stored.
        let key: String = {
            let mut rng = rand::thread_rng();
            (0..32).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
        };

        let body = ValueBody { value: &key };
        let response: KeyResponse = self.post("/v1/config/key", &body).await?;
        Ok(response.key)
    }

    async fn set_last_payment_hash(&self, hash: &str) -> Result<String> {
        let body = ValueBody { value: hash };
        let response: ValueResponse = self.post("/v1/config/last_payment_hash", &body).await?;
        Ok(response.value)
    }
}
