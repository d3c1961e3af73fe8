//! In-memory fakes for the wizard's external collaborators.

use async_trait::async_trait;
use provisioning_engine::database::DatabaseProbe;
use provisioning_engine::errors::{ProvisioningError, Result};
use provisioning_engine::ledger_client::{
    FundingInstruction, IssuanceInstruction, LedgerGateway, PaymentReceipt,
};
use provisioning_engine::models::{
    AccountSettings, CurrencyRegistration, IssuanceReceipt, TrustLine, Wallet,
};
use provisioning_engine::rest_client::{
    BalanceEntry, BalanceResponse, PingResponse, RippleRestApi, SettingsResponse,
};
use provisioning_engine::settings_store::SettingsStore;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const HOT_ADDRESS: &str = "rHotWa11etAddre55ForGateway1234";
pub const HOT_SECRET: &str = "shHOTWALLETSECRETXXXXXXXXXX";
pub const FUNDING_HASH: &str = "F00D00000000000000000000000000000000000000000000000000000000BEEF";

/// Ledger gateway fake that records every call it receives.
#[derive(Default)]
pub struct FakeLedger {
    pub fail_funding: bool,
    pub cold_wallet_calls: Mutex<u32>,
    pub issued: Mutex<Vec<(String, Decimal)>>,
    pub last_payment_hash: Mutex<Option<String>>,
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn set_cold_wallet(&self, address: &str) -> Result<String> {
        *self.cold_wallet_calls.lock().unwrap() += 1;
        Ok(address.to_string())
    }

    async fn generate_wallet(&self) -> Result<Wallet> {
        Ok(Wallet {
            address: HOT_ADDRESS.to_string(),
            secret: HOT_SECRET.to_string(),
        })
    }

    async fn set_hot_wallet(&self, address: &str, secret: &str) -> Result<Wallet> {
        Ok(Wallet {
            address: address.to_string(),
            secret: secret.to_string(),
        })
    }

    async fn fund_hot_wallet(&self, _instruction: FundingInstruction) -> Result<PaymentReceipt> {
        if self.fail_funding {
            return Err(ProvisioningError::LedgerApi(
                "funding payment rejected by ledger".to_string(),
            ));
        }
        Ok(PaymentReceipt {
            hash: FUNDING_HASH.to_string(),
        })
    }

    async fn set_trust_line(&self, currency: &str, limit: Decimal) -> Result<TrustLine> {
        Ok(TrustLine {
            currency: currency.to_string(),
            limit,
        })
    }

    async fn add_currency(&self, currency: &str, limit: Decimal) -> Result<CurrencyRegistration> {
        Ok(CurrencyRegistration {
            currency: currency.to_string(),
            limit,
        })
    }

    async fn issue_currency(&self, instruction: IssuanceInstruction) -> Result<IssuanceReceipt> {
        self.issued
            .lock()
            .unwrap()
            .push((instruction.currency.clone(), instruction.amount));
        Ok(IssuanceReceipt {
            currency: instruction.currency,
            amount: instruction.amount,
            hash: None,
        })
    }

    async fn set_ripple_rest_url(&self, url: &str) -> Result<String> {
        Ok(url.to_string())
    }

    async fn set_key(&self) -> Result<String> {
        Ok("generated-admin-key".to_string())
    }

    async fn set_last_payment_hash(&self, hash: &str) -> Result<String> {
        *self.last_payment_hash.lock().unwrap() = Some(hash.to_string());
        Ok(hash.to_string())
    }
}

/// Ripple-REST fake with a configurable cold wallet balance.
pub struct FakeRippleRest {
    pub balance: Decimal,
}

impl FakeRippleRest {
    pub fn with_balance(balance: Decimal) -> Self {
        FakeRippleRest { balance }
    }
}

#[async_trait]
impl RippleRestApi for FakeRippleRest {
    async fn update_account_settings(
        &self,
        _account: &str,
        _secret: &str,
        settings: AccountSettings,
    ) -> Result<SettingsResponse> {
        Ok(SettingsResponse {
            success: true,
            settings: Some(settings),
        })
    }

    async fn ping(&self) -> Result<PingResponse> {
        Ok(PingResponse { success: true })
    }

    async fn get_account_balance(&self, _address: &str) -> Result<BalanceResponse> {
        Ok(BalanceResponse {
            success: true,
            message: None,
            balances: vec![BalanceEntry {
                currency: "XRP".to_string(),
                value: self.balance,
            }],
        })
    }
}

/// Settings store backed by a plain map, no disk involved.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    async fn save(&self) -> Result<()> {
        Ok(())
    }
}

pub struct HealthyDatabase;

#[async_trait]
impl DatabaseProbe for HealthyDatabase {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }
}
