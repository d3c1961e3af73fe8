use crate::errors::{ProvisioningError, Result};
use crate::ledger_client::LedgerGateway;
use crate::models::{AdminCredentials, SetupRequest, SetupResult};
use crate::settings_store::SettingsStore;
use std::sync::Arc;
use tracing::info;

pub const DATABASE_URL_KEY: &str = "DATABASE_URL";

/// Persists derived configuration: the Ripple-REST URL, the database
/// URL (written, flushed, then read back to confirm durability) and a
/// freshly generated administrator credential.
pub struct ConfigPersister {
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn SettingsStore>,
    domain: String,
}

impl ConfigPersister {
    pub fn new(ledger: Arc<dyn LedgerGateway>, store: Arc<dyn SettingsStore>, domain: String) -> Self {
        ConfigPersister {
            ledger,
            store,
            domain,
        }
    }

    pub async fn run(&self, request: &SetupRequest, result: &mut SetupResult) -> Result<()> {
        let rest_url = self.ledger.set_ripple_rest_url(&request.ripple_rest_url).await?;
        result.ripple_rest_url = Some(rest_url);

        self.store.set(DATABASE_URL_KEY, &request.database_url).await;
        self.store.save().await?;
        let stored = self.store.get(DATABASE_URL_KEY).await.ok_or_else(|| {
            ProvisioningError::Persistence(format!("{} missing after save", DATABASE_URL_KEY))
        })?;
        result.database_url = Some(stored);

        let key = self.ledger.set_key().await?;
        let username = format!("admin@{}", self.domain);
        info!("Generated admin credential for {}", username);
        result.admin_login = Some(AdminCredentials {
            username,
            password: key,
        });

        Ok(())
    }
}
