use crate::database::DatabaseProbe;
use crate::errors::{FieldError, ProvisioningError, Result};
use crate::rest_client::{BalanceEntry, RippleRestApi};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Read-only verification that the systems the gateway depends on are
/// reachable and that the cold wallet holds enough XRP to operate.
pub struct HealthVerifier {
    rest: Arc<dyn RippleRestApi>,
    db: Arc<dyn DatabaseProbe>,
}

impl HealthVerifier {
    pub fn new(rest: Arc<dyn RippleRestApi>, db: Arc<dyn DatabaseProbe>) -> Self {
        HealthVerifier { rest, db }
    }

    /// Runs the three checks in issue order, stopping at the first
    /// failure. Returns the balance entry used for the funding check.
    pub async fn run(&self, cold_wallet_address: &str) -> Result<BalanceEntry> {
        self.verify_database().await?;
        self.verify_ripple_rest().await?;
        self.check_account_balance(cold_wallet_address).await
    }

    async fn verify_database(&self) -> Result<()> {
        self.db.authenticate().await.map_err(|error| {
            warn!("Database authentication failed: {}", error);
            ProvisioningError::Field(FieldError::new("database_url", "database is not connected"))
        })
    }

    async fn verify_ripple_rest(&self) -> Result<()> {
        match self.rest.ping().await {
            Ok(response) if response.success => {
                info!("Ripple-REST is up");
                Ok(())
            }
            _ => Err(ProvisioningError::Field(FieldError::new(
                "ripple_rest_url",
                "ripple rest is not running",
            ))),
        }
    }

    /// The cold wallet must hold at least 100 XRP so it can cover
    /// reserve requirements and transaction fees.
    async fn check_account_balance(&self, address: &str) -> Result<BalanceEntry> {
        let balance = self.rest.get_account_balance(address).await.map_err(|_| {
            ProvisioningError::Field(FieldError::new(
                "ripple_address",
                "account balance not available",
            ))
        })?;

        if !balance.success {
            let message = balance
                .message
                .unwrap_or_else(|| "account balance not available".to_string());
            return Err(ProvisioningError::Field(FieldError::new(
                "ripple_address",
                message,
            )));
        }

        let entry = balance.balances.into_iter().next().ok_or_else(|| {
            ProvisioningError::Field(FieldError::new(
                "ripple_address",
                "account balance not available",
            ))
        })?;

        if entry.value < Decimal::ONE_HUNDRED {
            return Err(ProvisioningError::Field(FieldError::new(
                "ripple_address",
                "account balance must be at least 100 XRP",
            )));
        }

        info!("Cold wallet balance check passed: {} XRP", entry.value);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockDatabaseProbe;
    use crate::rest_client::{BalanceResponse, MockRippleRestApi, PingResponse};
    use rust_decimal_macros::dec;

    const COLD_ADDRESS: &str = "rKXCummUHnenhYudNb9UoJ4mGBR75vFcgz";

    fn healthy_db() -> MockDatabaseProbe {
        let mut db = MockDatabaseProbe::new();
        db.expect_authenticate().returning(|| Ok(()));
        db
    }

    fn rest_with_balance(value: Decimal) -> MockRippleRestApi {
        let mut rest = MockRippleRestApi::new();
        rest.expect_ping()
            .returning(|| Ok(PingResponse { success: true }));
        rest.expect_get_account_balance().returning(move |_| {
            Ok(BalanceResponse {
                success: true,
                message: None,
                balances: vec![BalanceEntry {
                    currency: "XRP".to_string(),
                    value,
                }],
            })
        });
        rest
    }

    #[tokio::test]
    async fn balance_of_99_fails_with_minimum_message() {
        let verifier = HealthVerifier::new(
            Arc::new(rest_with_balance(dec!(99))),
            Arc::new(healthy_db()),
        );
        let error = verifier.run(COLD_ADDRESS).await.unwrap_err();
        match error {
            ProvisioningError::Field(e) => {
                assert_eq!(e.field, "ripple_address");
                assert_eq!(e.message, "account balance must be at least 100 XRP");
            }
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn balance_of_exactly_100_passes() {
        let verifier = HealthVerifier::new(
            Arc::new(rest_with_balance(dec!(100))),
            Arc::new(healthy_db()),
        );
        let entry = verifier.run(COLD_ADDRESS).await.unwrap();
        assert_eq!(entry.value, dec!(100));
        assert_eq!(entry.currency, "XRP");
    }

    #[tokio::test]
    async fn unreachable_database_is_a_database_url_error() {
        let mut db = MockDatabaseProbe::new();
        db.expect_authenticate().returning(|| {
            Err(ProvisioningError::LedgerApi("connection refused".to_string()))
        });
        let mut rest = MockRippleRestApi::new();
        rest.expect_ping().never();

        let verifier = HealthVerifier::new(Arc::new(rest), Arc::new(db));
        let error = verifier.run(COLD_ADDRESS).await.unwrap_err();
        match error {
            ProvisioningError::Field(e) => {
                assert_eq!(e.field, "database_url");
                assert_eq!(e.message, "database is not connected");
            }
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rest_non_success_is_a_rest_url_error() {
        let mut rest = MockRippleRestApi::new();
        rest.expect_ping()
            .returning(|| Ok(PingResponse { success: false }));
        rest.expect_get_account_balance().never();

        let verifier = HealthVerifier::new(Arc::new(rest), Arc::new(healthy_db()));
        let error = verifier.run(COLD_ADDRESS).await.unwrap_err();
        assert_eq!(error.field(), Some("ripple_rest_url"));
    }

    #[tokio::test]
    async fn upstream_balance_message_is_forwarded() {
        let mut rest = MockRippleRestApi::new();
        rest.expect_ping()
            .returning(|| Ok(PingResponse { success: true }));
        rest.expect_get_account_balance().returning(|_| {
            Ok(BalanceResponse {
                success: false,
                message: Some("account not found".to_string()),
                balances: vec![],
            })
        });

        let verifier = HealthVerifier::new(Arc::new(rest), Arc::new(healthy_db()));
        let error = verifier.run(COLD_ADDRESS).await.unwrap_err();
        match error {
            ProvisioningError::Field(e) => assert_eq!(e.message, "account not found"),
            other => panic!("expected field error, got {:?}", other),
        }
    }
}
