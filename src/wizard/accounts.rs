use crate::errors::{FieldError, ProvisioningError, Result};
use crate::ledger_client::{IssuanceInstruction, LedgerGateway};
use crate::models::{AccountSettings, SetupRequest, SetupResult};
use crate::rest_client::RippleRestApi;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Configures both wallets and wires up the gateway's currencies:
/// account flags, one trust line per currency, currency registration
/// and the initial issuance from the cold wallet.
pub struct AccountConfigurator {
    ledger: Arc<dyn LedgerGateway>,
    rest: Arc<dyn RippleRestApi>,
}

impl AccountConfigurator {
    pub fn new(ledger: Arc<dyn LedgerGateway>, rest: Arc<dyn RippleRestApi>) -> Self {
        AccountConfigurator { ledger, rest }
    }

    pub async fn run(&self, request: &SetupRequest, result: &mut SetupResult) -> Result<()> {
        self.apply_account_settings(request, result).await?;

        let currencies = configured_currencies(request)?;
        self.establish_trust_lines(&currencies, result).await?;
        self.register_currencies(&currencies, result).await?;
        self.issue_currencies(request, &currencies, result).await?;

        Ok(())
    }

    /// Push `disallow_xrp` and `require_destination_tag` to the cold
    /// wallet, then the hot wallet, each signed with its own secret.
    /// The hot wallet comes from the in-run result, never from the
    /// settings store, so a stale persisted wallet cannot be used.
    async fn apply_account_settings(
        &self,
        request: &SetupRequest,
        result: &mut SetupResult,
    ) -> Result<()> {
        let settings = AccountSettings::gateway_defaults();

        let cold = self
            .rest
            .update_account_settings(
                &request.ripple_address,
                request.cold_wallet_secret.expose(),
                settings,
            )
            .await;
        match cold {
            Ok(response) if response.success => {
                result.cold_wallet_settings = Some(response.settings.unwrap_or(settings));
                info!("Cold wallet settings applied to {}", request.ripple_address);
            }
            _ => {
                return Err(ProvisioningError::Field(FieldError::new(
                    "ripple_address",
                    "cannot update cold wallet account settings",
                )))
            }
        }

        let hot_wallet = result.hot_wallet.as_ref().ok_or_else(|| {
            ProvisioningError::LedgerApi("hot wallet has not been provisioned".to_string())
        })?;

        let hot = self
            .rest
            .update_account_settings(&hot_wallet.address, &hot_wallet.secret, settings)
            .await;
        match hot {
            Ok(response) if response.success => {
                result.hot_wallet_settings = Some(response.settings.unwrap_or(settings));
                info!("Hot wallet settings applied to {}", hot_wallet.address);
                Ok(())
            }
            _ => Err(ProvisioningError::Field(FieldError::new(
                "ripple_address",
                "cannot update hot wallet account settings",
            ))),
        }
    }

    /// One trust line per configured currency. Calls are dispatched
    /// concurrently and every completion is awaited; confirmations
    /// that did arrive are merged into the result before the first
    /// error (if any) fails the step.
    async fn establish_trust_lines(
        &self,
        currencies: &[(String, Decimal)],
        result: &mut SetupResult,
    ) -> Result<()> {
        let calls = currencies
            .iter()
            .map(|(currency, limit)| self.ledger.set_trust_line(currency, *limit));
        let outcomes = join_all(calls).await;

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(line) => result.trust_lines.push(line),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        match first_error {
            None => {
                info!("Established {} trust line(s)", result.trust_lines.len());
                Ok(())
            }
            Some(error) => Err(error),
        }
    }

    async fn register_currencies(
        &self,
        currencies: &[(String, Decimal)],
        result: &mut SetupResult,
    ) -> Result<()> {
        let calls = currencies
            .iter()
            .map(|(currency, limit)| self.ledger.add_currency(currency, *limit));
        let outcomes = join_all(calls).await;

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(registration) => result.currencies.push(registration),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    /// One issuance payment per configured currency, each with that
    /// currency's own code and limit.
    async fn issue_currencies(
        &self,
        request: &SetupRequest,
        currencies: &[(String, Decimal)],
        result: &mut SetupResult,
    ) -> Result<()> {
        let calls = currencies.iter().map(|(currency, limit)| {
            self.ledger.issue_currency(IssuanceInstruction {
                amount: *limit,
                currency: currency.clone(),
                secret: request.cold_wallet_secret.clone(),
                destination_tag: 0,
            })
        });
        let outcomes = join_all(calls).await;

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(receipt) => result.currencies_issued.push(receipt),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        match first_error {
            None => {
                info!("Issued {} currenc(ies)", result.currencies_issued.len());
                Ok(())
            }
            Some(error) => Err(error),
        }
    }
}

/// Parse the validated currency map into (code, limit) pairs.
fn configured_currencies(request: &SetupRequest) -> Result<Vec<(String, Decimal)>> {
    request
        .currencies
        .iter()
        .map(|(currency, raw_limit)| {
            Decimal::from_str(raw_limit.trim())
                .map(|limit| (currency.clone(), limit))
                .map_err(|_| {
                    ProvisioningError::Field(FieldError::new(
                        "currency_limit",
                        "please provide a valid currency limit amount",
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger_client::MockLedgerGateway;
    use crate::models::{CurrencyRegistration, IssuanceReceipt, TrustLine, Wallet};
    use crate::rest_client::{MockRippleRestApi, SettingsResponse};
    use crate::secret::ColdWalletSecret;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn request_with(currencies: &[(&str, &str)]) -> SetupRequest {
        let currencies = currencies
            .iter()
            .map(|(code, limit)| (code.to_string(), limit.to_string()))
            .collect::<HashMap<_, _>>();
        SetupRequest {
            currencies,
            ripple_address: "rKXCummUHnenhYudNb9UoJ4mGBR75vFcgz".to_string(),
            database_url: "postgres://localhost/gatewayd".to_string(),
            ripple_rest_url: "http://localhost:5990".to_string(),
            cold_wallet_secret: ColdWalletSecret::new("sCOLD"),
        }
    }

    fn result_with_hot_wallet() -> SetupResult {
        SetupResult {
            hot_wallet: Some(Wallet {
                address: "rHotWa11etAddre55ForGateway1234".to_string(),
                secret: "sHOT".to_string(),
            }),
            ..SetupResult::default()
        }
    }

    fn accepting_rest() -> MockRippleRestApi {
        let mut rest = MockRippleRestApi::new();
        rest.expect_update_account_settings()
            .returning(|_, _, settings| {
                Ok(SettingsResponse {
                    success: true,
                    settings: Some(settings),
                })
            });
        rest
    }

    #[tokio::test]
    async fn one_trust_line_per_currency() {
        let mut ledger = MockLedgerGateway::new();
        ledger.expect_set_trust_line().returning(|currency, limit| {
            Ok(TrustLine {
                currency: currency.to_string(),
                limit,
            })
        });
        ledger.expect_add_currency().returning(|currency, limit| {
            Ok(CurrencyRegistration {
                currency: currency.to_string(),
                limit,
            })
        });
        ledger.expect_issue_currency().returning(|instruction| {
            Ok(IssuanceReceipt {
                currency: instruction.currency,
                amount: instruction.amount,
                hash: None,
            })
        });

        let configurator =
            AccountConfigurator::new(Arc::new(ledger), Arc::new(accepting_rest()));
        let request = request_with(&[("USD", "1000"), ("EUR", "500"), ("BTC", "10")]);
        let mut result = result_with_hot_wallet();
        configurator.run(&request, &mut result).await.unwrap();

        assert_eq!(result.trust_lines.len(), 3);
        let mut lines = result.trust_lines.clone();
        lines.sort_by(|a, b| a.currency.cmp(&b.currency));
        assert_eq!(
            lines,
            vec![
                TrustLine { currency: "BTC".to_string(), limit: dec!(10) },
                TrustLine { currency: "EUR".to_string(), limit: dec!(500) },
                TrustLine { currency: "USD".to_string(), limit: dec!(1000) },
            ]
        );
        assert_eq!(result.currencies.len(), 3);
    }

    #[tokio::test]
    async fn every_currency_is_issued_with_its_own_amount() {
        let issued: Arc<Mutex<Vec<(String, Decimal)>>> = Arc::new(Mutex::new(Vec::new()));
        let issued_clone = issued.clone();

        let mut ledger = MockLedgerGateway::new();
        ledger.expect_set_trust_line().returning(|currency, limit| {
            Ok(TrustLine {
                currency: currency.to_string(),
                limit,
            })
        });
        ledger.expect_add_currency().returning(|currency, limit| {
            Ok(CurrencyRegistration {
                currency: currency.to_string(),
                limit,
            })
        });
        ledger.expect_issue_currency().returning(move |instruction| {
            issued_clone
                .lock()
                .unwrap()
                .push((instruction.currency.clone(), instruction.amount));
            Ok(IssuanceReceipt {
                currency: instruction.currency,
                amount: instruction.amount,
                hash: None,
            })
        });

        let configurator =
            AccountConfigurator::new(Arc::new(ledger), Arc::new(accepting_rest()));
        let request = request_with(&[("USD", "1000"), ("EUR", "500")]);
        let mut result = result_with_hot_wallet();
        configurator.run(&request, &mut result).await.unwrap();

        let mut calls = issued.lock().unwrap().clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("EUR".to_string(), dec!(500)),
                ("USD".to_string(), dec!(1000)),
            ]
        );
        assert_eq!(result.currencies_issued.len(), 2);
    }

    #[tokio::test]
    async fn cold_wallet_settings_failure_is_field_scoped() {
        let ledger = MockLedgerGateway::new();
        let mut rest = MockRippleRestApi::new();
        rest.expect_update_account_settings().returning(|_, _, _| {
            Ok(SettingsResponse {
                success: false,
                settings: None,
            })
        });

        let configurator = AccountConfigurator::new(Arc::new(ledger), Arc::new(rest));
        let request = request_with(&[("USD", "1000")]);
        let mut result = result_with_hot_wallet();
        let error = configurator.run(&request, &mut result).await.unwrap_err();

        match error {
            ProvisioningError::Field(field_error) => {
                assert_eq!(field_error.field, "ripple_address");
                assert_eq!(field_error.message, "cannot update cold wallet account settings");
            }
            other => panic!("expected field error, got {:?}", other),
        }
        assert!(result.cold_wallet_settings.is_none());
        assert!(result.hot_wallet_settings.is_none());
    }

    #[tokio::test]
    async fn partial_trust_line_failure_keeps_completed_lines() {
        let mut ledger = MockLedgerGateway::new();
        ledger.expect_set_trust_line().returning(|currency, limit| {
            if currency == "EUR" {
                Err(ProvisioningError::LedgerApi("trust line rejected".to_string()))
            } else {
                Ok(TrustLine {
                    currency: currency.to_string(),
                    limit,
                })
            }
        });
        ledger.expect_add_currency().never();
        ledger.expect_issue_currency().never();

        let configurator =
            AccountConfigurator::new(Arc::new(ledger), Arc::new(accepting_rest()));
        let request = request_with(&[("USD", "1000"), ("EUR", "500")]);
        let mut result = result_with_hot_wallet();
        let error = configurator.run(&request, &mut result).await.unwrap_err();

        assert!(error.to_string().contains("trust line rejected"));
        // The USD line that completed is still visible in the partial result.
        assert_eq!(result.trust_lines.len(), 1);
        assert_eq!(result.trust_lines[0].currency, "USD");
    }
}
