use crate::errors::Result;
use crate::ledger_client::{FundingInstruction, LedgerGateway};
use crate::models::{SetupRequest, SetupResult, NATIVE_CURRENCY};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Provisions the wallet pair: registers the operator's cold wallet,
/// generates and registers a hot wallet, seeds it with XRP from the
/// cold wallet. Steps are strictly ordered; the first failure aborts
/// the rest and propagates untouched.
pub struct WalletProvisioner {
    ledger: Arc<dyn LedgerGateway>,
    funding_amount: Decimal,
}

impl WalletProvisioner {
    pub fn new(ledger: Arc<dyn LedgerGateway>, funding_amount: Decimal) -> Self {
        WalletProvisioner {
            ledger,
            funding_amount,
        }
    }

    pub async fn run(&self, request: &SetupRequest, result: &mut SetupResult) -> Result<()> {
        info!("Registering cold wallet {}", request.ripple_address);
        self.ledger.set_cold_wallet(&request.ripple_address).await?;

        let generated = self.ledger.generate_wallet().await?;
        info!("Generated hot wallet {}", generated.address);

        let hot_wallet = self
            .ledger
            .set_hot_wallet(&generated.address, &generated.secret)
            .await?;
        result.hot_wallet = Some(hot_wallet);

        let instruction = FundingInstruction {
            amount: self.funding_amount,
            currency: NATIVE_CURRENCY.to_string(),
            secret: request.cold_wallet_secret.clone(),
            destination_tag: 0,
        };
        let payment = self.ledger.fund_hot_wallet(instruction).await?;
        info!(
            "Hot wallet funded with {} {}, payment hash {}",
            self.funding_amount, NATIVE_CURRENCY, payment.hash
        );
        result.hash = Some(payment.hash.clone());

        // Marker the gateway polls deposits from.
        self.ledger.set_last_payment_hash(&payment.hash).await?;

        Ok(())
    }
}
