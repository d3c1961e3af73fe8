// Setup wizard - drives the one-time gateway provisioning sequence.

pub mod accounts;
pub mod health;
pub mod persist;
pub mod wallet;

use crate::database::DatabaseProbe;
use crate::errors::{FieldError, ProvisioningError};
use crate::ledger_client::LedgerGateway;
use crate::metrics::METRICS;
use crate::models::{SetupRequest, SetupResult};
use crate::rest_client::RippleRestApi;
use crate::settings_store::SettingsStore;
use crate::validation::validate_request;
use accounts::AccountConfigurator;
use health::HealthVerifier;
use persist::ConfigPersister;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use wallet::WalletProvisioner;

/// Phases of a provisioning run, in execution order. A run advances
/// to the next phase only when the current one succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Validating,
    Provisioning,
    Configuring,
    Persisting,
    Verifying,
    Complete,
}

impl WizardPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardPhase::Validating => "validating",
            WizardPhase::Provisioning => "provisioning",
            WizardPhase::Configuring => "configuring",
            WizardPhase::Persisting => "persisting",
            WizardPhase::Verifying => "verifying",
            WizardPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-visible outcome of one run.
#[derive(Debug)]
pub enum SetupOutcome {
    /// Input validation failed; nothing was executed. The list is
    /// complete, not just the first problem found.
    Invalid(Vec<FieldError>),
    /// A phase failed. `partial` holds whatever earlier steps
    /// recorded and is for diagnostics only - it must not be treated
    /// as valid gateway state.
    Failed {
        phase: WizardPhase,
        error: ProvisioningError,
        partial: SetupResult,
    },
    Complete(SetupResult),
}

/// Orchestrates the provisioning sequence. Owns the single
/// `SetupResult` for a run and threads it through each phase; no
/// phase is retried or compensated, the first failure ends the run.
pub struct SetupWizard {
    ledger: Arc<dyn LedgerGateway>,
    rest: Arc<dyn RippleRestApi>,
    store: Arc<dyn SettingsStore>,
    db: Arc<dyn DatabaseProbe>,
    domain: String,
    funding_amount: Decimal,
}

impl SetupWizard {
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        rest: Arc<dyn RippleRestApi>,
        store: Arc<dyn SettingsStore>,
        db: Arc<dyn DatabaseProbe>,
        domain: String,
        funding_amount: Decimal,
    ) -> Self {
        SetupWizard {
            ledger,
            rest,
            store,
            db,
            domain,
            funding_amount,
        }
    }

    pub async fn run(&self, request: SetupRequest) -> SetupOutcome {
        info!("Starting gateway provisioning run");
        METRICS.runs_started_total.inc();

        // Phase 1: Validating
        let errors = validate_request(&request);
        if !errors.is_empty() {
            warn!("Input validation failed with {} error(s)", errors.len());
            METRICS.record_failure(WizardPhase::Validating.as_str());
            return SetupOutcome::Invalid(errors);
        }

        let mut result = SetupResult::default();

        // Phase 2: Provisioning
        info!(phase = %WizardPhase::Provisioning, "Provisioning wallets");
        let provisioner = WalletProvisioner::new(self.ledger.clone(), self.funding_amount);
        if let Err(e) = provisioner.run(&request, &mut result).await {
            return self.fail(WizardPhase::Provisioning, e, result);
        }

        // Phase 3: Configuring
        info!(phase = %WizardPhase::Configuring, "Configuring accounts and currencies");
        let configurator = AccountConfigurator::new(self.ledger.clone(), self.rest.clone());
        if let Err(e) = configurator.run(&request, &mut result).await {
            return self.fail(WizardPhase::Configuring, e, result);
        }

        // Phase 4: Persisting
        info!(phase = %WizardPhase::Persisting, "Persisting derived configuration");
        let persister = ConfigPersister::new(
            self.ledger.clone(),
            self.store.clone(),
            self.domain.clone(),
        );
        if let Err(e) = persister.run(&request, &mut result).await {
            return self.fail(WizardPhase::Persisting, e, result);
        }

        // Phase 5: Verifying
        info!(phase = %WizardPhase::Verifying, "Verifying dependent systems");
        let verifier = HealthVerifier::new(self.rest.clone(), self.db.clone());
        if let Err(e) = verifier.run(&request.ripple_address).await {
            return self.fail(WizardPhase::Verifying, e, result);
        }

        METRICS.runs_completed_total.inc();
        info!("Gateway provisioning complete");
        SetupOutcome::Complete(result)
    }

    fn fail(
        &self,
        phase: WizardPhase,
        error: ProvisioningError,
        partial: SetupResult,
    ) -> SetupOutcome {
        error!(phase = %phase, "Provisioning failed: {}", error);
        METRICS.record_failure(phase.as_str());
        SetupOutcome::Failed {
            phase,
            error,
            partial,
        }
    }
}
