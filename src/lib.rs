pub mod config;
pub mod database;
pub mod errors;
pub mod ledger_client;
pub mod metrics;
pub mod models;
pub mod rest_client;
pub mod secret;
pub mod settings_store;
pub mod validation;
pub mod wizard;

pub use config::Config;
pub use errors::{FieldError, ProvisioningError, Result};
pub use models::{SetupRequest, SetupResult};
pub use wizard::{SetupOutcome, SetupWizard, WizardPhase};
