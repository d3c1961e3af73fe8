use dotenv::dotenv;
use provisioning_engine::{
    config::Config,
    database::PostgresProbe,
    ledger_client::GatewaydClient,
    rest_client::RippleRestClient,
    settings_store::FileSettingsStore,
    wizard::{SetupOutcome, SetupWizard},
};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .json()
        .init();

    info!("Starting Provisioning Engine...");

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    info!("Configuration loaded successfully");

    // Initialize collaborators
    let ledger = Arc::new(GatewaydClient::new(
        config.ledger.base_url.clone(),
        config.ledger.timeout_secs,
    ));
    let rest = Arc::new(RippleRestClient::new(
        config.ripple_rest.url.clone(),
        config.ripple_rest.timeout_secs,
    ));
    let store = Arc::new(
        FileSettingsStore::open(&config.gateway.settings_path)
            .await
            .expect("Failed to open settings store"),
    );
    let db = Arc::new(PostgresProbe::new(
        config.database.url.clone(),
        config.database.max_connections,
    ));

    let wizard = SetupWizard::new(
        ledger,
        rest,
        store,
        db,
        config.gateway.domain.clone(),
        config.wizard.funding_amount,
    );

    match wizard.run(config.setup_request()).await {
        SetupOutcome::Complete(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        SetupOutcome::Invalid(errors) => {
            for e in &errors {
                warn!(field = %e.field, "{}", e.message);
            }
            eprintln!("{}", serde_json::to_string_pretty(&errors)?);
            anyhow::bail!("input validation failed with {} error(s)", errors.len())
        }
        SetupOutcome::Failed {
            phase,
            error,
            partial,
        } => {
            error!(phase = %phase, "Setup did not complete: {}", error);
            // Diagnostic only - a partial result is not valid gateway state.
            eprintln!(
                "partial setup state (non-authoritative):\n{}",
                serde_json::to_string_pretty(&partial)?
            );
            anyhow::bail!("provisioning failed during {}: {}", phase, error)
        }
    }
}
