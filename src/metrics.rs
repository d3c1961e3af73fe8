// Prometheus metrics for the provisioning engine.
// Tracks wizard runs and per-phase failures.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

pub struct Metrics {
    pub registry: Registry,

    pub runs_started_total: IntCounter,
    pub runs_completed_total: IntCounter,
    pub runs_failed_total: IntCounterVec,

    pub ledger_calls_total: IntCounter,
    pub rest_calls_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let runs_started_total = register_int_counter_with_registry!(
            Opts::new("gatewayd_setup_runs_started_total", "Provisioning runs started"),
            registry
        )?;

        let runs_completed_total = register_int_counter_with_registry!(
            Opts::new(
                "gatewayd_setup_runs_completed_total",
                "Provisioning runs completed successfully"
            ),
            registry
        )?;

        let runs_failed_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "gatewayd_setup_runs_failed_total",
                "Provisioning runs failed, by phase"
            ),
            &["phase"],
            registry
        )?;

        let ledger_calls_total = register_int_counter_with_registry!(
            Opts::new("gatewayd_setup_ledger_calls_total", "Ledger API calls issued"),
            registry
        )?;

        let rest_calls_total = register_int_counter_with_registry!(
            Opts::new("gatewayd_setup_rest_calls_total", "Ripple-REST calls issued"),
            registry
        )?;

        Ok(Metrics {
            registry,
            runs_started_total,
            runs_completed_total,
            runs_failed_total,
            ledger_calls_total,
            rest_calls_total,
        })
    }

    pub fn record_failure(&self, phase: &str) {
        self.runs_failed_total.with_label_values(&[phase]).inc();
    }

    /// Export all metrics in Prometheus text format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

// Global metrics instance
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});
