//! Internal metrics.
//!
//! # Metrics
//! - `perfc_batches_total` (counter): publish calls
//! - `perfc_metrics_received_total` (counter): metrics seen across all batches
//! - `perfc_wait_samples_total` (counter): `/wait` metrics, labelled by
//!   whether the `sql` tag was present
//! - `perfc_writer_failures_total` (counter): counter writer errors
//! - `perfc_invalid_log_level_total` (counter): rejected `log-level` values
//! - `perfc_probe_counters_total` (counter): startup probe results by outcome
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder as the global recorder.
///
/// The returned handle renders the current values in text format.
pub fn init_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_batch(metrics: usize) {
    counter!("perfc_batches_total").increment(1);
    counter!("perfc_metrics_received_total").increment(metrics as u64);
}

pub fn record_wait_sample(has_sql: bool) {
    let sql = if has_sql { "present" } else { "missing" };
    counter!("perfc_wait_samples_total", "sql" => sql).increment(1);
}

pub fn record_writer_failure() {
    counter!("perfc_writer_failures_total").increment(1);
}

pub fn record_invalid_log_level() {
    counter!("perfc_invalid_log_level_total").increment(1);
}

pub fn record_probe_outcome(outcome: &'static str) {
    counter!("perfc_probe_counters_total", "outcome" => outcome).increment(1);
}
