//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_reloads_total` (counter): reloads by dataset, outcome
//! - `gatekeeper_snapshot_entries` (gauge): entries in the published snapshot
//! - `gatekeeper_invalid_lines_total` (counter): skipped lines by dataset
//! - `gatekeeper_refresh_commands_total` (counter): dispatches by identifier, status

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one dataset reload.
pub fn record_reload(dataset: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("gatekeeper_reloads_total", "dataset" => dataset, "outcome" => outcome).increment(1);
}

/// Record the size of a freshly published snapshot.
pub fn record_snapshot_entries(dataset: &'static str, entries: usize) {
    gauge!("gatekeeper_snapshot_entries", "dataset" => dataset).set(entries as f64);
}

/// Record lines skipped while parsing.
pub fn record_invalid_lines(dataset: &'static str, count: usize) {
    if count > 0 {
        counter!("gatekeeper_invalid_lines_total", "dataset" => dataset).increment(count as u64);
    }
}

/// Label used for refresh commands naming no registered handler.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Record a refresh command and its response status.
///
/// Unregistered identifiers share one label so callers cannot grow the
/// series set.
pub fn record_refresh_command(identifier: &str, registered: bool, status: i32) {
    counter!(
        "gatekeeper_refresh_commands_total",
        "identifier" => identifier_label(identifier, registered),
        "status" => status.to_string()
    )
    .increment(1);
}

fn identifier_label(identifier: &str, registered: bool) -> String {
    if registered {
        identifier.to_string()
    } else {
        UNKNOWN_IDENTIFIER.to_string()
    }
}
