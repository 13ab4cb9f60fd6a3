//! Metrics collection and Prometheus export.
//!
//! HTTP request metrics come from the shared middleware; this module adds
//! the upstream call counter and renders everything for `/metrics`.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
///
/// Without a recorder, `metrics` macros are silently discarded, so a failed
/// install only costs the `/metrics` output.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
            tracing::info!("Prometheus metrics initialized");
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count one upstream call by provider and outcome.
pub fn record_upstream_request(provider: &'static str, outcome: &'static str) {
    counter!(
        "relay_upstream_requests_total",
        "provider" => provider,
        "outcome" => outcome
    )
    .increment(1);
}
