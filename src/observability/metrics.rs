//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lifecycle_shutdowns_total` (counter): capability shutdowns by capability, result
//! - `lifecycle_shutdown_duration_seconds` (histogram): time spent per capability
//! - `lifecycle_runs_total` (counter): completed runs by termination reason, result
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - The Prometheus endpoint is opt-in via config

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::lifecycle::signals::TerminationReason;

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_shutdown(capability: &str, success: bool, elapsed: Duration) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!(
        "lifecycle_shutdowns_total",
        "capability" => capability.to_string(),
        "result" => result
    )
    .increment(1);
    metrics::histogram!(
        "lifecycle_shutdown_duration_seconds",
        "capability" => capability.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_run(reason: TerminationReason, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!(
        "lifecycle_runs_total",
        "reason" => reason.as_str(),
        "result" => result
    )
    .increment(1);
}
