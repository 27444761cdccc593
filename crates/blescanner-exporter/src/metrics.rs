//! Prometheus recorder installation.
//!
//! The core records through the `metrics` facade; this module installs the
//! process-wide Prometheus recorder behind it and hands out the render
//! handle for the exposition endpoint. The recorder's atomic storage is
//! what makes concurrent scrapes safe against the single writing scan
//! task.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// State containing the Prometheus handle for metrics export.
#[derive(Clone)]
pub struct MetricsState {
    /// Renders the current exposition text.
    pub prometheus_handle: PrometheusHandle,
}

/// Install the Prometheus recorder and register metric descriptions.
///
/// Call once at startup, before the first cycle runs.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn init() -> anyhow::Result<MetricsState> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    blescanner_core::metrics::describe_metrics();

    Ok(MetricsState {
        prometheus_handle: handle,
    })
}
