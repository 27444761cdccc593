//! # blescanner-exporter
//!
//! Prometheus exporter binary for the blescanner BLE presence scanner.
//!
//! This binary:
//! - Scans for nearby BLE devices on a fixed interval
//! - Tracks first-seen / last-seen / seen-count per stable address
//! - Exposes the counts and cycle timing at `GET /metrics`
//!
//! ## Running
//!
//! ```bash
//! BLESCANNER_SCAN_INTERVAL_SECS=20 BLESCANNER_METRICS_PORT=9100 ./blescanner-exporter
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use blescanner_core::ScannerConfig;
use blescanner_exporter::{api, logging, metrics, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScannerConfig::load()?;
    logging::init(&config.log_level)?;

    info!(
        scan_interval_secs = config.scan_interval_secs,
        scan_window_secs = config.scan_window_secs,
        metrics_port = config.metrics_port,
        "starting blescanner exporter"
    );

    let metrics_state = metrics::init()?;
    let app = api::create_router(metrics_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    info!("metrics endpoint listening on {addr}");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "metrics server terminated");
        }
    });

    // A missing adapter here is fatal: there is nothing useful to export.
    // The same condition mid-flight surfaces as a cycle error instead and
    // the loop keeps running.
    #[cfg(feature = "bluetooth")]
    let provider = blescanner_core::BleDiscovery::new(config.scan_window()).await?;

    #[cfg(all(not(feature = "bluetooth"), feature = "mock-discovery"))]
    let provider = blescanner_core::ScriptedDiscovery::new(Vec::new());

    #[cfg(not(any(feature = "bluetooth", feature = "mock-discovery")))]
    compile_error!("enable the `bluetooth` feature, or `mock-discovery` for radio-less builds");

    tokio::select! {
        () = scheduler::run(provider, config.scan_interval()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
