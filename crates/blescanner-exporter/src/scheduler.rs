//! The endless scan loop.
//!
//! Two states, strictly sequential: a cycle is either in progress or the
//! loop is sleeping until the next one. Cycle N+1 never starts before
//! cycle N and its sleep complete, so the registry is only ever touched
//! from the active cycle.
//!
//! A failed cycle is logged and absorbed; nothing that happens during a
//! scan terminates the process. A discovery call that never resolves
//! blocks the loop indefinitely - bounding it is the provider's concern.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use blescanner_core::{metrics, DiscoveryProvider, PresenceRegistry, ScanCycle};

/// Run one scheduler iteration: a full cycle plus its reporting.
///
/// On success, logs the per-device summary (most recently seen first) and
/// the total tracked count. On failure, logs the error and moves on - the
/// registry is left as the previous cycle produced it.
pub async fn run_once<P: DiscoveryProvider>(
    cycle: &ScanCycle<P>,
    registry: &mut PresenceRegistry,
) {
    match cycle.run(registry).await {
        Ok(outcome) => {
            metrics::record_cycle_result(true);
            for record in registry.snapshot() {
                info!(
                    address = %record.address,
                    last_seen = %record.last_seen,
                    seen_count = record.seen_count,
                    "tracked device"
                );
            }
            info!(
                total = registry.len(),
                accepted = outcome.accepted,
                ignored = outcome.ignored,
                "scan cycle finished"
            );
        }
        Err(err) => {
            metrics::record_cycle_result(false);
            error!(error = %err, "scan cycle failed, keeping previous registry state");
        }
    }
}

/// Run the scan loop forever.
///
/// Owns the registry for the process lifetime; all mutation happens inside
/// the cycle invocation. Never returns under normal operation - the
/// process runs until externally stopped.
pub async fn run<P: DiscoveryProvider>(provider: P, interval: Duration) {
    let cycle = ScanCycle::new(provider);
    let mut registry = PresenceRegistry::new();

    loop {
        run_once(&cycle, &mut registry).await;
        sleep(interval).await;
    }
}
