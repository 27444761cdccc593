//! Scan cycle controller.
//!
//! One cycle runs a single discovery pass, filters out randomly addressed
//! devices, folds the remainder into the presence registry, and records the
//! per-device and timing metrics. A provider failure aborts the cycle
//! before any registry mutation; registry updates themselves are total, so
//! one device can never poison the rest of its batch.

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::bluetooth::DiscoveryProvider;
use crate::error::Result;
use crate::metrics;
use crate::registry::{PresenceRegistry, UpdateKind};

/// Per-cycle accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Observations folded into the registry.
    pub accepted: usize,

    /// Observations dropped by the random-address filter.
    pub ignored: usize,
}

/// Runs discovery passes against a provider and applies them to a registry.
pub struct ScanCycle<P> {
    provider: P,
}

impl<P: DiscoveryProvider> ScanCycle<P> {
    /// Create a controller over the given discovery provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one full cycle against `registry`.
    ///
    /// The wall-clock duration of the whole cycle, provider call included,
    /// is recorded to the processing summary whether or not the pass
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the provider's failure for the pass; the registry is
    /// untouched in that case.
    pub async fn run(&self, registry: &mut PresenceRegistry) -> Result<CycleOutcome> {
        let started = Instant::now();
        let result = self.run_inner(registry).await;
        metrics::record_cycle_duration(started.elapsed());
        result
    }

    async fn run_inner(&self, registry: &mut PresenceRegistry) -> Result<CycleOutcome> {
        let observations = self.provider.discover().await?;
        let seen_at = Utc::now();

        let mut outcome = CycleOutcome::default();
        for observation in &observations {
            debug!(
                address = %observation.address,
                name = %observation.name,
                properties = ?observation.properties,
                "observation"
            );

            if !observation.is_trackable() {
                info!(
                    address = %observation.address,
                    "ignoring device, address is randomly rotating"
                );
                outcome.ignored += 1;
                continue;
            }

            metrics::record_device_seen(&observation.address, &observation.name);
            match registry.upsert(observation, seen_at) {
                UpdateKind::Created => {
                    info!(
                        address = %observation.address,
                        name = %observation.name,
                        "new device detected"
                    );
                }
                UpdateKind::Updated => {
                    info!(address = %observation.address, "device updated");
                }
            }
            outcome.accepted += 1;
        }

        metrics::set_tracked_devices(registry.len());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::ScriptedDiscovery;
    use crate::error::ScannerError;
    use crate::types::{AddressKind, DeviceObservation};

    fn public(address: &str, name: &str) -> DeviceObservation {
        DeviceObservation::new(address, name, AddressKind::Public)
    }

    fn random(address: &str) -> DeviceObservation {
        DeviceObservation::new(address, "", AddressKind::Random)
    }

    #[tokio::test]
    async fn test_cycle_accepts_and_ignores() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![Ok(vec![
            public("AA:BB:CC:DD:EE:FF", "dev1"),
            random("11:22:33:44:55:66"),
            public("22:22:22:22:22:22", "dev2"),
        ])]));
        let mut registry = PresenceRegistry::new();

        let outcome = cycle.run(&mut registry).await.unwrap();
        assert_eq!(outcome, CycleOutcome { accepted: 2, ignored: 1 });
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_random_only_cycle_leaves_registry_empty() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![Ok(vec![random(
            "11:22:33:44:55:66",
        )])]));
        let mut registry = PresenceRegistry::new();

        let outcome = cycle.run(&mut registry).await.unwrap();
        assert_eq!(outcome.ignored, 1);
        assert_eq!(outcome.accepted, 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_address_kind_is_accepted() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![Ok(vec![
            DeviceObservation::new("AA:BB:CC:DD:EE:FF", "dev1", AddressKind::Unknown),
        ])]));
        let mut registry = PresenceRegistry::new();

        let outcome = cycle.run(&mut registry).await.unwrap();
        assert_eq!(outcome.accepted, 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_same_device_across_two_cycles_counts_twice() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![
            Ok(vec![public("AA:BB:CC:DD:EE:FF", "dev1")]),
            Ok(vec![public("AA:BB:CC:DD:EE:FF", "dev1")]),
        ]));
        let mut registry = PresenceRegistry::new();

        cycle.run(&mut registry).await.unwrap();
        cycle.run(&mut registry).await.unwrap();

        assert_eq!(registry.len(), 1);
        let records = registry.snapshot();
        assert_eq!(records[0].seen_count, 2);
        assert_eq!(records[0].name, "dev1");
        assert!(records[0].first_seen <= records[0].last_seen);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_and_leaves_registry_untouched() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![
            Ok(vec![public("AA:BB:CC:DD:EE:FF", "dev1")]),
            Err(ScannerError::DiscoveryFailed("scan timed out".into())),
        ]));
        let mut registry = PresenceRegistry::new();

        cycle.run(&mut registry).await.unwrap();
        let before = registry.snapshot();

        let err = cycle.run(&mut registry).await.unwrap_err();
        assert!(err.is_recoverable());

        let after = registry.snapshot();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].seen_count, after[0].seen_count);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_successful_cycle() {
        let cycle = ScanCycle::new(ScriptedDiscovery::new(vec![Ok(Vec::new())]));
        let mut registry = PresenceRegistry::new();

        let outcome = cycle.run(&mut registry).await.unwrap();
        assert_eq!(outcome, CycleOutcome::default());
        assert!(registry.is_empty());
    }
}
