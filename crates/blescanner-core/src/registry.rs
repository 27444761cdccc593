//! In-memory device presence registry.
//!
//! The registry folds per-cycle [`DeviceObservation`]s into durable
//! [`PresenceRecord`]s keyed by hardware address. It is owned by the
//! scheduler loop and only ever touched from the active cycle, so it needs
//! no interior locking.
//!
//! Records live until process termination. There is no eviction: a scanner
//! in a busy environment grows without bound, which is an accepted
//! limitation of the in-memory design.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DeviceObservation;

/// Outcome of folding one observation into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// First accepted observation of this address.
    Created,
    /// The address was already tracked; name and last-seen refreshed.
    Updated,
}

/// Durable per-address tracking entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Normalized hardware address (registry key).
    pub address: String,

    /// Last-seen display name, overwritten on each update.
    pub name: String,

    /// When the address was first observed. Set once, never changed.
    pub first_seen: DateTime<Utc>,

    /// When the address was most recently observed.
    pub last_seen: DateTime<Utc>,

    /// Number of accepted observations since the first sighting.
    pub seen_count: u64,
}

/// Keyed store of every device accepted since process start.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    devices: HashMap<String, PresenceRecord>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one accepted observation into the registry.
    ///
    /// Creates a record with `first_seen == last_seen == seen_at` and a
    /// seen count of 1 on first sighting; otherwise overwrites the name,
    /// advances `last_seen`, and increments the count. Total over valid
    /// input - there is no error path.
    pub fn upsert(&mut self, observation: &DeviceObservation, seen_at: DateTime<Utc>) -> UpdateKind {
        match self.devices.entry(observation.address.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.name.clone_from(&observation.name);
                record.last_seen = seen_at;
                record.seen_count += 1;
                UpdateKind::Updated
            }
            Entry::Vacant(entry) => {
                entry.insert(PresenceRecord {
                    address: observation.address.clone(),
                    name: observation.name.clone(),
                    first_seen: seen_at,
                    last_seen: seen_at,
                    seen_count: 1,
                });
                UpdateKind::Created
            }
        }
    }

    /// All records, most recently seen first.
    ///
    /// Ties on `last_seen` are broken by address ascending so repeated
    /// snapshots of the same state report in the same order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PresenceRecord> {
        let mut records: Vec<PresenceRecord> = self.devices.values().cloned().collect();
        records.sort_by(|a, b| {
            b.last_seen
                .cmp(&a.last_seen)
                .then_with(|| a.address.cmp(&b.address))
        });
        records
    }

    /// Number of distinct tracked addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device has been tracked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AddressKind;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn obs(address: &str, name: &str) -> DeviceObservation {
        DeviceObservation::new(address, name, AddressKind::Public)
    }

    #[test]
    fn test_first_observation_creates_record() {
        let mut registry = PresenceRegistry::new();
        let kind = registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "dev1"), ts(100));

        assert_eq!(kind, UpdateKind::Created);
        assert_eq!(registry.len(), 1);

        let records = registry.snapshot();
        assert_eq!(records[0].address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(records[0].name, "dev1");
        assert_eq!(records[0].first_seen, ts(100));
        assert_eq!(records[0].last_seen, ts(100));
        assert_eq!(records[0].seen_count, 1);
    }

    #[test]
    fn test_repeat_observation_updates_record() {
        let mut registry = PresenceRegistry::new();
        registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "dev1"), ts(100));
        let kind = registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "dev1"), ts(200));

        assert_eq!(kind, UpdateKind::Updated);
        assert_eq!(registry.len(), 1);

        let records = registry.snapshot();
        assert_eq!(records[0].first_seen, ts(100));
        assert_eq!(records[0].last_seen, ts(200));
        assert_eq!(records[0].seen_count, 2);
        assert_eq!(records[0].name, "dev1");
    }

    #[test]
    fn test_seen_count_tracks_observation_count() {
        let mut registry = PresenceRegistry::new();
        for i in 0..5 {
            registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "dev1"), ts(100 + i));
        }

        let records = registry.snapshot();
        assert_eq!(records[0].seen_count, 5);
        assert_eq!(records[0].first_seen, ts(100));
        assert_eq!(records[0].last_seen, ts(104));
        assert!(records[0].first_seen <= records[0].last_seen);
    }

    #[test]
    fn test_name_is_overwritten_on_update() {
        let mut registry = PresenceRegistry::new();
        registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "old-name"), ts(100));
        registry.upsert(&obs("AA:BB:CC:DD:EE:FF", "new-name"), ts(200));

        assert_eq!(registry.snapshot()[0].name, "new-name");
    }

    #[test]
    fn test_snapshot_orders_by_last_seen_descending() {
        let mut registry = PresenceRegistry::new();
        registry.upsert(&obs("AA:AA:AA:AA:AA:AA", "a"), ts(100));
        registry.upsert(&obs("BB:BB:BB:BB:BB:BB", "b"), ts(300));
        registry.upsert(&obs("CC:CC:CC:CC:CC:CC", "c"), ts(200));

        let addresses: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(
            addresses,
            vec!["BB:BB:BB:BB:BB:BB", "CC:CC:CC:CC:CC:CC", "AA:AA:AA:AA:AA:AA"]
        );
    }

    #[test]
    fn test_snapshot_breaks_ties_by_address_ascending() {
        let mut registry = PresenceRegistry::new();
        registry.upsert(&obs("CC:CC:CC:CC:CC:CC", "c"), ts(100));
        registry.upsert(&obs("AA:AA:AA:AA:AA:AA", "a"), ts(100));
        registry.upsert(&obs("BB:BB:BB:BB:BB:BB", "b"), ts(100));

        let addresses: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|r| r.address)
            .collect();
        assert_eq!(
            addresses,
            vec!["AA:AA:AA:AA:AA:AA", "BB:BB:BB:BB:BB:BB", "CC:CC:CC:CC:CC:CC"]
        );
    }

    #[test]
    fn test_devices_sharing_a_name_get_independent_records() {
        let mut registry = PresenceRegistry::new();
        registry.upsert(&obs("AA:AA:AA:AA:AA:AA", "same"), ts(100));
        registry.upsert(&obs("BB:BB:BB:BB:BB:BB", "same"), ts(100));

        assert_eq!(registry.len(), 2);
        let records = registry.snapshot();
        assert_eq!(records[0].seen_count, 1);
        assert_eq!(records[1].seen_count, 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = PresenceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.snapshot().is_empty());
    }
}
