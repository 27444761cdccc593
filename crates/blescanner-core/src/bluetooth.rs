//! Bluetooth Low Energy device discovery.
//!
//! The scan cycle treats discovery as a capability: one bounded call that
//! returns the full list of devices observed in that window. The default
//! implementation drives BlueZ through `bluer`; a scripted implementation
//! backs the controller and scheduler tests.

use crate::error::Result;
use crate::types::DeviceObservation;

/// A source of per-cycle device observations.
///
/// One call per cycle, no partial results: implementations may use any
/// concurrency internally but must resolve to the complete batch for the
/// window, or to a single error for the whole pass.
pub trait DiscoveryProvider {
    /// Run one discovery pass and return every device observed.
    fn discover(&self) -> impl std::future::Future<Output = Result<Vec<DeviceObservation>>>;
}

#[cfg(feature = "bluetooth")]
pub use ble::BleDiscovery;

#[cfg(feature = "bluetooth")]
mod ble {
    use std::collections::HashSet;
    use std::time::Duration;

    use bluer::{Adapter, AdapterEvent, Address, Session};
    use futures::StreamExt;
    use tokio::time::sleep;
    use tracing::{debug, info, warn};

    use super::DiscoveryProvider;
    use crate::error::Result;
    use crate::types::{AddressKind, DeviceObservation};

    /// BlueZ-backed discovery provider.
    pub struct BleDiscovery {
        adapter: Adapter,
        scan_window: Duration,
    }

    impl BleDiscovery {
        /// Open a session against the default adapter and power it on.
        ///
        /// # Errors
        ///
        /// Returns [`crate::error::ScannerError::AdapterNotFound`] if no
        /// adapter is present, or a discovery error if the session cannot
        /// be established.
        pub async fn new(scan_window: Duration) -> Result<Self> {
            let session = Session::new().await?;
            let adapter = session.default_adapter().await?;
            adapter.set_powered(true).await?;
            info!(adapter = %adapter.name(), "using Bluetooth adapter");
            Ok(Self {
                adapter,
                scan_window,
            })
        }

        /// Read one device's properties into an observation.
        async fn observe(&self, address: Address) -> bluer::Result<DeviceObservation> {
            let device = self.adapter.device(address)?;
            let name = device.name().await?.unwrap_or_default();

            // BlueZ only reports "public" or "random"; a device that
            // vanished before the property read lands here as Unknown and
            // is left to the filter, which accepts it.
            let kind = match device.address_type().await {
                Ok(bluer::AddressType::LeRandom) => AddressKind::Random,
                Ok(_) => AddressKind::Public,
                Err(_) => AddressKind::Unknown,
            };

            let mut observation = DeviceObservation::new(&address.to_string(), &name, kind);
            observation
                .properties
                .insert("address_type".into(), format!("{kind:?}").to_lowercase());
            if let Some(rssi) = device.rssi().await? {
                observation.properties.insert("rssi".into(), rssi.to_string());
            }
            Ok(observation)
        }
    }

    impl DiscoveryProvider for BleDiscovery {
        /// Collect device-added events for one scan window.
        ///
        /// A property read failing for a single device (it left range
        /// mid-scan) drops that device only; losing the adapter or the
        /// event stream fails the whole pass.
        async fn discover(&self) -> Result<Vec<DeviceObservation>> {
            let device_events = self.adapter.discover_devices().await?;
            tokio::pin!(device_events);

            let window = sleep(self.scan_window);
            tokio::pin!(window);

            let mut seen: HashSet<Address> = HashSet::new();
            let mut observations = Vec::new();

            loop {
                tokio::select! {
                    () = &mut window => break,
                    event = device_events.next() => match event {
                        Some(AdapterEvent::DeviceAdded(address)) => {
                            if !seen.insert(address) {
                                continue;
                            }
                            match self.observe(address).await {
                                Ok(observation) => {
                                    debug!(%address, ?observation, "discovered device");
                                    observations.push(observation);
                                }
                                Err(err) => {
                                    warn!(%address, %err, "skipping device, property read failed");
                                }
                            }
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
            }

            Ok(observations)
        }
    }
}

#[cfg(any(test, feature = "mock-discovery"))]
pub use mock::ScriptedDiscovery;

#[cfg(any(test, feature = "mock-discovery"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::DiscoveryProvider;
    use crate::error::Result;
    use crate::types::DeviceObservation;

    /// Discovery provider that replays pre-seeded batches, one per call.
    ///
    /// Calls past the end of the script return empty batches.
    pub struct ScriptedDiscovery {
        batches: Mutex<VecDeque<Result<Vec<DeviceObservation>>>>,
    }

    impl ScriptedDiscovery {
        /// Create a provider that replays `batches` in order.
        #[must_use]
        pub fn new(batches: Vec<Result<Vec<DeviceObservation>>>) -> Self {
            Self {
                batches: Mutex::new(batches.into_iter().collect()),
            }
        }
    }

    impl DiscoveryProvider for ScriptedDiscovery {
        async fn discover(&self) -> Result<Vec<DeviceObservation>> {
            self.batches
                .lock()
                .expect("script lock poisoned")
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScannerError;
    use crate::types::AddressKind;

    #[tokio::test]
    async fn test_scripted_discovery_replays_batches_in_order() {
        let provider = ScriptedDiscovery::new(vec![
            Ok(vec![DeviceObservation::new(
                "AA:BB:CC:DD:EE:FF",
                "dev1",
                AddressKind::Public,
            )]),
            Err(ScannerError::DiscoveryFailed("adapter lost".into())),
        ]);

        let first = provider.discover().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].address, "AA:BB:CC:DD:EE:FF");

        assert!(provider.discover().await.is_err());

        // Past the end of the script: empty batches, never an error.
        assert!(provider.discover().await.unwrap().is_empty());
    }
}
