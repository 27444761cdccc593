//! Shared observation types.
//!
//! A [`DeviceObservation`] is what one discovery pass reports for a single
//! device. Observations are ephemeral: the registry folds them into durable
//! [`crate::registry::PresenceRecord`]s and they are dropped afterwards.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `XX:XX:XX:XX:XX:XX` with hex octets, case-insensitive.
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("valid regex"));

/// Returns `true` if `address` is syntactically a Bluetooth hardware address.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// Normalize a hardware address for use as a registry key.
///
/// Addresses compare case-insensitively on the wire, so the registry keys
/// on the trimmed uppercase form.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_uppercase()
}

/// Classification of a hardware address.
///
/// Randomly rotating addresses do not identify a physical device over time
/// and are excluded from presence tracking. Anything that is not known to
/// be random is tracked, including [`AddressKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// Publicly stable address (LE public or classic BR/EDR).
    Public,
    /// Randomly rotating LE address.
    Random,
    /// The adapter did not report an address type.
    Unknown,
}

impl AddressKind {
    /// Whether observations with this address kind are folded into the
    /// presence registry. Pure in the kind, nothing else.
    #[must_use]
    pub const fn is_trackable(self) -> bool {
        !matches!(self, Self::Random)
    }
}

/// One device as reported by a single discovery pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceObservation {
    /// Normalized hardware address.
    pub address: String,

    /// Display name, empty when the device does not broadcast one.
    pub name: String,

    /// Address classification used by the tracking filter.
    pub address_kind: AddressKind,

    /// Raw adapter properties, kept only for diagnostic logging.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl DeviceObservation {
    /// Create an observation with a normalized address and no properties.
    #[must_use]
    pub fn new(address: &str, name: &str, address_kind: AddressKind) -> Self {
        Self {
            address: normalize_address(address),
            name: name.to_string(),
            address_kind,
            properties: BTreeMap::new(),
        }
    }

    /// Whether this observation passes the tracking filter.
    #[must_use]
    pub const fn is_trackable(&self) -> bool {
        self.address_kind.is_trackable()
    }
}
