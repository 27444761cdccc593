//! Unified error types for the blescanner core library.
//!
//! The scanner has a deliberately small failure surface: discovery against
//! the radio subsystem can fail, and configuration can be invalid. Registry
//! updates are total by construction and have no error path.

use thiserror::Error;

/// The unified error type for all scanner operations.
#[derive(Debug, Error)]
pub enum ScannerError {
    // =========================================================================
    // DISCOVERY ERRORS
    // =========================================================================
    /// No Bluetooth adapter was found on this system.
    #[error(
        "No Bluetooth adapter found. Ensure Bluetooth hardware is present and drivers are loaded."
    )]
    AdapterNotFound,

    /// A discovery pass failed outright (timeout, adapter lost, transport
    /// failure). Covers the whole cycle; no partial results are surfaced.
    #[error("Bluetooth discovery failed: {0}")]
    DiscoveryFailed(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The environment configuration could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The configuration was parsed but contains an invalid value.
    #[error("Configuration validation failed: {field}: {message}")]
    ConfigValidation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    // =========================================================================
    // I/O ERRORS
    // =========================================================================
    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for scanner operations.
pub type Result<T> = std::result::Result<T, ScannerError>;

impl ScannerError {
    /// Returns `true` if this error is expected to clear up on a later
    /// cycle without intervention. The scheduler loop absorbs these and
    /// keeps running.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DiscoveryFailed(_) | Self::AdapterNotFound)
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ConfigValidation { .. })
    }
}

#[cfg(feature = "bluetooth")]
impl From<bluer::Error> for ScannerError {
    fn from(err: bluer::Error) -> Self {
        match err.kind {
            bluer::ErrorKind::NotFound => Self::AdapterNotFound,
            _ => Self::DiscoveryFailed(err.to_string()),
        }
    }
}
