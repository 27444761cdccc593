//! Application configuration.
//!
//! The scanner is configured entirely from the environment, which suits its
//! life as a systemd unit or container. All variables carry the
//! `BLESCANNER_` prefix and fall back to the defaults below:
//!
//! | Variable                        | Default | Meaning                         |
//! |---------------------------------|---------|---------------------------------|
//! | `BLESCANNER_SCAN_INTERVAL_SECS` | 20      | Sleep between discovery cycles  |
//! | `BLESCANNER_SCAN_WINDOW_SECS`   | 10      | Length of one discovery window  |
//! | `BLESCANNER_METRICS_PORT`       | 9100    | HTTP port for /metrics          |
//! | `BLESCANNER_LOG_LEVEL`          | info    | Log verbosity (env-filter form) |

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ScannerError};

/// Default sleep between discovery cycles, in seconds.
pub const DEFAULT_SCAN_INTERVAL_SECS: u32 = 20;

/// Default length of a single discovery window, in seconds.
pub const DEFAULT_SCAN_WINDOW_SECS: u32 = 10;

/// Default port for the Prometheus exposition endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 9100;

/// Default log verbosity.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration for the scanner and exporter.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Seconds to sleep between discovery cycles.
    pub scan_interval_secs: u64,

    /// Seconds one discovery window stays open collecting devices.
    pub scan_window_secs: u64,

    /// TCP port the metrics endpoint listens on.
    pub metrics_port: u16,

    /// Log verbosity in `tracing` env-filter form (e.g. `info`, `debug`).
    pub log_level: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: u64::from(DEFAULT_SCAN_INTERVAL_SECS),
            scan_window_secs: u64::from(DEFAULT_SCAN_WINDOW_SECS),
            metrics_port: DEFAULT_METRICS_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ScannerConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its field type
    /// or if validation rejects a value.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("scan_interval_secs", i64::from(DEFAULT_SCAN_INTERVAL_SECS))?
            .set_default("scan_window_secs", i64::from(DEFAULT_SCAN_WINDOW_SECS))?
            .set_default("metrics_port", i64::from(DEFAULT_METRICS_PORT))?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .add_source(config::Environment::with_prefix("BLESCANNER"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error for zero durations or a zero port.
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_secs == 0 {
            return Err(ScannerError::ConfigValidation {
                field: "scan_interval_secs",
                message: "must be greater than zero".into(),
            });
        }
        if self.scan_window_secs == 0 {
            return Err(ScannerError::ConfigValidation {
                field: "scan_window_secs",
                message: "must be greater than zero".into(),
            });
        }
        if self.metrics_port == 0 {
            return Err(ScannerError::ConfigValidation {
                field: "metrics_port",
                message: "must be a non-zero port".into(),
            });
        }
        Ok(())
    }

    /// Sleep between cycles as a [`Duration`].
    #[must_use]
    pub const fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Discovery window length as a [`Duration`].
    #[must_use]
    pub const fn scan_window(&self) -> Duration {
        Duration::from_secs(self.scan_window_secs)
    }
}
