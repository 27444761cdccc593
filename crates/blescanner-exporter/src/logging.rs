//! Logging initialization.
//!
//! One compact stdout layer without ANSI colors, suitable for journald and
//! container log capture. `RUST_LOG` overrides the configured level when
//! set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// `default_level` is the configured verbosity in env-filter form; it is
/// used only when `RUST_LOG` is absent.
///
/// # Errors
///
/// Returns an error if the level cannot be parsed as an env filter.
pub fn init(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    Ok(())
}
