// File: src/logging.rs
// Purpose: tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
pub fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.effective_level()))
}

/// Install the global fmt subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_target(false)
        .try_init();
}
