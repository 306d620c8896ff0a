//! Tracing subscriber setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=basket=trace` - Show trace for basket crates only
//! - Unset: `[logging] filter` from `basket.toml`

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{StoreError, StoreResult};

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `settings.filter`. Fails if the filter does not
/// parse or a global subscriber is already set.
pub fn init_tracing(settings: &LoggingSettings) -> StoreResult<()> {
    let filter = build_filter(settings)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| StoreError::Internal(format!("Tracing already initialized: {}", e)))
}

/// Test-friendly variant: output goes through the test harness capture and
/// repeated calls are ignored.
pub fn try_init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn build_filter(settings: &LoggingSettings) -> StoreResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.filter).map_err(|e| {
        StoreError::InvalidConfig(format!("logging.filter '{}': {}", settings.filter, e))
    })
}
