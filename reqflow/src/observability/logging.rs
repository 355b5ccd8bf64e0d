//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` fmt subscriber. `RUST_LOG` takes
//! precedence over the configured filter when it is set.

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::ReqflowError;
use tracing_subscriber::EnvFilter;

/// Initialises the global tracing subscriber.
///
/// Fails instead of panicking when a subscriber is already installed or the
/// filter directive is invalid.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ReqflowError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| ReqflowError::Logging(format!("invalid filter {:?}: {e}", config.filter)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| ReqflowError::Logging(e.to_string()))
}
