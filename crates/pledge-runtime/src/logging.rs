//! Logging setup
//!
//! The runtime only emits `tracing` events. Binaries that want them printed
//! call [`init`] once with their loaded configuration.

use pledge_config::PledgeConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Install a fmt subscriber filtered by `logging.filter`.
pub fn init(config: &PledgeConfig) -> Result<(), LoggingError> {
    let filter = config.log_filter();
    let env_filter = EnvFilter::try_new(filter).map_err(|source| LoggingError::InvalidFilter {
        filter: filter.to_string(),
        source,
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}
