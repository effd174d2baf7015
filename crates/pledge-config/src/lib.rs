//! Pledge Configuration System
//!
//! Provides configuration management for the pledge runtime:
//! - Project configuration (pledge.toml)
//! - Global user configuration (~/.pledge/config.toml)
//! - Environment overrides (PLEDGE_*)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.pledge/config.toml)
//! 3. Project config (./pledge.toml, searched upwards)
//! 4. Environment variables (PLEDGE_*)
//!
//! # Example
//!
//! ```no_run
//! use pledge_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("default wait timeout: {:?}", config.settings.default_timeout());
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader};
pub use settings::{DispatchConfig, LoggingConfig, PledgeConfig, WaitConfig};
