//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{DispatchConfig, LoggingConfig, PledgeConfig, WaitConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "pledge.toml";

/// Environment variable overriding `wait.default_timeout_ms`
pub const ENV_WAIT_TIMEOUT_MS: &str = "PLEDGE_WAIT_TIMEOUT_MS";
/// Environment variable overriding `dispatch.log_callback_failures`
pub const ENV_LOG_CALLBACK_FAILURES: &str = "PLEDGE_LOG_CALLBACK_FAILURES";
/// Environment variable overriding `logging.filter`
pub const ENV_LOG: &str = "PLEDGE_LOG";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.pledge/config.toml) - lowest priority
/// 2. Project config (./pledge.toml) - overrides global
/// 3. Environment variables (PLEDGE_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after merging every source
    pub settings: PledgeConfig,

    /// Directory where pledge.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads the global layer from `path` instead of the home directory
    pub fn with_global_config(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find pledge.toml, then layers it over the
    /// global config (if any) and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;

        let mut settings = self.load_global_config()?;
        settings.merge(&project);
        let settings = apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project = PledgeConfig::load_from_file(config_path)?;

        let mut settings = self.load_global_config()?;
        settings.merge(&project);
        let settings = apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, PledgeConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let config = PledgeConfig::load_from_file(&config_path)?;
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, PledgeConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.pledge/config.toml
    ///
    /// A missing file (or a missing home directory) yields defaults; a file that
    /// exists but does not parse is an error.
    fn load_global_config(&mut self) -> ConfigResult<PledgeConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match Self::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                Err(ConfigError::HomeNotFound) => return Ok(PledgeConfig::default()),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(PledgeConfig::default());
        }

        PledgeConfig::load_from_file(&path)
    }

    /// Get the global config file path (~/.pledge/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".pledge").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a pledge.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

/// Apply environment variable overrides
///
/// Environment variables follow the pattern: PLEDGE_<SECTION>_<KEY>
/// Example: PLEDGE_WAIT_TIMEOUT_MS=5000
fn apply_env_overrides(mut config: PledgeConfig) -> ConfigResult<PledgeConfig> {
    if let Ok(timeout) = env::var(ENV_WAIT_TIMEOUT_MS) {
        let millis = timeout
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue {
                field: ENV_WAIT_TIMEOUT_MS.to_string(),
                reason: format!("expected milliseconds, got '{}' ({})", timeout, e),
            })?;
        config.merge(&PledgeConfig {
            wait: Some(WaitConfig {
                default_timeout_ms: Some(millis),
            }),
            ..Default::default()
        });
    }

    if let Ok(flag) = env::var(ENV_LOG_CALLBACK_FAILURES) {
        let enabled = match flag.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: ENV_LOG_CALLBACK_FAILURES.to_string(),
                    reason: format!("expected true/false, 1/0 or yes/no, got '{}'", flag),
                })
            }
        };
        config.merge(&PledgeConfig {
            dispatch: Some(DispatchConfig {
                log_callback_failures: Some(enabled),
            }),
            ..Default::default()
        });
    }

    if let Ok(filter) = env::var(ENV_LOG) {
        config.merge(&PledgeConfig {
            logging: Some(LoggingConfig {
                filter: Some(filter),
            }),
            ..Default::default()
        });
    }

    config.validate()?;
    Ok(config)
}
