//! Runtime Settings (pledge.toml / ~/.pledge/config.toml)
//!
//! Both the project file and the global file share this schema. Every field is
//! optional so partial files can be layered on top of each other.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default tracing filter used when nothing else is configured
pub const DEFAULT_LOG_FILTER: &str = "pledge_runtime=info";

/// Settings file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PledgeConfig {
    /// Blocking wait settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitConfig>,

    /// Callback dispatch settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchConfig>,

    /// Logging settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Blocking wait settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    /// Deadline applied by `wait()`, in milliseconds. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout_ms: Option<u64>,
}

/// Callback dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Emit a warning when user callback code fails or panics (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_callback_failures: Option<bool>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl PledgeConfig {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(wait) = &self.wait {
            if wait.default_timeout_ms == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "wait.default_timeout_ms".to_string(),
                    reason: "must be greater than zero (omit it to wait forever)".to_string(),
                });
            }
        }

        if let Some(logging) = &self.logging {
            if let Some(filter) = &logging.filter {
                if filter.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "logging.filter".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Other config takes precedence for non-None values, field by field.
    pub fn merge(&mut self, other: &PledgeConfig) {
        if let Some(wait) = &other.wait {
            let ours = self.wait.get_or_insert_with(Default::default);
            if wait.default_timeout_ms.is_some() {
                ours.default_timeout_ms = wait.default_timeout_ms;
            }
        }
        if let Some(dispatch) = &other.dispatch {
            let ours = self.dispatch.get_or_insert_with(Default::default);
            if dispatch.log_callback_failures.is_some() {
                ours.log_callback_failures = dispatch.log_callback_failures;
            }
        }
        if let Some(logging) = &other.logging {
            let ours = self.logging.get_or_insert_with(Default::default);
            if logging.filter.is_some() {
                ours.filter = logging.filter.clone();
            }
        }
    }

    /// Deadline applied by `wait()`, if any
    pub fn default_timeout(&self) -> Option<Duration> {
        self.wait
            .as_ref()
            .and_then(|w| w.default_timeout_ms)
            .map(Duration::from_millis)
    }

    /// Whether contained callback failures are logged
    pub fn log_callback_failures(&self) -> bool {
        self.dispatch
            .as_ref()
            .and_then(|d| d.log_callback_failures)
            .unwrap_or(true)
    }

    /// Effective tracing filter directive
    pub fn log_filter(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[wait]
default_timeout_ms = 2500

[dispatch]
log_callback_failures = false

[logging]
filter = "pledge_runtime=trace"
"#;
        let config: PledgeConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_timeout(), Some(Duration::from_millis(2500)));
        assert!(!config.log_callback_failures());
        assert_eq!(config.log_filter(), "pledge_runtime=trace");
    }

    #[test]
    fn test_defaults_when_empty() {
        let config: PledgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, PledgeConfig::default());
        assert_eq!(config.default_timeout(), None);
        assert!(config.log_callback_failures());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[wait]
timeout = 10
"#;
        assert!(toml::from_str::<PledgeConfig>(toml).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PledgeConfig {
            wait: Some(WaitConfig {
                default_timeout_ms: Some(0),
            }),
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "wait.default_timeout_ms")
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_filter_rejected() {
        let config = PledgeConfig {
            logging: Some(LoggingConfig {
                filter: Some("  ".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_is_field_wise() {
        let mut base: PledgeConfig = toml::from_str(
            r#"
[wait]
default_timeout_ms = 100

[logging]
filter = "warn"
"#,
        )
        .unwrap();
        let overlay: PledgeConfig = toml::from_str(
            r#"
[dispatch]
log_callback_failures = false

[logging]
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(base.default_timeout(), Some(Duration::from_millis(100)));
        assert!(!base.log_callback_failures());
        // An empty [logging] table leaves the earlier filter alone
        assert_eq!(base.log_filter(), "warn");
    }
}
