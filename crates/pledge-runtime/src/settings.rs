//! Process-wide runtime settings
//!
//! Settings are installed at most once. Anything that reads them before an
//! explicit [`install`] locks in the defaults.

use pledge_config::PledgeConfig;
use std::sync::OnceLock;
use std::time::Duration;

static SETTINGS: OnceLock<RuntimeSettings> = OnceLock::new();

/// Settings consulted by futures at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Deadline applied by `PledgeFuture::wait`
    pub default_timeout: Option<Duration>,
    /// Log a warning when user callback code fails or panics
    pub log_callback_failures: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            default_timeout: None,
            log_callback_failures: true,
        }
    }
}

impl From<&PledgeConfig> for RuntimeSettings {
    fn from(config: &PledgeConfig) -> Self {
        Self {
            default_timeout: config.default_timeout(),
            log_callback_failures: config.log_callback_failures(),
        }
    }
}

/// Install settings for this process.
///
/// Returns false if settings were already installed or already read.
pub fn install(settings: RuntimeSettings) -> bool {
    SETTINGS.set(settings).is_ok()
}

/// The active settings
pub fn current() -> &'static RuntimeSettings {
    SETTINGS.get_or_init(RuntimeSettings::default)
}
