//! Publisher settings resolved from per-call configuration.

use crate::config::{Config, ConfigError};

/// Option controlling plugin verbosity.
pub const LOG_LEVEL: &str = "log-level";

/// Settings for one publish call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherSettings {
    /// Raw `log-level` value. `None` when the option is absent or not a
    /// string.
    pub log_level: Option<String>,
}

impl PublisherSettings {
    /// Resolve settings from `config`.
    ///
    /// Absence is tolerated, so this currently never fails. The `Result`
    /// leaves room for options that must be validated.
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        let log_level = match config.get_string(LOG_LEVEL) {
            Ok(value) => Some(value.to_string()),
            Err(ConfigError::Missing(_)) | Err(ConfigError::WrongType { .. }) => None,
        };
        Ok(Self { log_level })
    }
}
