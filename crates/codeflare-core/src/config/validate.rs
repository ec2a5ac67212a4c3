//! Configuration validation.

use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use super::types::Config;
use crate::{error::ConfigError, pattern::is_valid_name};

const MAX_SUGGESTION_DISTANCE: usize = 16;

impl Config {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the namespace is not a single
    /// command word, the log level is unknown, or the suggestion distance is
    /// out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_name(&self.namespace) {
            return Err(ConfigError::Invalid(format!(
                "namespace '{}' must be a single word of letters, digits, '-' or '_'",
                self.namespace
            )));
        }

        if LevelFilter::from_str(&self.log.level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "log.level '{}' must be one of off, error, warn, info, debug, trace",
                self.log.level
            )));
        }

        if self.suggestions.max_distance > MAX_SUGGESTION_DISTANCE {
            return Err(ConfigError::Invalid(format!(
                "suggestions.max_distance must be 0-{MAX_SUGGESTION_DISTANCE}"
            )));
        }

        Ok(())
    }
}
