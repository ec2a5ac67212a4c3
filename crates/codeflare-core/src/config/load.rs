//! Configuration loading from files and environment.

use std::path::{Path, PathBuf};

use super::types::{Config, PartialConfig};
use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.toml";
const PROJECT_DIR: &str = ".codeflare";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all layers.
///
/// With `explicit`, that file must exist and replaces the global and
/// project files. Otherwise missing files are skipped.
///
/// # Errors
///
/// Returns [`ConfigError`] when a file cannot be read or parsed, an
/// environment variable has an invalid value, or the result fails
/// validation.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config = Config::default();

    let config = match explicit {
        Some(path) => config.merge(load_toml_file(path)?),
        None => {
            let global = global_config_path()
                .filter(|path| path.exists())
                .map(|path| load_toml_file(&path))
                .transpose()?;
            let project_path = project_config_path()?;
            let project = project_path
                .exists()
                .then(|| load_toml_file(&project_path))
                .transpose()?;

            [global, project]
                .into_iter()
                .flatten()
                .fold(config, Config::merge)
        }
    };

    let config = config.apply_env_vars()?;
    config.validate()?;

    tracing::debug!(namespace = %config.namespace, level = %config.log.level, "loaded configuration");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Path of the per-user config file, when a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "codeflare")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Path of the project config file below the working directory.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the working directory is unavailable.
pub fn project_config_path() -> Result<PathBuf, ConfigError> {
    std::env::current_dir()
        .map(|dir| dir.join(PROJECT_DIR).join(CONFIG_FILE))
        .map_err(|e| ConfigError::Io {
            path: ".".to_string(),
            message: format!("failed to get current directory: {e}"),
        })
}

/// Read one TOML layer. Unknown keys are rejected.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Parse`] when it is not a valid config layer.
pub fn load_toml_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `CODEFLARE_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value does not parse.
    pub fn apply_env_vars(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var("CODEFLARE_NAMESPACE") {
            self.namespace = value;
        }

        if let Ok(value) = std::env::var("CODEFLARE_LOG_LEVEL") {
            self.log.level = value;
        }

        if let Ok(value) = std::env::var("CODEFLARE_SUGGESTIONS_ENABLED") {
            self.suggestions.enabled = value.parse().map_err(|e| {
                ConfigError::Invalid(format!("invalid CODEFLARE_SUGGESTIONS_ENABLED value: {e}"))
            })?;
        }

        if let Ok(value) = std::env::var("CODEFLARE_SUGGESTIONS_MAX_DISTANCE") {
            self.suggestions.max_distance = value.parse().map_err(|e| {
                ConfigError::Invalid(format!(
                    "invalid CODEFLARE_SUGGESTIONS_MAX_DISTANCE value: {e}"
                ))
            })?;
        }

        Ok(self)
    }
}
