//! Configuration type definitions.
//!
//! Files deserialize into the `Partial*` structs so that only keys a layer
//! actually sets override the layers below it.

use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_NAMESPACE: &str = "codeflare";
pub(super) const DEFAULT_LOG_LEVEL: &str = "warn";
pub(super) const DEFAULT_MAX_DISTANCE: usize = 3;

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVED CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Config {
    /// First literal of every feature-module command.
    pub namespace: String,
    pub log: LogConfig,
    pub suggestions: SuggestionConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is unset.
    pub level: String,
}

/// "Did you mean" behaviour for unmatched commands.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SuggestionConfig {
    pub enabled: bool,
    /// Largest edit distance still offered as a suggestion.
    pub max_distance: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            log: LogConfig::default(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARTIAL LAYERS
// ═══════════════════════════════════════════════════════════════════════════

/// One configuration file as written.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub namespace: Option<String>,
    pub log: Option<PartialLogConfig>,
    pub suggestions: Option<PartialSuggestionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialLogConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialSuggestionConfig {
    pub enabled: Option<bool>,
    pub max_distance: Option<usize>,
}

impl Config {
    /// Overlay the keys set in `layer`.
    pub fn merge(self, layer: PartialConfig) -> Self {
        let log = layer.log.unwrap_or_default();
        let suggestions = layer.suggestions.unwrap_or_default();

        Self {
            namespace: layer.namespace.unwrap_or(self.namespace),
            log: LogConfig {
                level: log.level.unwrap_or(self.log.level),
            },
            suggestions: SuggestionConfig {
                enabled: suggestions.enabled.unwrap_or(self.suggestions.enabled),
                max_distance: suggestions
                    .max_distance
                    .unwrap_or(self.suggestions.max_distance),
            },
        }
    }
}
