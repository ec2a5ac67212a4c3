//! Error taxonomy for the routing core.
//!
//! Errors are split by the phase in which they arise:
//!
//! - **Registration errors**: [`PatternSyntaxError`], [`FlagSchemaError`] and
//!   [`ConflictError`], unified as [`RegistrationError`]. Fatal to one
//!   registration, never to the process.
//! - **Dispatch errors**: [`DispatchError`]. Returned to the caller of
//!   dispatch as a typed failure carrying the offending token and the
//!   expected shape.
//! - **Configuration errors**: [`ConfigError`].
//!
//! Handler failures are not part of this taxonomy; they travel untouched as
//! `anyhow::Error` inside [`crate::HandlerResult`].

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use thiserror::Error;

use crate::{dispatch::DispatchStage, flags::ValueType, pattern::Arity, registry::RegistrationId};

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRATION-TIME ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// A command path template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    /// Template contains no segments.
    #[error("command template is empty")]
    Empty,

    /// A `<` or `[` without its closing partner, or a stray delimiter.
    #[error("unbalanced capture delimiter in segment '{segment}'")]
    UnbalancedDelimiter { segment: String },

    /// Capture names must be alphanumeric, dash or underscore.
    #[error("invalid capture name in segment '{segment}'")]
    InvalidName { segment: String },

    /// A variadic capture may only be the final segment.
    #[error("variadic capture '{name}' must be the last segment")]
    VariadicNotLast { name: String },

    /// Literals and required captures cannot follow an optional capture.
    #[error("required segment '{segment}' cannot follow an optional capture")]
    RequiredAfterOptional { segment: String },

    /// The same capture name appears twice in one template.
    #[error("duplicate capture name '{name}'")]
    DuplicateCapture { name: String },
}

/// A flag schema declaration is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagSchemaError {
    /// Two flags (or a flag and an alias) share a spelling.
    #[error("flag alias '{alias}' is declared more than once")]
    DuplicateAlias { alias: String },

    /// A required flag can never fall back to a default.
    #[error("flag '{flag}' is required and cannot declare a default")]
    RequiredWithDefault { flag: String },

    /// Declared default does not have the declared value type.
    #[error("default for flag '{flag}' is not a {expected}")]
    DefaultTypeMismatch { flag: String, expected: ValueType },

    /// Arity-0 flags are presence switches and must be boolean.
    #[error("switch '{flag}' takes no value and must be boolean, not {declared}")]
    SwitchNotBoolean { flag: String, declared: ValueType },

    /// Flag names and aliases must be non-empty, dash-free at the start,
    /// and contain no whitespace or `=`.
    #[error("invalid flag name '{name}'")]
    InvalidName { name: String },

    /// Flag and capture would bind the same argument name.
    #[error("flag '{name}' collides with a capture of the same name")]
    CaptureCollision { name: String },
}

/// Two registrations could match the same invocation with equal specificity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command '{pattern}' conflicts with already registered '{existing}' ({existing_id})")]
pub struct ConflictError {
    /// Canonical form of the rejected pattern.
    pub pattern: String,
    /// Canonical form of the entry it collides with.
    pub existing: String,
    /// Id of the entry it collides with.
    pub existing_id: RegistrationId,
}

/// Any failure of a single registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Pattern(#[from] PatternSyntaxError),

    #[error(transparent)]
    FlagSchema(#[from] FlagSchemaError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

// ═══════════════════════════════════════════════════════════════════════════
// DISPATCH-TIME ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// An invocation could not be resolved and bound to exactly one handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No registered entry is consistent with the tokens.
    #[error("no command matches '{input}'{}", suggestion_suffix(.suggestion.as_deref()))]
    NoMatchingCommand {
        input: String,
        suggestion: Option<String>,
    },

    /// Positional token count does not fit the selected pattern.
    #[error("'{command}' expects {expected} positional arguments, got {found}")]
    Arity {
        command: String,
        expected: Arity,
        found: usize,
    },

    /// Flag is not declared by the selected entry.
    #[error("unknown flag '{flag}' for '{command}'{}", known_suffix(.known))]
    UnknownFlag {
        flag: String,
        command: String,
        known: Vec<String>,
    },

    /// Required flag absent from the invocation.
    #[error("'{command}' requires flag '{flag}'")]
    MissingRequiredFlag { flag: String, command: String },

    /// Flag value could not be coerced to its declared type.
    #[error("flag '{flag}' expects a {expected} value, got '{value}'")]
    FlagType {
        flag: String,
        value: String,
        expected: ValueType,
    },

    /// The same flag was given more than once.
    #[error("flag '{flag}' given more than once for '{command}'")]
    DuplicateFlag { flag: String, command: String },
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(". Did you mean '{s}'?"))
}

fn known_suffix(known: &[String]) -> String {
    if known.is_empty() {
        " (this command takes no flags)".to_string()
    } else {
        format!(" (expected one of: {})", known.join(", "))
    }
}

impl DispatchError {
    /// The dispatch state in which this error was raised.
    pub const fn stage(&self) -> DispatchStage {
        match self {
            Self::NoMatchingCommand { .. } => DispatchStage::Received,
            Self::Arity { .. }
            | Self::UnknownFlag { .. }
            | Self::MissingRequiredFlag { .. }
            | Self::FlagType { .. }
            | Self::DuplicateFlag { .. } => DispatchStage::Matched,
        }
    }

    /// Usage errors share clap's exit code.
    pub const fn exit_code(&self) -> i32 {
        2
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// CRATE ERROR
// ═══════════════════════════════════════════════════════════════════════════

/// Top-level error for callers that handle every phase in one place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the process exit code for this error.
    ///
    /// - 1: configuration or registration problem
    /// - 2: usage error in the invocation
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Registration(_) | Self::Config(_) => 1,
            Self::Dispatch(err) => err.exit_code(),
        }
    }
}

impl From<PatternSyntaxError> for Error {
    fn from(err: PatternSyntaxError) -> Self {
        Self::Registration(err.into())
    }
}

impl From<FlagSchemaError> for Error {
    fn from(err: FlagSchemaError) -> Self {
        Self::Registration(err.into())
    }
}

impl From<ConflictError> for Error {
    fn from(err: ConflictError) -> Self {
        Self::Registration(err.into())
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_without_suggestion() {
        let err = DispatchError::NoMatchingCommand {
            input: "codeflare dashbord".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "no command matches 'codeflare dashbord'");
    }

    #[test]
    fn test_no_match_with_suggestion() {
        let err = DispatchError::NoMatchingCommand {
            input: "codeflare dashbord".to_string(),
            suggestion: Some("codeflare dashboard <dir>".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "no command matches 'codeflare dashbord'. Did you mean 'codeflare dashboard <dir>'?"
        );
    }

    #[test]
    fn test_unknown_flag_lists_known_flags() {
        let err = DispatchError::UnknownFlag {
            flag: "-x".to_string(),
            command: "codeflare run".to_string(),
            known: vec!["-s".to_string(), "-u".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'-x'"));
        assert!(msg.contains("-s, -u"));
    }

    #[test]
    fn test_unknown_flag_without_schema() {
        let err = DispatchError::UnknownFlag {
            flag: "--x".to_string(),
            command: "codeflare dashboard <dir>".to_string(),
            known: Vec::new(),
        };
        assert!(err.to_string().ends_with("(this command takes no flags)"));
    }

    #[test]
    fn test_dispatch_stage_of_errors() {
        let no_match = DispatchError::NoMatchingCommand {
            input: String::new(),
            suggestion: None,
        };
        assert_eq!(no_match.stage(), DispatchStage::Received);

        let arity = DispatchError::Arity {
            command: "chart <metric>".to_string(),
            expected: Arity::exactly(2),
            found: 1,
        };
        assert_eq!(arity.stage(), DispatchStage::Matched);
    }

    #[test]
    fn test_exit_codes() {
        let dispatch: Error = DispatchError::MissingRequiredFlag {
            flag: "--store".to_string(),
            command: "run".to_string(),
        }
        .into();
        assert_eq!(dispatch.exit_code(), 2);

        let registration: Error = PatternSyntaxError::Empty.into();
        assert_eq!(registration.exit_code(), 1);

        let config: Error = ConfigError::Invalid("bad".to_string()).into();
        assert_eq!(config.exit_code(), 1);
    }
}
