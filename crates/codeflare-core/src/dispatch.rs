//! Resolver and dispatcher.
//!
//! One invocation moves through
//! `Received -> Matched -> Bound -> Dispatched -> {Completed | Failed}`:
//!
//! 1. **Matched**: the registry returns literal-consistent candidates; the
//!    first one wins. No candidates means [`DispatchError::NoMatchingCommand`]
//!    with a closest-match suggestion.
//! 2. **Bound**: positional tokens bind to captures and flags are validated
//!    against the winner's schema. A failure here is final; the next
//!    candidate is never tried.
//! 3. **Dispatched**: the handler runs exactly once and its result is
//!    returned untouched.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::fmt;

use crate::{
    args::{BoundArguments, Value},
    config::SuggestionConfig,
    error::DispatchError,
    handler::{CommandContext, CommandOutput, HandlerResult},
    help::{help_for, suggest},
    invocation::Invocation,
    pattern::Segment,
    registry::{Candidate, Registry, RegistryEntry},
};

const HELP_FLAG: &str = "help";

/// States of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Received,
    Matched,
    Bound,
    Dispatched,
    Completed,
    Failed,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Matched => "matched",
            Self::Bound => "bound",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An invocation resolved to one entry with validated arguments.
#[derive(Debug)]
pub struct Resolved<'r> {
    pub entry: &'r RegistryEntry,
    pub args: BoundArguments,
}

/// Resolves invocations against a registry and invokes handlers.
///
/// Holds the registry by shared reference; dispatch never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    suggestions: SuggestionConfig,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            suggestions: SuggestionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_suggestions(mut self, suggestions: SuggestionConfig) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Resolve and bind without invoking the handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when nothing matches, the positional count
    /// does not fit the selected pattern, or a flag fails validation.
    pub fn resolve(&self, invocation: &Invocation) -> Result<Resolved<'r>, DispatchError> {
        tracing::debug!(stage = %DispatchStage::Received, input = %invocation, "dispatch");

        let candidate = self.select(invocation)?;
        tracing::debug!(
            stage = %DispatchStage::Matched,
            pattern = %candidate.entry.pattern(),
            "dispatch"
        );

        let args = bind(&candidate)?;
        tracing::debug!(stage = %DispatchStage::Bound, arguments = args.len(), "dispatch");

        Ok(Resolved {
            entry: candidate.entry,
            args,
        })
    }

    /// Resolve, bind and invoke exactly one handler.
    ///
    /// The outer `Result` is the routing outcome; the inner
    /// [`HandlerResult`] is the handler's own outcome, unmodified.
    ///
    /// `--help` returns scoped usage text instead of invoking anything,
    /// unless the selected entry declares its own `help` flag.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] exactly as [`Dispatcher::resolve`] does.
    pub fn dispatch(&self, invocation: &Invocation) -> Result<HandlerResult, DispatchError> {
        if let Some(text) = self.help_requested(invocation) {
            return Ok(Ok(CommandOutput::Text(text)));
        }

        let resolved = self.resolve(invocation)?;
        let ctx = CommandContext {
            registry: self.registry,
            pattern: resolved.entry.pattern(),
        };

        tracing::debug!(
            stage = %DispatchStage::Dispatched,
            id = %resolved.entry.id(),
            "dispatch"
        );
        let outcome = resolved.entry.handler().handle(&resolved.args, &ctx);

        let stage = if outcome.is_ok() {
            DispatchStage::Completed
        } else {
            DispatchStage::Failed
        };
        tracing::debug!(stage = %stage, "dispatch");

        Ok(outcome)
    }

    fn select<'i>(&self, invocation: &'i Invocation) -> Result<Candidate<'r, 'i>, DispatchError> {
        self.registry
            .find_candidates(invocation)
            .into_iter()
            .next()
            .ok_or_else(|| {
                let words: Vec<&str> = invocation.words().collect();
                DispatchError::NoMatchingCommand {
                    input: invocation.to_string(),
                    suggestion: self
                        .suggestions
                        .enabled
                        .then(|| suggest(self.registry, &words, self.suggestions.max_distance))
                        .flatten(),
                }
            })
    }

    fn help_requested(&self, invocation: &Invocation) -> Option<String> {
        if !invocation.has_flag(HELP_FLAG) {
            return None;
        }

        match self.registry.find_candidates(invocation).into_iter().next() {
            Some(candidate) if candidate.entry.flags().declares(HELP_FLAG) => None,
            Some(candidate) => {
                let prefix = candidate.entry.pattern().literal_prefix().join(" ");
                Some(help_for(self.registry, Some(&prefix)))
            }
            None => Some(help_for(self.registry, None)),
        }
    }
}

/// Bind positional tokens to captures and validate flags.
fn bind(candidate: &Candidate<'_, '_>) -> Result<BoundArguments, DispatchError> {
    let pattern = candidate.entry.pattern();
    let positionals = &candidate.split.positionals;
    let command = pattern.to_string();

    if !candidate.fits() {
        return Err(DispatchError::Arity {
            command,
            expected: pattern.arity(),
            found: positionals.len(),
        });
    }

    let mut args = candidate
        .entry
        .flags()
        .validate(&candidate.split.flags, &command)?;

    for (index, segment) in pattern.segments().iter().enumerate() {
        match segment {
            Segment::Literal(_) => {}
            Segment::Capture(name) | Segment::OptionalCapture(name) => {
                if let Some(token) = positionals.get(index) {
                    args.insert(name.clone(), Value::String((*token).to_string()));
                }
            }
            Segment::Variadic(name) => {
                let rest = positionals
                    .get(index..)
                    .unwrap_or_default()
                    .iter()
                    .map(|token| (*token).to_string())
                    .collect();
                args.insert(name.clone(), Value::List(rest));
            }
        }
    }

    Ok(args)
}
