//! Process-wide table of command registrations.
//!
//! The registry is built explicitly at startup and passed by reference to
//! every feature module and to the dispatcher; there is no hidden global.
//! Entries are kept in specificity order so both lookup and help listings
//! are independent of the order modules were loaded in.
//!
//! Conflicts are detected on insert: a pattern is rejected when some token
//! sequence would match it and an existing pattern position for position
//! (see [`CommandPattern::overlaps`]), since specificity could not order the
//! two.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::{fmt, sync::Arc};

use crate::{
    error::{ConflictError, FlagSchemaError, RegistrationError},
    flags::{FlagSchema, Split},
    handler::Handler,
    invocation::Invocation,
    pattern::{compile, CommandPattern, Specificity},
};

/// Identifier returned by a successful registration.
///
/// Ids are the monotonic sequence numbers used as the final tie-break, so
/// an earlier registration always has a smaller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered command.
pub struct RegistryEntry {
    id: RegistrationId,
    pattern: CommandPattern,
    specificity: Specificity,
    flags: FlagSchema,
    handler: Arc<dyn Handler>,
    help: String,
}

impl RegistryEntry {
    pub const fn id(&self) -> RegistrationId {
        self.id
    }

    pub const fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }

    pub const fn flags(&self) -> &FlagSchema {
        &self.flags
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub(crate) fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    fn rank(&self) -> (&Specificity, RegistrationId) {
        (&self.specificity, self.id)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("pattern", &self.pattern.to_string())
            .field("flags", &self.flags.synopsis())
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

/// An entry whose literal segments agree with an invocation.
#[derive(Debug)]
pub struct Candidate<'r, 'i> {
    pub entry: &'r RegistryEntry,
    /// The invocation split with this entry's flag schema.
    pub split: Split<'i>,
}

impl Candidate<'_, '_> {
    /// True when the positional count fits the pattern's arity.
    pub fn fits(&self) -> bool {
        self.entry.pattern.arity().contains(self.split.positionals.len())
    }
}

/// Table of registrations, ordered by specificity.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    next_sequence: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and register it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the template does not compile,
    /// a flag collides with a capture name, or the pattern conflicts with an
    /// existing entry.
    pub fn register(
        &mut self,
        template: &str,
        flags: FlagSchema,
        handler: Arc<dyn Handler>,
        help: impl Into<String>,
    ) -> Result<RegistrationId, RegistrationError> {
        let pattern = compile(template)?;
        self.insert(pattern, flags, handler, help)
    }

    /// Register an already compiled pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::FlagSchema`] when a flag spelling equals
    /// a capture name, and [`RegistrationError::Conflict`] when the pattern
    /// overlaps an existing entry.
    pub fn insert(
        &mut self,
        pattern: CommandPattern,
        flags: FlagSchema,
        handler: Arc<dyn Handler>,
        help: impl Into<String>,
    ) -> Result<RegistrationId, RegistrationError> {
        if let Some(name) = pattern.capture_names().find(|name| flags.declares(name)) {
            return Err(FlagSchemaError::CaptureCollision {
                name: name.to_string(),
            }
            .into());
        }

        if let Some(existing) = self.entries.iter().find(|e| e.pattern.overlaps(&pattern)) {
            return Err(ConflictError {
                pattern: pattern.to_string(),
                existing: existing.pattern.to_string(),
                existing_id: existing.id,
            }
            .into());
        }

        let id = RegistrationId(self.next_sequence);
        self.next_sequence += 1;

        let entry = RegistryEntry {
            id,
            specificity: pattern.specificity(),
            pattern,
            flags,
            handler,
            help: help.into(),
        };

        tracing::info!(id = %id, pattern = %entry.pattern, "registered command");

        let position = self
            .entries
            .partition_point(|existing| existing.rank() < entry.rank());
        self.entries.insert(position, entry);

        Ok(id)
    }

    /// Remove an entry. Returns false when the id is unknown.
    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(id = %id, "unregistered command");
        }
        removed
    }

    pub fn get(&self, id: RegistrationId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries in specificity order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose literal segments are consistent with the invocation.
    ///
    /// Entries that accept the positional count come first; within each
    /// group the order is specificity, then registration sequence.
    pub fn find_candidates<'r, 'i>(&'r self, invocation: &'i Invocation) -> Vec<Candidate<'r, 'i>> {
        let mut candidates: Vec<Candidate<'r, 'i>> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let split = entry.flags.split(invocation);
                entry
                    .pattern
                    .literals_consistent(&split.positionals)
                    .then_some(Candidate { entry, split })
            })
            .collect();

        // Stable: keeps specificity order inside each group.
        candidates.sort_by_key(|candidate| !candidate.fits());
        candidates
    }
}
