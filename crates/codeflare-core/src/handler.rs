//! Handler capability, execution context and result descriptors.
//!
//! The routing core never inspects a handler. It hands over
//! [`BoundArguments`] plus a [`CommandContext`] and passes back whatever
//! [`HandlerResult`] comes out, unmodified.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::{fmt, path::PathBuf, sync::Arc};

use futures::stream::BoxStream;

use crate::{args::BoundArguments, pattern::CommandPattern, registry::Registry};

/// Outcome of a handler, passed through the dispatcher verbatim.
pub type HandlerResult = anyhow::Result<CommandOutput>;

/// Rows and column headers for tabular output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(row);
        self
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

/// What to plot and from where; drawing is up to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDescriptor {
    pub title: String,
    pub metric: String,
    pub sources: Vec<PathBuf>,
}

/// Result shape of a handler.
pub enum CommandOutput {
    Text(String),
    Table(Table),
    /// Lines produced asynchronously; the handler has already returned.
    Stream(BoxStream<'static, anyhow::Result<String>>),
    Chart(ChartDescriptor),
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Table(_) => "table",
            Self::Stream(_) => "stream",
            Self::Chart(_) => "chart",
        }
    }
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Table(table) => f.debug_tuple("Table").field(table).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Chart(chart) => f.debug_tuple("Chart").field(chart).finish(),
        }
    }
}

/// Read-only view handed to a handler for one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// The registry the command was resolved from.
    pub registry: &'a Registry,
    /// Pattern of the entry being invoked.
    pub pattern: &'a CommandPattern,
}

/// A command implementation.
///
/// Invoked exactly once per successful dispatch. May return a stream to
/// keep producing output after returning.
pub trait Handler: Send + Sync {
    fn handle(&self, args: &BoundArguments, ctx: &CommandContext<'_>) -> HandlerResult;
}

struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&BoundArguments, &CommandContext<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, args: &BoundArguments, ctx: &CommandContext<'_>) -> HandlerResult {
        (self.0)(args, ctx)
    }
}

/// Wrap a closure as a shared handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&BoundArguments, &CommandContext<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}
