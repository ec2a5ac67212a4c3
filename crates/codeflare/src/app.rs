//! The assembled application: configuration, the one registry and the
//! dispatch loop shared by one-shot and interactive use.

use std::io::Write;

use anyhow::anyhow;
use codeflare_core::{
    help_for, install_modules, Config, DispatchError, Dispatcher, HandlerResult, Invocation,
    Registry, StartupReport,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::{features, render::render};

/// Outcome of one dispatched command.
pub type Outcome = Result<HandlerResult, DispatchError>;

#[derive(Debug)]
pub struct App {
    config: Config,
    registry: Registry,
}

impl App {
    /// Build the registry from every feature module under the configured
    /// namespace. Modules that fail to register are left out and reported.
    pub fn new(config: Config) -> (Self, StartupReport) {
        let mut registry = Registry::new();
        let report = install_modules(&mut registry, &config.namespace, &features::all());
        (Self { config, registry }, report)
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry).with_suggestions(self.config.suggestions)
    }

    pub fn usage(&self) -> String {
        help_for(&self.registry, None)
    }

    /// Dispatch command-line words below the namespace, so `dashboard dir`
    /// runs `codeflare dashboard dir`. A rooted command path such as `/help`
    /// is dispatched as is.
    pub fn dispatch_args<S: AsRef<str>>(&self, args: &[S]) -> Outcome {
        let (rooted, words) = command_path(args.iter().map(|arg| arg.as_ref().to_string()));
        let namespace = (!rooted).then(|| self.config.namespace.clone());
        let tokens = namespace.into_iter().chain(words);
        self.dispatcher().dispatch(&Invocation::new(tokens))
    }

    /// Dispatch one interactive line as typed. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error when the line has unbalanced quotes.
    pub fn dispatch_line(&self, line: &str) -> anyhow::Result<Option<Outcome>> {
        let tokens = shlex::split(line).ok_or_else(|| anyhow!("unbalanced quotes in '{line}'"))?;
        if tokens.is_empty() {
            return Ok(None);
        }
        let (_, words) = command_path(tokens);
        Ok(Some(self.dispatcher().dispatch(&Invocation::new(words))))
    }
}

/// The first word is a command path and splits on `/` like a template, so
/// `/help` and `codeflare/dashboard` name registered literals. Later words
/// are arguments and keep their slashes. Returns whether the path was rooted.
fn command_path<I: IntoIterator<Item = String>>(tokens: I) -> (bool, Vec<String>) {
    let mut tokens = tokens.into_iter();
    let Some(first) = tokens.next() else {
        return (false, Vec::new());
    };
    if first.starts_with('-') || !first.contains('/') {
        return (false, std::iter::once(first).chain(tokens).collect());
    }

    let words = first
        .split('/')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .chain(tokens)
        .collect();
    (first.starts_with('/'), words)
}

/// Render an outcome to `out`, print failures to stderr and return the exit
/// code: 0 on success, 1 when the handler failed, 2 for usage errors.
pub async fn settle<W: Write>(outcome: Outcome, out: &mut W) -> i32 {
    match outcome {
        Ok(Ok(output)) => match render(output, out).await {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("Error: {err:#}");
                1
            }
        },
        Ok(Err(err)) => {
            eprintln!("Error: {err:#}");
            1
        }
        Err(err) => {
            tracing::debug!(stage = %err.stage(), "dispatch failed");
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

/// Read commands line by line until end of input or `exit`/`quit`.
///
/// A failing command does not end the session. Returns the exit code of the
/// last command run.
pub async fn interactive<R, W>(app: &App, input: R, out: &mut W) -> i32
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut lines = BufReader::new(input).lines();
    let mut last = 0;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                eprintln!("Error: failed to read input: {err}");
                return 1;
            }
        };

        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }

        last = match app.dispatch_line(line) {
            Ok(None) => continue,
            Ok(Some(outcome)) => settle(outcome, out).await,
            Err(err) => {
                eprintln!("Error: {err}");
                2
            }
        };
    }

    last
}
