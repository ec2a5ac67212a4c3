//! `tailf <target> [--since <time>]`: stream the lines of a job log.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use codeflare_core::{
    define_flags, handler_fn, BoundArguments, CommandOutput, FeatureModule, FlagSpec, Registrar,
    RegistrationError, ValueType,
};
use futures::{future, StreamExt, TryStreamExt};

use super::logdir;

pub struct Tailf;

impl FeatureModule for Tailf {
    fn name(&self) -> &str {
        "tailf"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        let flags = define_flags([FlagSpec::option("since", ValueType::String)])?;
        registrar.listen(
            "tailf <target>",
            flags,
            handler_fn(|args, _| tail(args)),
            "Stream a job log; --since drops lines stamped earlier than an RFC 3339 time",
        )?;
        Ok(())
    }
}

fn tail(args: &BoundArguments) -> codeflare_core::HandlerResult {
    let target = Path::new(args.str("target").unwrap_or_default());
    let since = args
        .str("since")
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("--since '{raw}' is not an RFC 3339 timestamp"))
        })
        .transpose()?;

    let lines = logdir::file_lines(resolve_target(target))
        .try_filter(move |line| future::ready(since.map_or(true, |since| !is_before(line, since))))
        .boxed();

    Ok(CommandOutput::Stream(lines))
}

/// A run directory tails its job log; anything else is tailed as a file.
fn resolve_target(target: &Path) -> PathBuf {
    if target.is_dir() {
        logdir::job_log(target)
    } else {
        target.to_path_buf()
    }
}

/// True when the line starts with a timestamp earlier than `since`.
/// Lines without a leading timestamp are never dropped.
fn is_before(line: &str, since: DateTime<FixedOffset>) -> bool {
    line.split_whitespace()
        .next()
        .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
        .is_some_and(|stamp| stamp < since)
}
