//! `events <dir> [-k|--kind <kind>]`: stream recorded job events.

use std::path::Path;

use codeflare_core::{
    define_flags, handler_fn, BoundArguments, CommandOutput, FeatureModule, FlagSpec, HandlerResult,
    Registrar, RegistrationError, ValueType,
};
use futures::{future, stream, StreamExt, TryStreamExt};

use super::logdir;

pub struct Events;

impl FeatureModule for Events {
    fn name(&self) -> &str {
        "events"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        let flags = define_flags([FlagSpec::option("kind", ValueType::String).alias("k")])?;
        registrar.listen(
            "events <dir>",
            flags,
            handler_fn(|args, _| events(args)),
            "Stream the events recorded for a job run, optionally filtered by kind",
        )?;
        Ok(())
    }
}

fn events(args: &BoundArguments) -> HandlerResult {
    let run = Path::new(args.str("dir").unwrap_or_default());
    let files = logdir::event_files(run)?;
    let kind = args.str("kind").map(str::to_string);

    let lines = stream::iter(files)
        .flat_map(logdir::file_lines)
        .try_filter(move |line| {
            future::ready(kind.as_deref().map_or(true, |kind| line.contains(kind)))
        })
        .boxed();

    Ok(CommandOutput::Stream(lines))
}
