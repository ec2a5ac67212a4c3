//! `browse [<dir>]`: list job runs and other entries of a directory.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local};
use codeflare_core::{
    handler_fn, BoundArguments, CommandOutput, FeatureModule, FlagSchema, HandlerResult, Registrar,
    RegistrationError, Table,
};
use walkdir::WalkDir;

use super::logdir;

const CURRENT_DIR: &str = ".";

pub struct Browse;

impl FeatureModule for Browse {
    fn name(&self) -> &str {
        "browse"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        registrar.listen(
            "browse [<dir>]",
            FlagSchema::empty(),
            handler_fn(|args, _| browse(args)),
            "List job run directories (defaults to the current directory)",
        )?;
        Ok(())
    }
}

fn browse(args: &BoundArguments) -> HandlerResult {
    let root = Path::new(args.str("dir").unwrap_or(CURRENT_DIR));
    let mut table = Table::new(["name", "kind", "modified"]);

    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to browse {}", root.display()))?;
        let kind = if !entry.file_type().is_dir() {
            "file"
        } else if logdir::is_run_dir(entry.path()) {
            "run"
        } else {
            "dir"
        };
        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map_or_else(
                || "-".to_string(),
                |time| DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string(),
            );

        table.push_row([
            entry.file_name().to_string_lossy().into_owned(),
            kind.to_string(),
            modified,
        ]);
    }

    Ok(CommandOutput::Table(table))
}
