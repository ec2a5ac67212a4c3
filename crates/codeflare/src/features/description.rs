//! `description <dir>`: show the description recorded for a job run.

use std::path::Path;

use anyhow::Context;
use codeflare_core::{
    handler_fn, BoundArguments, CommandOutput, FeatureModule, FlagSchema, HandlerResult, Registrar,
    RegistrationError,
};

use super::logdir;

pub struct Description;

impl FeatureModule for Description {
    fn name(&self) -> &str {
        "description"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        registrar.listen(
            "description <dir>",
            FlagSchema::empty(),
            handler_fn(|args, _| describe(args)),
            "Show the description of a job run",
        )?;
        Ok(())
    }
}

fn describe(args: &BoundArguments) -> HandlerResult {
    let run = Path::new(args.str("dir").unwrap_or_default());
    let path = logdir::description_file(run);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("no description found for {}", run.display()))?;
    Ok(CommandOutput::Text(text.trim_end().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::dispatch_with;

    #[test]
    fn test_description_text() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        std::fs::write(
            dir.path().join(logdir::DESCRIPTION_FILE),
            "Fine-tune run on 4 GPUs\n\n",
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let path = dir.path().display().to_string();
        let output = dispatch_with(&Description, &["codeflare", "description", path.as_str()])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(output, CommandOutput::Text(ref text) if text == "Fine-tune run on 4 GPUs"));
    }

    #[test]
    fn test_description_missing() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().display().to_string();
        let err = dispatch_with(&Description, &["codeflare", "description", path.as_str()])
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().starts_with("no description found for"));
    }
}
