//! `dashboard <dir>`: the panels available for one job run.

use std::path::Path;

use codeflare_core::{
    handler_fn, BoundArguments, CommandOutput, FeatureModule, FlagSchema, HandlerResult, Registrar,
    RegistrationError, Table,
};
use strum::IntoEnumIterator;

use super::logdir::{self, Metric};

pub struct Dashboard;

impl FeatureModule for Dashboard {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        registrar.listen(
            "dashboard <dir>",
            FlagSchema::empty(),
            handler_fn(|args, _| dashboard(args)),
            "Summarize the panels available for a job run",
        )?;
        Ok(())
    }
}

fn dashboard(args: &BoundArguments) -> HandlerResult {
    let run = Path::new(args.str("dir").unwrap_or_default());
    if !run.is_dir() {
        anyhow::bail!("{} is not a directory", run.display());
    }

    let mut table = Table::new(["panel", "source", "detail"]);

    let description = logdir::description_file(run);
    if let Ok(text) = std::fs::read_to_string(&description) {
        let summary = text.lines().next().unwrap_or_default().to_string();
        table.push_row(["description".to_string(), description.display().to_string(), summary]);
    }

    let log = logdir::job_log(run);
    if let Ok(text) = std::fs::read_to_string(&log) {
        let detail = format!("{} lines", text.lines().count());
        table.push_row(["logs".to_string(), log.display().to_string(), detail]);
    }

    if let Ok(files) = logdir::event_files(run) {
        let source = run.join(logdir::EVENTS_DIR).display().to_string();
        table.push_row(["events".to_string(), source, format!("{} files", files.len())]);
    }

    for metric in Metric::iter() {
        let samples = logdir::metric_file(run, metric);
        if samples.is_file() {
            table.push_row([metric.to_string(), samples.display().to_string(), "chart".to_string()]);
        }
    }

    if table.rows.is_empty() {
        anyhow::bail!("no dashboard panels found under {}", run.display());
    }
    Ok(CommandOutput::Table(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::dispatch_with;

    #[test]
    fn test_dashboard_panels() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let run = dir.path();
        std::fs::write(run.join(logdir::DESCRIPTION_FILE), "Ray tune sweep\nmore\n")
            .unwrap_or_else(|e| panic!("{e}"));
        std::fs::create_dir_all(run.join("logs")).unwrap_or_else(|e| panic!("{e}"));
        std::fs::write(logdir::job_log(run), "a\nb\nc\n").unwrap_or_else(|e| panic!("{e}"));
        std::fs::create_dir_all(run.join(logdir::RESOURCES_DIR)).unwrap_or_else(|e| panic!("{e}"));
        std::fs::write(logdir::metric_file(run, Metric::Gpu), "10\n20\n")
            .unwrap_or_else(|e| panic!("{e}"));

        let path = run.display().to_string();
        let output = dispatch_with(&Dashboard, &["codeflare", "dashboard", path.as_str()])
            .unwrap_or_else(|e| panic!("{e}"));
        let CommandOutput::Table(table) = output else {
            panic!("expected a table");
        };

        let panels: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|row| (row[0].as_str(), row[2].as_str()))
            .collect();
        assert_eq!(
            panels,
            [
                ("description", "Ray tune sweep"),
                ("logs", "3 lines"),
                ("gpu", "chart")
            ]
        );
    }

    #[test]
    fn test_empty_dashboard_is_an_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().display().to_string();
        assert!(dispatch_with(&Dashboard, &["codeflare", "dashboard", path.as_str()]).is_err());
    }
}
