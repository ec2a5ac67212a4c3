//! `chart <metric> <paths...>`: describe a resource chart across job runs.

use std::path::Path;

use codeflare_core::{
    handler_fn, BoundArguments, ChartDescriptor, CommandOutput, FeatureModule, FlagSchema,
    HandlerResult, Registrar, RegistrationError,
};
use strum::VariantNames;

use super::logdir::{self, Metric};

pub struct Chart;

impl FeatureModule for Chart {
    fn name(&self) -> &str {
        "chart"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        registrar.listen(
            "chart <metric> <paths...>",
            FlagSchema::empty(),
            handler_fn(|args, _| chart(args)),
            "Chart gpu, cpu or memory utilization across job runs",
        )?;
        Ok(())
    }
}

fn chart(args: &BoundArguments) -> HandlerResult {
    let raw = args.str("metric").unwrap_or_default();
    let metric: Metric = raw.parse().map_err(|_| {
        anyhow::anyhow!(
            "unknown metric '{raw}' (expected one of: {})",
            Metric::VARIANTS.join(", ")
        )
    })?;

    let runs = args.list("paths");
    if runs.is_empty() {
        anyhow::bail!("chart needs at least one log directory");
    }

    Ok(CommandOutput::Chart(ChartDescriptor {
        title: format!("{metric} utilization"),
        metric: metric.to_string(),
        sources: runs
            .iter()
            .map(|run| logdir::metric_file(Path::new(run), metric))
            .collect(),
    }))
}
