//! Terminal rendering of command output.
//!
//! Streams are drained line by line as they arrive, so `tailf` and `events`
//! print while the underlying files are still being read.

use std::{fs, io::Write, path::Path};

use codeflare_core::{ChartDescriptor, CommandOutput, Table};
use futures::StreamExt;
use itertools::Itertools;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const COLUMN_GAP: &str = "  ";

/// Write one handler result to `out`.
///
/// # Errors
///
/// Returns an error when writing fails or a streamed line fails.
pub async fn render<W: Write>(output: CommandOutput, out: &mut W) -> anyhow::Result<()> {
    match output {
        CommandOutput::Text(text) => writeln!(out, "{text}")?,
        CommandOutput::Table(table) => write_table(&table, out)?,
        CommandOutput::Chart(chart) => write_chart(&chart, out)?,
        CommandOutput::Stream(mut lines) => {
            while let Some(line) = lines.next().await {
                writeln!(out, "{}", line?)?;
                out.flush()?;
            }
        }
    }
    Ok(())
}

fn write_table<W: Write>(table: &Table, out: &mut W) -> std::io::Result<()> {
    let columns = table.headers.len();
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            std::iter::once(&table.headers)
                .chain(&table.rows)
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in std::iter::once(&table.headers).chain(&table.rows) {
        let line = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .join(COLUMN_GAP);
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn write_chart<W: Write>(chart: &ChartDescriptor, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", chart.title)?;
    for source in &chart.sources {
        let samples = read_samples(source);
        match summarize(&samples) {
            Some((min, avg, max)) => writeln!(
                out,
                "  {}  min {min:.1}  avg {avg:.1}  max {max:.1}  {}",
                source.display(),
                sparkline(&samples, min, max)
            )?,
            None => writeln!(out, "  {}  no samples", source.display())?,
        }
    }
    Ok(())
}

/// Last numeric field of every line; other lines are skipped.
fn read_samples(path: &Path) -> Vec<f64> {
    fs::read_to_string(path)
        .map(|text| {
            text.lines()
                .filter_map(|line| line.split_whitespace().last()?.parse::<f64>().ok())
                .filter(|value| value.is_finite())
                .collect()
        })
        .unwrap_or_default()
}

fn summarize(samples: &[f64]) -> Option<(f64, f64, f64)> {
    let (min, max) = samples
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()?;
    #[allow(clippy::cast_precision_loss)]
    let avg = samples.iter().sum::<f64>() / samples.len() as f64;
    Some((min, avg, max))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sparkline(samples: &[f64], min: f64, max: f64) -> String {
    let span = max - min;
    let top = (SPARKS.len() - 1) as f64;
    samples
        .iter()
        .map(|value| {
            let level = if span > 0.0 {
                ((value - min) / span * top).round() as usize
            } else {
                0
            };
            SPARKS[level.min(SPARKS.len() - 1)]
        })
        .collect()
}
