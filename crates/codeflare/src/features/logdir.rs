//! Layout of a job run's log directory and async line sources over it.
//!
//! ```text
//! <run>/
//!   description.txt
//!   logs/job.txt
//!   events/<any>
//!   resources/{gpu,cpu,memory}.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::{stream, stream::BoxStream, StreamExt, TryStreamExt};
use itertools::Itertools;
use strum::{Display, EnumIter, EnumString, VariantNames};
use tokio::io::{AsyncBufReadExt, BufReader};
use walkdir::WalkDir;

pub const DESCRIPTION_FILE: &str = "description.txt";
pub const EVENTS_DIR: &str = "events";
pub const JOB_LOG: &str = "logs/job.txt";
pub const RESOURCES_DIR: &str = "resources";

/// Resource metric sampled into `resources/<metric>.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum Metric {
    Gpu,
    Cpu,
    Memory,
}

pub fn description_file(run: &Path) -> PathBuf {
    run.join(DESCRIPTION_FILE)
}

pub fn job_log(run: &Path) -> PathBuf {
    run.join(JOB_LOG)
}

pub fn metric_file(run: &Path, metric: Metric) -> PathBuf {
    run.join(RESOURCES_DIR).join(format!("{metric}.txt"))
}

/// True when the directory holds any artifact of a job run.
pub fn is_run_dir(dir: &Path) -> bool {
    description_file(dir).is_file() || job_log(dir).is_file() || dir.join(EVENTS_DIR).is_dir()
}

/// Files directly below `<run>/events`, in name order.
pub fn event_files(run: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let dir = run.join(EVENTS_DIR);
    if !dir.is_dir() {
        anyhow::bail!("no events recorded under {}", run.display());
    }

    WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_ok(|entry| entry.file_type().is_file())
        .map(|entry| entry.map(walkdir::DirEntry::into_path).map_err(anyhow::Error::from))
        .collect()
}

/// Lines of a file, read lazily when the stream is polled.
pub fn file_lines(path: PathBuf) -> BoxStream<'static, anyhow::Result<String>> {
    stream::once(async move {
        tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))
    })
    .map_ok(|file| {
        stream::unfold(BufReader::new(file).lines(), |mut lines| async move {
            let next = lines.next_line().await;
            next.transpose()
                .map(|line| (line.map_err(anyhow::Error::from), lines))
        })
    })
    .try_flatten()
    .boxed()
}
