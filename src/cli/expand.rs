//! Expand subcommand implementation.
//!
//! Runs the dedup and normalizer stages alone and prints every target that
//! would be probed, one per line.

use crate::config::Settings;
use crate::error::{CliError, CliResult, ConfigResult};
use crate::input::{spawn_producers, InputSource};
use crate::pipeline::{Deduplicator, Normalizer};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Print the targets candidates expand to.
#[derive(Parser, Debug)]
pub struct ExpandCommand {
    /// Candidate files ("-" reads stdin)
    #[arg(value_name = "INPUT", default_value = "-")]
    pub inputs: Vec<PathBuf>,

    /// Path to append to every bare host (repeatable)
    #[arg(short, long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Expand bare hosts to https only
    #[arg(long)]
    pub https_only: bool,
}

impl ExpandCommand {
    /// Execute the expand command.
    pub async fn execute(&self, settings: Settings, cancel: CancellationToken) -> CliResult<()> {
        let mut config = settings.to_probe_config();
        if !self.paths.is_empty() {
            config = config.with_paths(self.paths.clone());
        }
        if self.https_only {
            config = config.with_both_schemes(false);
        }

        let sources = self
            .inputs
            .iter()
            .map(|path| InputSource::open(path))
            .collect::<ConfigResult<Vec<_>>>()?;

        let capacity = config.queue_capacity.max(1);
        let (candidate_tx, candidate_rx) = mpsc::channel(capacity);
        let (unique_tx, unique_rx) = mpsc::channel(capacity);
        let (target_tx, mut target_rx) = mpsc::channel(capacity);

        let producers = spawn_producers(sources, candidate_tx, &cancel);
        let dedup = tokio::spawn(Deduplicator::new().run(candidate_rx, unique_tx, cancel.clone()));
        let normalize =
            tokio::spawn(Normalizer::new(&config).run(unique_rx, target_tx, cancel.clone()));

        let mut out = io::stdout();
        while let Some(target) = target_rx.recv().await {
            writeln!(out, "{target}")?;
        }
        out.flush()?;

        let task_failed = |e: tokio::task::JoinError| CliError::Other(format!("task failed: {e}"));
        dedup.await.map_err(task_failed)?;
        normalize.await.map_err(task_failed)?;
        for producer in producers {
            producer.await.map_err(task_failed)??;
        }
        Ok(())
    }
}
