//! Probe subcommand implementation.
//!
//! Handles `liveprobe probe <inputs>...`: runs the full pipeline and writes
//! alive targets to the output file.

use crate::cli::OutputFormat;
use crate::config::{ProbeConfig, Settings};
use crate::error::{CliResult, ConfigResult, PipelineError};
use crate::input::{spawn_producers, InputSource};
use crate::output;
use crate::pipeline::{Pipeline, ResultSink};
use crate::proxy::ProxyPool;
use crate::types::StatusRange;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Probe candidates and write the alive targets.
#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Candidate files, one host or URL per line ("-" reads stdin)
    #[arg(value_name = "INPUT", default_value = "-")]
    pub inputs: Vec<PathBuf>,

    /// File receiving alive targets (truncated)
    #[arg(short, long, value_name = "FILE", default_value = "alive.txt")]
    pub output: PathBuf,

    /// Number of probe workers
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Per-target timeout in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Retries after a failed attempt
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Accepted status codes (e.g. "200-399" or "200")
    #[arg(short, long)]
    pub accept: Option<StatusRange>,

    /// Path to probe on every bare host (repeatable)
    #[arg(short, long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Only send GET requests
    #[arg(long)]
    pub no_head: bool,

    /// Do not follow redirects (a redirect then counts as alive)
    #[arg(long)]
    pub no_follow: bool,

    /// Expand bare hosts to https only
    #[arg(long)]
    pub https_only: bool,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Proxy list, one URL per line
    #[arg(short = 'x', long, value_name = "FILE")]
    pub proxies: Option<PathBuf>,

    /// Output format for the run report
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Hide the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl ProbeCommand {
    /// Apply command-line overrides on top of persisted settings.
    pub fn probe_config(&self, settings: &Settings) -> ProbeConfig {
        let mut config = settings.to_probe_config();

        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_millis(timeout));
        }
        if let Some(retries) = self.retries {
            config = config.with_retries(retries);
        }
        if let Some(accept) = self.accept {
            config = config.with_accept(accept);
        }
        if !self.paths.is_empty() {
            config = config.with_paths(self.paths.clone());
        }
        if self.no_head {
            config = config.with_head_first(false);
        }
        if self.no_follow {
            config = config.with_follow_redirects(false);
        }
        if self.https_only {
            config = config.with_both_schemes(false);
        }
        if self.insecure {
            config = config.with_verify_tls(false);
        }
        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(agent.clone());
        }
        config
    }

    /// Execute the probe command.
    pub async fn execute(
        &self,
        settings: Settings,
        quiet: bool,
        cancel: CancellationToken,
    ) -> CliResult<()> {
        let config = self.probe_config(&settings);

        let pool = Arc::new(ProxyPool::new());
        if let Some(path) = self.proxies.as_ref().or(settings.proxies_file.as_ref()) {
            let loaded = pool.load_file(path)?;
            if loaded == 0 && !quiet {
                output::print_warning(&format!(
                    "no usable proxies in {}, connecting directly",
                    path.display()
                ));
            }
        }

        let sources = self
            .inputs
            .iter()
            .map(|path| InputSource::open(path))
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut pipeline = Pipeline::new(config, Arc::clone(&pool))?;
        let sink = ResultSink::create(&self.output)
            .await
            .map_err(PipelineError::Sink)?;

        let plain = self.format == OutputFormat::Plain;
        if plain && !quiet {
            output::print_run_header(
                sources.len(),
                pipeline.config().concurrency,
                pool.count(),
                &self.output,
            );
        }

        let progress = (!quiet && !self.no_progress).then(spinner);
        if let Some(pb) = &progress {
            pipeline = pipeline.with_progress(pb.clone());
        }

        let (tx, rx) = mpsc::channel(pipeline.config().queue_capacity);
        let producers = spawn_producers(sources, tx, &cancel);

        let result = pipeline.run(rx, sink, &cancel).await;

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }
        for producer in producers {
            producer
                .await
                .map_err(|e| crate::error::CliError::Other(format!("input task failed: {e}")))??;
        }

        match result {
            Ok(report) => {
                output::print_report(&report, self.format)?;
                if plain && !quiet {
                    output::print_success(&format!(
                        "{} alive targets written to {}",
                        report.written,
                        self.output.display()
                    ));
                }
                Ok(())
            }
            Err(PipelineError::Cancelled(report)) => {
                output::print_report(&report, self.format)?;
                Err(PipelineError::Cancelled(report).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} probed {msg}")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> ProbeCommand {
        let mut argv = vec!["liveprobe", "probe"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Probe(cmd) => cmd,
            _ => panic!("expected probe command"),
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            concurrency: 50,
            retries: 3,
            ..Settings::default()
        };
        let cmd = parse(&["-c", "10", "--no-head", "--https-only", "-k", "-t", "2500"]);
        let config = cmd.probe_config(&settings);

        assert_eq!(config.concurrency, 10);
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(!config.head_first);
        assert!(!config.try_both_schemes);
        assert!(!config.verify_tls);
        assert!(config.follow_redirects);
    }

    #[test]
    fn test_settings_used_without_flags() {
        let settings = Settings {
            paths: vec!["/login".to_string()],
            ..Settings::default()
        };
        let config = parse(&[]).probe_config(&settings);
        assert_eq!(config.paths, vec!["/login".to_string()]);
        assert_eq!(config.accept, StatusRange::default());
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("alive.txt");
        let cmd = parse(&[
            "/nonexistent/hosts.txt",
            "-o",
            out.to_str().unwrap(),
            "--no-progress",
        ]);

        let result = cmd
            .execute(Settings::default(), true, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(crate::error::CliError::Config(_))));
        assert!(!out.exists());
    }
}
