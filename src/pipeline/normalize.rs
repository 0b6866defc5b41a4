//! Candidate normalization.
//!
//! Turns raw candidates into absolute probe URLs:
//!
//! - `http://…` / `https://…` candidates are parsed as-is (path defaults to `/`)
//! - bare hosts expand to every configured path under `https` then `http`,
//!   or to a single `https://host/` when dual-scheme expansion is off
//!
//! Blank and `#` lines are skipped; unparsable candidates are dropped.

use crate::config::ProbeConfig;
use crate::types::{has_explicit_scheme, is_skippable_line, Target, SCHEMES};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Expands candidates into targets, never emitting the same URL twice.
#[derive(Debug)]
pub struct Normalizer {
    paths: Vec<String>,
    both_schemes: bool,
    emitted: HashSet<String>,
}

/// Counters reported when the stage finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub candidates: u64,
    pub targets: u64,
}

impl Normalizer {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            paths: config.normalized_paths(),
            both_schemes: config.try_both_schemes,
            emitted: HashSet::new(),
        }
    }

    /// Expand one candidate into the targets not emitted before.
    pub fn expand(&mut self, candidate: &str) -> Vec<Target> {
        if is_skippable_line(candidate) {
            return Vec::new();
        }
        let candidate = candidate.trim();

        let targets = if has_explicit_scheme(candidate) {
            Target::parse(candidate).ok().into_iter().collect()
        } else {
            self.expand_host(candidate)
        };

        if targets.is_empty() {
            debug!(candidate, "dropping unparsable candidate");
        }

        targets
            .into_iter()
            .filter(|t| self.emitted.insert(t.as_str().to_string()))
            .collect()
    }

    fn expand_host(&self, host: &str) -> Vec<Target> {
        let host = host.trim_end_matches('/');
        if !self.both_schemes {
            return Target::parse(&format!("https://{host}/"))
                .ok()
                .into_iter()
                .collect();
        }

        self.paths
            .iter()
            .flat_map(|path| {
                SCHEMES
                    .iter()
                    .filter_map(move |scheme| Target::parse(&format!("{scheme}://{host}{path}")).ok())
            })
            .collect()
    }

    /// Consume `input` until it closes (or `cancel` fires), sending targets
    /// to `output`. `output` is dropped on return.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<String>,
        output: mpsc::Sender<Target>,
        cancel: CancellationToken,
    ) -> NormalizeStats {
        let mut stats = NormalizeStats::default();

        'outer: loop {
            let candidate = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                candidate = input.recv() => match candidate {
                    Some(candidate) => candidate,
                    None => break,
                },
            };
            stats.candidates += 1;

            for target in self.expand(&candidate) {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'outer,
                    sent = output.send(target) => {
                        if sent.is_err() {
                            break 'outer;
                        }
                    }
                }
                stats.targets += 1;
            }
        }

        debug!(
            candidates = stats.candidates,
            targets = stats.targets,
            "normalizer finished"
        );
        stats
    }
}
