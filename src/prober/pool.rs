//! Probe worker pool.
//!
//! A fixed set of workers, each bound to its own prober, pull targets from
//! one shared queue. Which worker claims which target is unspecified; the
//! shared queue is the load balancer. In-flight requests never exceed the
//! worker count.

use super::traits::{ProbeOutcome, Prober, Verdict};
use crate::error::{PipelineError, PipelineResult};
use crate::types::Target;
use indicatif::ProgressBar;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Counters shared by all workers of one pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    probed: AtomicU64,
    alive: AtomicU64,
    not_alive: AtomicU64,
    aborted: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub probed: u64,
    pub alive: u64,
    pub not_alive: u64,
    pub aborted: u64,
}

impl PoolStats {
    fn record(&self, outcome: &ProbeOutcome) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome.verdict {
            Verdict::Alive => &self.alive,
            Verdict::NotAlive => &self.not_alive,
            Verdict::Aborted => &self.aborted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            probed: self.probed.load(Ordering::Relaxed),
            alive: self.alive.load(Ordering::Relaxed),
            not_alive: self.not_alive.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }
}

type SharedQueue = Arc<Mutex<mpsc::Receiver<Target>>>;

/// A bounded set of probe workers.
pub struct WorkerPool {
    probers: Vec<Arc<dyn Prober>>,
    stats: Arc<PoolStats>,
    progress: Option<ProgressBar>,
}

impl WorkerPool {
    /// One worker per prober.
    pub fn new(probers: Vec<Arc<dyn Prober>>) -> Self {
        Self {
            probers,
            stats: Arc::new(PoolStats::default()),
            progress: None,
        }
    }

    /// Tick a progress bar once per probed target.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.probers.len()
    }

    /// Shared counters, readable while the pool runs.
    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Run every worker until the queue closes or `cancel` fires.
    ///
    /// Alive targets go to `alive`. The pool's copies of the `alive` sender
    /// are dropped when the last worker returns, which closes the channel
    /// once no other senders remain.
    pub async fn run(
        self,
        queue: mpsc::Receiver<Target>,
        alive: mpsc::Sender<Target>,
        cancel: CancellationToken,
    ) -> PipelineResult<PoolSnapshot> {
        let queue: SharedQueue = Arc::new(Mutex::new(queue));
        info!(workers = self.probers.len(), "probe workers starting");

        let handles: Vec<_> = self
            .probers
            .into_iter()
            .enumerate()
            .map(|(id, prober)| {
                tokio::spawn(worker(
                    id,
                    prober,
                    Arc::clone(&queue),
                    alive.clone(),
                    cancel.clone(),
                    Arc::clone(&self.stats),
                    self.progress.clone(),
                ))
            })
            .collect();
        drop(alive);

        for joined in futures::future::join_all(handles).await {
            joined.map_err(|e| PipelineError::Stage("probe", e.to_string()))?;
        }

        let snapshot = self.stats.snapshot();
        info!(
            probed = snapshot.probed,
            alive = snapshot.alive,
            "probe workers finished"
        );
        Ok(snapshot)
    }
}

async fn worker(
    id: usize,
    prober: Arc<dyn Prober>,
    queue: SharedQueue,
    alive: mpsc::Sender<Target>,
    cancel: CancellationToken,
    stats: Arc<PoolStats>,
    progress: Option<ProgressBar>,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            target = async { queue.lock().await.recv().await } => target,
        };
        let Some(target) = next else { break };

        let outcome = prober.probe(&target, &cancel).await;
        stats.record(&outcome);
        if let Some(pb) = &progress {
            pb.inc(1);
        }

        match outcome.verdict {
            Verdict::Alive => {
                debug!(worker = id, target = %target, status = ?outcome.status, "alive");
                if let Some(pb) = &progress {
                    pb.set_message(format!("alive: {target}"));
                }
                // Classified results are always delivered. The sink drains
                // until the channel closes, so this only fails once it is gone.
                if alive.send(target).await.is_err() {
                    break;
                }
            }
            Verdict::NotAlive | Verdict::Aborted => {
                debug!(
                    worker = id,
                    target = %outcome.target,
                    verdict = %outcome.verdict,
                    status = ?outcome.status,
                    error = ?outcome.error.as_ref().map(ToString::to_string),
                    "dropped"
                );
            }
        }
    }
    debug!(worker = id, "worker exiting");
}
