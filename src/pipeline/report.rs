//! Summary of one pipeline run.

use crate::prober::PoolSnapshot;
use crate::types::RunId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a run did, stage by stage.
///
/// A cancelled run still produces a report; `cancelled` is set and the
/// counters cover the work that completed.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub workers: usize,
    pub proxies: usize,
    /// Candidates read from the producers, duplicates included.
    pub candidates_received: u64,
    pub unique_candidates: u64,
    /// Normalized targets handed to the workers.
    pub targets_queued: u64,
    pub probed: u64,
    pub alive: u64,
    pub not_alive: u64,
    pub aborted: u64,
    /// Alive targets written to the output.
    pub written: u64,
    pub cancelled: bool,
}

impl RunReport {
    pub(crate) fn new(run_id: RunId, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            started_at,
            completed_at: started_at,
            duration_ms: 0,
            workers: 0,
            proxies: 0,
            candidates_received: 0,
            unique_candidates: 0,
            targets_queued: 0,
            probed: 0,
            alive: 0,
            not_alive: 0,
            aborted: 0,
            written: 0,
            cancelled: false,
        }
    }

    pub(crate) fn record_probes(&mut self, snapshot: PoolSnapshot) {
        self.probed = snapshot.probed;
        self.alive = snapshot.alive;
        self.not_alive = snapshot.not_alive;
        self.aborted = snapshot.aborted;
    }

    pub(crate) fn finish(&mut self) {
        self.completed_at = Utc::now();
        self.duration_ms = (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
    }

    /// Alive results per second of wall time.
    pub fn alive_rate(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.alive as f64 * 1000.0 / self.duration_ms as f64
    }
}
