//! Liveness probing.
//!
//! [`HttpProber`] runs the per-target check protocol (method fallback,
//! retries with linear backoff, status acceptance); [`WorkerPool`] runs a
//! fixed number of probers concurrently over a shared work queue.

mod check;
mod pool;
mod traits;

pub use check::{classify, Classification, HttpProber};
pub use pool::{PoolSnapshot, PoolStats, WorkerPool};
pub use traits::{ProbeOutcome, Prober, Verdict};
