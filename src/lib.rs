//! # liveprobe - Concurrent HTTP Liveness Probing
//!
//! liveprobe takes candidate hostnames and URLs from discovery tooling and
//! finds out which of them answer over HTTP.
//!
//! ## Features
//!
//! - **Streaming pipeline**: dedup, normalization, probing and output run
//!   concurrently over bounded channels
//! - **Target expansion**: bare hosts expand to `https` and `http` over a
//!   configurable path list
//! - **Check protocol**: `HEAD` with `GET` fallback, retries with linear
//!   backoff, and a configurable accepted status range
//! - **Proxy rotation**: HTTP(S) and SOCKS5 proxies handed to workers
//!   round-robin
//! - **Graceful cancellation**: everything already found alive is written
//!   before a cancelled run returns
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use liveprobe::config::ProbeConfig;
//! use liveprobe::pipeline::{Pipeline, ResultSink};
//! use liveprobe::proxy::ProxyPool;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(ProbeConfig::default(), Arc::new(ProxyPool::new()))?;
//! let sink = ResultSink::create("alive.txt".as_ref()).await?;
//!
//! let (tx, rx) = mpsc::channel(64);
//! tx.send("example.com".to_string()).await?;
//! drop(tx);
//!
//! let report = pipeline.run(rx, sink, &CancellationToken::new()).await?;
//! println!("{} alive", report.alive);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`pipeline`] - Stage wiring, deduplication, normalization, and the result sink
//! - [`prober`] - The per-target check and the worker pool
//! - [`proxy`] - Proxy descriptors, the rotating pool, and client construction
//! - [`input`] - Candidate producers
//! - [`config`] - Run configuration and persisted settings
//! - [`types`] - Validated newtypes
//! - [`error`] - Error types
//! - [`output`] - Report formatting

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod prober;
pub mod proxy;
pub mod types;

// Re-export commonly used types
pub use config::ProbeConfig;
pub use error::{CliError, PipelineError, ProbeError};
pub use pipeline::{Pipeline, ResultSink, RunReport};
pub use prober::{HttpProber, ProbeOutcome, Prober, Verdict};
pub use proxy::{ProxyDescriptor, ProxyPool};
pub use types::{RunId, StatusRange, Target};
