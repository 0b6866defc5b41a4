//! Error types for liveprobe.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-target failures
//! (`ProbeError`) never leave a worker; everything else is run-level.

use crate::pipeline::RunReport;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single probe attempt against one target.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("status {0} outside accepted range")]
    Rejected(u16),

    #[error("probe deadline exceeded")]
    Timeout,

    #[error("probe cancelled")]
    Cancelled,
}

impl ProbeError {
    /// Whether this failure ends the whole check instead of consuming a retry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Timeout | Self::Cancelled)
    }
}

/// Configuration and input errors. These are fatal to a run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid proxy '{0}': {1}")]
    InvalidProxy(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the result sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to create output {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    /// Reported only after every queued result has been written.
    #[error("run cancelled after writing {written} results")]
    Cancelled { written: u64 },
}

/// Run-level pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(SinkError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("pipeline stage '{0}' failed: {1}")]
    Stage(&'static str, String),

    /// The run was cancelled; the report covers the work that completed.
    #[error("run cancelled ({} alive results flushed)", .0.written)]
    Cancelled(Box<RunReport>),
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// CLI-specific errors.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Target(#[from] crate::types::TargetError),

    #[error(transparent)]
    StatusRange(#[from] crate::types::StatusRangeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for probe attempts.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type alias for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
