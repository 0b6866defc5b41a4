//! Prober trait abstraction.
//!
//! Defines the interface a worker uses to check one target, so the worker
//! pool can run against real HTTP clients or test doubles.

use crate::error::ProbeError;
use crate::types::Target;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Liveness verdict for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// A response with an accepted status was received.
    Alive,
    /// Every attempt failed or was rejected.
    NotAlive,
    /// The check was cut short by its deadline or by cancellation.
    /// Counts as not alive for the target.
    Aborted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "alive"),
            Self::NotAlive => write!(f, "not alive"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of checking one target.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub target: Target,
    pub verdict: Verdict,
    /// Last HTTP status received, if any.
    pub status: Option<u16>,
    /// Last error that kept the target from being alive.
    pub error: Option<ProbeError>,
    /// Attempts started (each attempt may try several methods).
    pub attempts: u32,
}

impl ProbeOutcome {
    pub fn alive(target: Target, status: u16, attempts: u32) -> Self {
        Self {
            target,
            verdict: Verdict::Alive,
            status: Some(status),
            error: None,
            attempts,
        }
    }

    pub fn not_alive(
        target: Target,
        status: Option<u16>,
        error: Option<ProbeError>,
        attempts: u32,
    ) -> Self {
        Self {
            target,
            verdict: Verdict::NotAlive,
            status,
            error,
            attempts,
        }
    }

    pub fn aborted(target: Target, error: ProbeError) -> Self {
        Self {
            target,
            verdict: Verdict::Aborted,
            status: None,
            error: Some(error),
            attempts: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.verdict == Verdict::Alive
    }
}

/// Trait for liveness checkers.
///
/// Implementations must observe `cancel` at every suspension point and
/// return promptly once it fires.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Check a single target.
    async fn probe(&self, target: &Target, cancel: &CancellationToken) -> ProbeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Alive.to_string(), "alive");
        assert_eq!(Verdict::NotAlive.to_string(), "not alive");
        assert_eq!(Verdict::Aborted.to_string(), "aborted");
    }

    #[test]
    fn test_outcome_constructors() {
        let target = Target::parse("https://example.com/").unwrap();
        let alive = ProbeOutcome::alive(target.clone(), 200, 1);
        assert!(alive.is_alive());
        assert_eq!(alive.status, Some(200));

        let aborted = ProbeOutcome::aborted(target, ProbeError::Cancelled);
        assert!(!aborted.is_alive());
        assert!(aborted.error.as_ref().is_some_and(ProbeError::is_terminal));
    }
}
