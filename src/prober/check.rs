//! HTTP liveness check.
//!
//! One check runs `retries + 1` attempts. Each attempt tries `HEAD` (when
//! enabled) and then `GET`; the first accepted response ends the check.
//! The whole check shares a single deadline and the run's cancellation
//! token, and neither consumes retries: either one ends the check at once.

use super::traits::{ProbeOutcome, Prober};
use crate::config::{ProbeConfig, BACKOFF_STEP};
use crate::error::{ProbeError, ProbeResult};
use crate::types::Target;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// How a single response is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Alive,
    /// `HEAD` answered 403/405: fall through to `GET` in the same attempt.
    Inconclusive,
    Rejected,
}

/// Classify one response status according to the acceptance policy.
pub fn classify(method: &Method, status: u16, config: &ProbeConfig) -> Classification {
    if *method == Method::HEAD && matches!(status, 403 | 405) {
        return Classification::Inconclusive;
    }
    if config.accept.contains(status) {
        return Classification::Alive;
    }
    // Without redirect following, the redirect itself proves liveness.
    if !config.follow_redirects && (300..400).contains(&status) {
        return Classification::Alive;
    }
    Classification::Rejected
}

/// Prober bound to one HTTP client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    config: Arc<ProbeConfig>,
    methods: Vec<Method>,
}

impl HttpProber {
    pub fn new(client: Client, config: Arc<ProbeConfig>) -> Self {
        let methods = if config.head_first {
            vec![Method::HEAD, Method::GET]
        } else {
            vec![Method::GET]
        };
        Self {
            client,
            config,
            methods,
        }
    }

    async fn send(&self, method: Method, target: &Target) -> ProbeResult<u16> {
        let response = self
            .client
            .request(method, target.url().clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Request(e)
                }
            })?;
        Ok(response.status().as_u16())
    }

    /// Attempt loop without the deadline; the caller races it against the
    /// deadline and the cancellation token.
    async fn attempts(&self, target: &Target) -> ProbeOutcome {
        let retries = self.config.retries;
        let mut last_status = None;
        let mut last_error = None;

        for attempt in 0..=retries {
            for method in &self.methods {
                match self.send(method.clone(), target).await {
                    Ok(status) => {
                        last_status = Some(status);
                        match classify(method, status, &self.config) {
                            Classification::Alive => {
                                return ProbeOutcome::alive(target.clone(), status, attempt + 1)
                            }
                            Classification::Inconclusive => continue,
                            Classification::Rejected => {
                                debug!(%method, status, attempt, "rejected status");
                                last_error = Some(ProbeError::Rejected(status));
                            }
                        }
                    }
                    Err(e) if e.is_terminal() => return ProbeOutcome::aborted(target.clone(), e),
                    Err(e) => {
                        debug!(%method, attempt, error = %e, "request failed");
                        last_error = Some(e);
                    }
                }
            }

            if attempt < retries {
                tokio::time::sleep(BACKOFF_STEP * (attempt + 1)).await;
            }
        }

        ProbeOutcome::not_alive(target.clone(), last_status, last_error, retries + 1)
    }
}

#[async_trait]
impl Prober for HttpProber {
    #[instrument(level = "debug", skip_all, fields(target = %target))]
    async fn probe(&self, target: &Target, cancel: &CancellationToken) -> ProbeOutcome {
        if cancel.is_cancelled() {
            return ProbeOutcome::aborted(target.clone(), ProbeError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => ProbeOutcome::aborted(target.clone(), ProbeError::Cancelled),
            _ = tokio::time::sleep(self.config.timeout) => {
                ProbeOutcome::aborted(target.clone(), ProbeError::Timeout)
            }
            outcome = self.attempts(target) => outcome,
        }
    }
}
