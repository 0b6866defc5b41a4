//! Per-run probe configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::types::StatusRange;
use std::time::Duration;

/// Backoff unit between failed attempts; attempt `n` sleeps `n * BACKOFF_STEP`.
pub const BACKOFF_STEP: Duration = Duration::from_millis(200);

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Number of probe workers (and the bound on in-flight requests).
    pub concurrency: usize,
    /// Overall budget for one target check, across all attempts.
    pub timeout: Duration,
    /// Extra attempts after the first one fails.
    pub retries: u32,
    /// Try `HEAD` before `GET`.
    pub head_first: bool,
    /// Let the client follow redirects.
    pub follow_redirects: bool,
    /// Status codes classified as alive.
    pub accept: StatusRange,
    /// Paths probed for every bare host.
    pub paths: Vec<String>,
    /// Expand bare hosts to both `https://` and `http://`.
    pub try_both_schemes: bool,
    /// Verify TLS certificates.
    pub verify_tls: bool,
    /// Honour `HTTP_PROXY`-style environment variables on direct clients.
    pub system_proxy: bool,
    pub user_agent: String,
    /// Capacity of the work queue and the alive-result channel.
    pub queue_capacity: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 80,
            timeout: Duration::from_secs(7),
            retries: 1,
            head_first: true,
            follow_redirects: true,
            accept: StatusRange::default(),
            paths: vec!["/".to_string()],
            try_both_schemes: true,
            verify_tls: true,
            system_proxy: true,
            user_agent: concat!("liveprobe/", env!("CARGO_PKG_VERSION")).to_string(),
            queue_capacity: 1024,
        }
    }
}

impl ProbeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-target timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_head_first(mut self, head_first: bool) -> Self {
        self.head_first = head_first;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set the accepted status range.
    pub fn with_accept(mut self, accept: StatusRange) -> Self {
        self.accept = accept;
        self
    }

    /// Set the paths probed for bare hosts.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_both_schemes(mut self, both: bool) -> Self {
        self.try_both_schemes = both;
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Paths to probe, each starting with `/`. Empty input yields `["/"]`.
    pub fn normalized_paths(&self) -> Vec<String> {
        if self.paths.is_empty() {
            return vec!["/".to_string()];
        }
        self.paths
            .iter()
            .map(|p| {
                let p = p.trim();
                if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{p}")
                }
            })
            .collect()
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue capacity must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.concurrency, 80);
        assert_eq!(config.retries, 1);
        assert!(config.head_first);
        assert!(config.follow_redirects);
        assert_eq!(config.accept, StatusRange::default());
        assert_eq!(config.paths, vec!["/"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalized_paths() {
        let config = ProbeConfig::new().with_paths(["admin", "/login", ""]);
        assert_eq!(config.normalized_paths(), vec!["/admin", "/login", "/"]);

        let empty = ProbeConfig::new().with_paths(Vec::<String>::new());
        assert_eq!(empty.normalized_paths(), vec!["/"]);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(ProbeConfig::new().with_concurrency(0).validate().is_err());
        assert!(ProbeConfig::new()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ProbeConfig::new().with_queue_capacity(0).validate().is_err());
    }
}
