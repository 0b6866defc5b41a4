//! Probe target types.
//!
//! A candidate is whatever an upstream collaborator produced: a bare
//! hostname (`example.com`) or a full URL (`http://example.com/x`).
//! A [`Target`] is the normalized absolute URL that actually gets probed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Schemes a target may carry.
pub const SCHEMES: [&str; 2] = ["https", "http"];

/// An absolute `http`/`https` URL with a host and a non-empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target(Url);

impl Target {
    /// Parse and validate an absolute URL.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        let mut url = Url::parse(s).map_err(|e| TargetError::InvalidUrl(s.to_string(), e))?;

        if !SCHEMES.contains(&url.scheme()) {
            return Err(TargetError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(TargetError::MissingHost(s.to_string()));
        }
        if url.path().is_empty() {
            url.set_path("/");
        }

        Ok(Self(url))
    }

    /// The underlying URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// The serialized URL.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Target {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.0.into()
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error type for target parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("URL '{0}' has no host")]
    MissingHost(String),
}

/// Whether a candidate carries an explicit `http://` or `https://` prefix.
pub fn has_explicit_scheme(candidate: &str) -> bool {
    let lower = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether an input line should be ignored entirely (blank or `#` comment).
pub fn is_skippable_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}
