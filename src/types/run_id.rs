//! Unique identifiers for pipeline runs.
//!
//! Every run gets a `RunId` so log lines and reports from concurrent runs
//! can be told apart.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A unique identifier for one pipeline run.
///
/// Uses UUID v4 internally for globally unique identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get a short representation (first 8 characters).
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_run_id_short() {
        let id = RunId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn test_run_id_serializes_as_plain_string() {
        let id = RunId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
