//! Persisted settings and paths.
//!
//! Default probe options live in an XDG-compliant `settings.json`; command
//! line flags override them per run.

use crate::config::ProbeConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::types::StatusRange;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/liveprobe)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "liveprobe", "liveprobe")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Default probe options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub retries: u32,
    pub head_first: bool,
    pub follow_redirects: bool,
    pub accept: StatusRange,
    pub paths: Vec<String>,
    pub try_both_schemes: bool,
    pub verify_tls: bool,
    pub user_agent: Option<String>,
    pub queue_capacity: usize,
    /// Proxy list used when no `--proxies` flag is given.
    pub proxies_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&ProbeConfig::default())
    }
}

impl From<&ProbeConfig> for Settings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout_ms: config.timeout.as_millis() as u64,
            retries: config.retries,
            head_first: config.head_first,
            follow_redirects: config.follow_redirects,
            accept: config.accept,
            paths: config.paths.clone(),
            try_both_schemes: config.try_both_schemes,
            verify_tls: config.verify_tls,
            user_agent: None,
            queue_capacity: config.queue_capacity,
            proxies_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::resolve()?.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build a run configuration from these settings.
    pub fn to_probe_config(&self) -> ProbeConfig {
        let config = ProbeConfig::new()
            .with_concurrency(self.concurrency)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retries(self.retries)
            .with_head_first(self.head_first)
            .with_follow_redirects(self.follow_redirects)
            .with_accept(self.accept)
            .with_paths(self.paths.clone())
            .with_both_schemes(self.try_both_schemes)
            .with_verify_tls(self.verify_tls)
            .with_queue_capacity(self.queue_capacity);

        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.concurrency, 80);
        assert_eq!(settings.timeout_ms, 7000);
        assert_eq!(settings.accept.to_string(), "200-399");
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"concurrency": 12, "accept": "200-299"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.concurrency, 12);
        assert_eq!(settings.retries, 1);

        let config = settings.to_probe_config();
        assert_eq!(config.concurrency, 12);
        assert!(!config.accept.contains(301));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.user_agent = Some("custom/1.0".into());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.to_probe_config().user_agent, "custom/1.0");
    }

    #[test]
    fn test_invalid_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));
        assert!(matches!(
            Settings::load_from(&dir.path().join("missing.json")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
