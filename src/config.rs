//! Client Configuration
//!
//! Read from a JSON file; every field has a default, and a few can be
//! overridden from the environment:
//!
//! - `JOBTRACK_API_URL`
//! - `JOBTRACK_TIMEOUT_MS`
//! - `JOBTRACK_LOG_DIR`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "JOBTRACK_API_URL";
pub const ENV_TIMEOUT_MS: &str = "JOBTRACK_TIMEOUT_MS";
pub const ENV_LOG_DIR: &str = "JOBTRACK_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, without the `/api` prefix
    pub api_url: String,
    pub timeout_ms: u64,
    /// No file logging when unset
    pub log_dir: Option<PathBuf>,
    pub app_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            timeout_ms: 15_000,
            log_dir: None,
            app_name: "jobtrack".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `JOBTRACK_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "timeout_ms",
                reason: format!("{} is not a number of milliseconds", raw),
            })?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api_url",
                reason: format!("{:?} is not an http(s) URL", self.api_url),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "app_name",
                reason: "cannot be blank".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url": "https://jobs.example.com"}"#).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "https://jobs.example.com");
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.app_name, "jobtrack");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ClientConfig {
            timeout_ms: 2_500,
            log_dir: Some(dir.path().join("logs")),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_absent_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::load_or_default(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://api.example.com"),
            (ENV_TIMEOUT_MS, "500"),
            (ENV_LOG_DIR, "/tmp/jobtrack"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/jobtrack")));
    }

    #[test]
    fn test_bad_values_rejected() {
        let err = ClientConfig::default()
            .with_overrides(|k| (k == ENV_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timeout_ms", .. }));

        let bad_url = ClientConfig { api_url: "localhost".into(), ..Default::default() };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
