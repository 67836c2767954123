//! User configuration (`~/.salesboard/config.json`)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::monitor::{LIST_POLL_INTERVAL, TASK_POLL_INTERVAL};
use crate::types::{Result, SalesboardError};

/// Default API root of the task service
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Auto,
    Dark,
    Light,
}

impl std::str::FromStr for ThemeChoice {
    type Err = SalesboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(SalesboardError::Config(format!("unknown theme {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub task_poll_ms: u64,
    pub list_poll_ms: u64,
    pub request_timeout_secs: u64,
    pub theme: ThemeChoice,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            task_poll_ms: TASK_POLL_INTERVAL.as_millis() as u64,
            list_poll_ms: LIST_POLL_INTERVAL.as_millis() as u64,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            theme: ThemeChoice::Auto,
        }
    }
}

impl Config {
    /// `~/.salesboard`, shared with the log file
    pub fn data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| SalesboardError::Config("cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".salesboard"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.json"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            SalesboardError::Config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(SalesboardError::Config("api_url is empty".into()));
        }
        if self.task_poll_ms == 0 || self.list_poll_ms == 0 {
            return Err(SalesboardError::Config(
                "poll intervals must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn task_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_ms)
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_millis(self.list_poll_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_poll_cadence() {
        let config = Config::default();
        assert_eq!(config.task_interval(), Duration::from_millis(2000));
        assert_eq!(config.list_interval(), Duration::from_millis(5000));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.theme, ThemeChoice::Auto);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_url": "http://tasks.internal/api", "theme": "light"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://tasks.internal/api");
        assert_eq!(config.theme, ThemeChoice::Light);
        assert_eq!(config.task_poll_ms, 2000);
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, SalesboardError::Config(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"task_poll_ms": 0}"#).unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            theme: ThemeChoice::Dark,
            list_poll_ms: 7000,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("DARK".parse::<ThemeChoice>().unwrap(), ThemeChoice::Dark);
        assert!("sepia".parse::<ThemeChoice>().is_err());
    }
}
