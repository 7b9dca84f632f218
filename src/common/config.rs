//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::{config_path, default_results_dir};
use super::Result;
use crate::exec::bash::DEFAULT_TIMEOUT;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where result artifacts go
    #[serde(default)]
    pub results: ResultsConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Result artifact settings
#[derive(Debug, Deserialize, Default)]
pub struct ResultsConfig {
    /// Root directory; each case writes under `{dir}/{case_name}`
    pub dir: Option<PathBuf>,
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Bound used when `max_duration` is given but malformed
    #[serde(default = "default_max_duration")]
    pub default_max_duration_secs: u64,

    /// Bound used when `max_duration` is not given at all.
    /// Unset means the child is waited for without a deadline.
    #[serde(default)]
    pub absent_max_duration_secs: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_max_duration_secs: default_max_duration(),
            absent_max_duration_secs: None,
        }
    }
}

fn default_max_duration() -> u64 {
    DEFAULT_TIMEOUT
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Results root, falling back to the platform data directory
    pub fn results_dir(&self) -> PathBuf {
        self.results.dir.clone().unwrap_or_else(default_results_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.timeouts.default_max_duration_secs, 180);
        assert!(config.timeouts.absent_max_duration_secs.is_none());
        assert!(config.results.dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
[results]
dir = "/srv/results"

[timeouts]
default_max_duration_secs = 60
absent_max_duration_secs = 900
"#,
        )
        .unwrap();
        assert_eq!(config.results_dir(), PathBuf::from("/srv/results"));
        assert_eq!(config.timeouts.default_max_duration_secs, 60);
        assert_eq!(config.timeouts.absent_max_duration_secs, Some(900));
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = Config::parse("[timeouts]\ndefault_max_duration_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/harness.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::FileRead { .. }));
    }
}
