//! Host configuration
//!
//! Read from a TOML file. A missing default file is not an error: every
//! field has a default, so the pedometer runs without any configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use stride_core::{EngineConfig, ResetTime};

/// File looked for in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "stride.toml";

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "stride-data";

/// Default playback rate for untimed replay lines
pub const DEFAULT_REPLAY_RATE_HZ: u32 = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Where the step record, reset time, and history are kept
    pub data_dir: PathBuf,
    /// Applied on first start when nothing is stored yet
    pub default_reset_time: Option<String>,
    pub engine: EngineConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Recording to feed the engine from; no sensor when absent
    pub samples: Option<PathBuf>,
    pub rate_hz: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_reset_time: None,
            engine: EngineConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            samples: None,
            rate_hz: DEFAULT_REPLAY_RATE_HZ,
        }
    }
}

impl HostConfig {
    /// Parse and validate TOML text
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        if let Some(time) = &config.default_reset_time {
            if !ResetTime::is_valid(time) {
                bail!("default_reset_time {time:?} is not HH:MM");
            }
        }
        Ok(config)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            tracing::debug!("no configuration file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("loading {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(HostConfig::parse("").unwrap(), HostConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = HostConfig::parse(
            r#"
data_dir = "/var/lib/stride"
default_reset_time = "04:00"

[engine]
step_threshold = 11.5
debounce_ms = 250

[replay]
samples = "walk.csv"
rate_hz = 25
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/stride"));
        assert_eq!(config.default_reset_time.as_deref(), Some("04:00"));
        assert_eq!(config.engine.step_threshold, 11.5);
        assert_eq!(config.engine.debounce_ms, 250);
        assert_eq!(config.replay.samples, Some(PathBuf::from("walk.csv")));
        assert_eq!(config.replay.rate_hz, 25);
    }

    #[test]
    fn test_partial_engine_section() {
        let config = HostConfig::parse("[engine]\ndebounce_ms = 500\n").unwrap();
        assert_eq!(config.engine.step_threshold, 12.0);
        assert_eq!(config.engine.debounce_ms, 500);
    }

    #[test]
    fn test_rejects_bad_reset_time() {
        assert!(HostConfig::parse("default_reset_time = \"7:00\"").is_err());
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(HostConfig::parse("step_threshold = 3.0").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HostConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
