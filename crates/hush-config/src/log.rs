//! Logging configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_level() -> String {
    "info".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from("logs")
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Default filter directive when `HUSH_LOG` is unset and neither
    /// `--quiet` nor `--verbose` is given.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the per-run log file.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Write a `system_changes_<timestamp>.log` file in addition to stderr.
    #[serde(default = "default_true")]
    pub file: bool,

    /// Emit the log file as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_dir(),
            file: default_true(),
            json: false,
        }
    }
}

impl LogConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::invalid("log.level", "must not be empty"));
        }
        if self.file && self.dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "log.dir",
                "must not be empty when file logging is enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.dir, PathBuf::from("logs"));
        assert!(config.file);
        assert!(!config.json);
    }

    #[test]
    fn empty_level_is_rejected() {
        let config = LogConfig {
            level: " ".to_string(),
            ..LogConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
