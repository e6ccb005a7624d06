//! # hush-config
//!
//! Configuration loading for hush using figment.
//!
//! hush deliberately reads no configuration file. Sources, highest wins:
//! 1. Environment variables (`HUSH_*` prefix, `__` as separator)
//! 2. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HUSH_LOG__DIR` -> `log.dir`, `HUSH_EXEC__SERVICE_RETRIES` ->
//! `exec.service_retries`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use hush_config::HushConfig;
//!
//! let config = HushConfig::load().expect("config");
//! println!("logs go to {}", config.log.dir.display());
//! ```

mod audit;
mod error;
mod exec;
mod log;

pub use audit::AuditConfig;
pub use error::ConfigError;
pub use exec::ExecConfig;
pub use log::LogConfig;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HushConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl HushConfig {
    /// Load configuration from defaults and `HUSH_*` environment variables,
    /// then validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Figment`] when a variable does not parse into its
    /// field type, [`ConfigError::InvalidValue`] when validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        // `HUSH_LOG` is the tracing filter, not the `log` table.
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("HUSH_").ignore(&["log"]).split("__"))
    }

    /// Check cross-field constraints the type system cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log.validate()?;
        self.exec.validate()?;
        Ok(())
    }

    /// Directory audit files are written to.
    #[must_use]
    pub fn audit_dir(&self) -> &std::path::Path {
        self.audit.dir.as_deref().unwrap_or(&self.log.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HushConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.log.file);
        assert!(config.audit.enabled);
    }

    #[test]
    fn figment_builds_without_env() {
        let config: HushConfig = HushConfig::figment().extract().expect("defaults extract");
        assert_eq!(config.exec.command_timeout_secs, 120);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn audit_dir_falls_back_to_log_dir() {
        let mut config = HushConfig::default();
        assert_eq!(config.audit_dir(), config.log.dir.as_path());

        config.audit.dir = Some("audit".into());
        assert_eq!(config.audit_dir(), std::path::Path::new("audit"));
    }
}
