//! Limits for calls into external subsystems.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_command_timeout() -> u64 {
    120
}

const fn default_repair_timeout() -> u64 {
    7200
}

const fn default_service_retries() -> u32 {
    3
}

const fn default_retry_backoff() -> u64 {
    500
}

const fn default_stop_wait() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecConfig {
    /// Upper bound for any single `sc`/`schtasks`/`tasklist` invocation.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Upper bound for `sfc` and `DISM`, which routinely run for many minutes.
    #[serde(default = "default_repair_timeout")]
    pub repair_timeout_secs: u64,

    /// Extra attempts for service-control calls that fail transiently
    /// (service is starting or stopping).
    #[serde(default = "default_service_retries")]
    pub service_retries: u32,

    /// Initial backoff between retries; doubled after each attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// How long a stop waits for the service to leave the running state.
    #[serde(default = "default_stop_wait")]
    pub stop_wait_secs: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            repair_timeout_secs: default_repair_timeout(),
            service_retries: default_service_retries(),
            retry_backoff_ms: default_retry_backoff(),
            stop_wait_secs: default_stop_wait(),
        }
    }
}

impl ExecConfig {
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    #[must_use]
    pub const fn repair_timeout(&self) -> Duration {
        Duration::from_secs(self.repair_timeout_secs)
    }

    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    #[must_use]
    pub const fn stop_wait(&self) -> Duration {
        Duration::from_secs(self.stop_wait_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "exec.command_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.repair_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "exec.repair_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.stop_wait_secs > self.command_timeout_secs {
            return Err(ConfigError::invalid(
                "exec.stop_wait_secs",
                "must not exceed exec.command_timeout_secs",
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
        let config = ExecConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(120));
        assert_eq!(config.repair_timeout(), Duration::from_secs(7200));
        assert_eq!(config.service_retries, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(500));
        assert_eq!(config.stop_wait(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ExecConfig {
            command_timeout_secs: 0,
            ..ExecConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn stop_wait_longer_than_timeout_is_rejected() {
        let config = ExecConfig {
            command_timeout_secs: 10,
            stop_wait_secs: 20,
            ..ExecConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
