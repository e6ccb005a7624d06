//! Integration tests for environment-driven configuration.
//!
//! Uses figment::Jail for sandboxed env var manipulation.

use std::path::PathBuf;

use figment::Jail;
use hush_config::{ConfigError, HushConfig};
use pretty_assertions::assert_eq;

#[test]
fn env_overrides_nested_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("HUSH_LOG__DIR", "C:/ProgramData/hush/logs");
        jail.set_env("HUSH_LOG__JSON", "true");
        jail.set_env("HUSH_EXEC__SERVICE_RETRIES", "5");
        jail.set_env("HUSH_AUDIT__ENABLED", "false");

        let config = HushConfig::load().expect("config loads");
        assert_eq!(config.log.dir, PathBuf::from("C:/ProgramData/hush/logs"));
        assert!(config.log.json);
        assert_eq!(config.exec.service_retries, 5);
        assert!(!config.audit.enabled);
        assert_eq!(config.exec.command_timeout_secs, 120);
        Ok(())
    });
}

#[test]
fn log_filter_variable_does_not_shadow_log_table() {
    Jail::expect_with(|jail| {
        jail.set_env("HUSH_LOG", "hush=debug");
        jail.set_env("HUSH_LOG__LEVEL", "warn");

        let config = HushConfig::load().expect("config loads alongside HUSH_LOG");
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.dir, PathBuf::from("logs"));
        Ok(())
    });
}

#[test]
fn audit_dir_override_is_independent_of_log_dir() {
    Jail::expect_with(|jail| {
        jail.set_env("HUSH_AUDIT__DIR", "audit");

        let config = HushConfig::load().expect("config loads");
        assert_eq!(config.audit_dir(), std::path::Path::new("audit"));
        assert_eq!(config.log.dir, PathBuf::from("logs"));
        Ok(())
    });
}

#[test]
fn malformed_number_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.set_env("HUSH_EXEC__COMMAND_TIMEOUT_SECS", "soon");

        let err = HushConfig::load().expect_err("should fail");
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

#[test]
fn zero_timeout_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("HUSH_EXEC__REPAIR_TIMEOUT_SECS", "0");

        let err = HushConfig::load().expect_err("should fail");
        match err {
            ConfigError::InvalidValue { field, .. } => {
                assert_eq!(field, "exec.repair_timeout_secs");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    });
}

#[test]
fn unrelated_env_vars_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("ZENITH_LOG__DIR", "elsewhere");
        jail.set_env("HUSHX_LOG__DIR", "elsewhere");

        let config = HushConfig::load().expect("config loads");
        assert_eq!(config.log.dir, PathBuf::from("logs"));
        Ok(())
    });
}
