//! The per-run logging session.
//!
//! Constructed once at start-up and dropped at exit. Console output goes to
//! stderr; unless disabled, a second layer writes the same events to
//! `system_changes_<YYYYMMDD_HHMMSS>.log` in the configured directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use hush_config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::GlobalFlags;

/// Overrides every other level setting when present.
pub const LOG_ENV: &str = "HUSH_LOG";

/// Keeps the file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the session stops file logging"]
#[derive(Debug)]
pub struct LogSession {
    guard: Option<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogSession {
    /// Install the global subscriber.
    ///
    /// # Errors
    ///
    /// When the log directory cannot be created or a subscriber is
    /// already installed.
    pub fn init(config: &LogConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(config, flags)));

        let mut layers = Vec::new();
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .boxed(),
        );

        let (guard, file) = if config.file {
            fs::create_dir_all(&config.dir).with_context(|| {
                format!("failed to create log directory {}", config.dir.display())
            })?;
            let name = log_file_name(Local::now());
            let appender = tracing_appender::rolling::never(&config.dir, &name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            layers.push(if config.json {
                layer.json().boxed()
            } else {
                layer.boxed()
            });
            (Some(guard), Some(config.dir.join(name)))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .context("failed to initialize tracing subscriber")?;

        Ok(Self { guard, file })
    }

    /// Path of this run's log file, if file logging is on.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("flushing log file");
        }
    }
}

fn default_directive(config: &LogConfig, flags: &GlobalFlags) -> String {
    if flags.quiet {
        "error".to_string()
    } else if flags.verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

fn log_file_name(now: DateTime<Local>) -> String {
    format!("system_changes_{}.log", now.format("%Y%m%d_%H%M%S"))
}
