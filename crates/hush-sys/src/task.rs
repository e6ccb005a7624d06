//! Scheduled task control through `schtasks.exe`.

use std::time::Duration;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::SysError;
use crate::ports::TaskPort;

const SCHTASKS: &str = "schtasks.exe";

pub struct SchtasksScheduler<R> {
    runner: R,
    timeout: Duration,
}

impl<R: CommandRunner> SchtasksScheduler<R> {
    pub const fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl<R: CommandRunner> TaskPort for SchtasksScheduler<R> {
    /// Looks the task up in the full CSV listing rather than parsing
    /// `/query /tn` errors, whose wording follows the system locale.
    fn exists(&self, path: &str) -> Result<bool, SysError> {
        let tn = rooted(path);
        let out = self
            .runner
            .run(SCHTASKS, &["/query", "/fo", "csv", "/nh"], self.timeout)?;
        if !out.success() {
            return Err(classify(path, &out));
        }
        Ok(listed_names(&out.stdout).any(|name| name.eq_ignore_ascii_case(&tn)))
    }

    fn disable(&self, path: &str) -> Result<(), SysError> {
        let tn = rooted(path);
        let out = self
            .runner
            .run(SCHTASKS, &["/change", "/tn", &tn, "/disable"], self.timeout)?;
        if out.success() {
            return Ok(());
        }
        Err(classify(path, &out))
    }
}

fn rooted(path: &str) -> String {
    format!("\\{}", path.trim_start_matches('\\'))
}

/// First CSV column of every row: the rooted task name.
fn listed_names(csv: &str) -> impl Iterator<Item = &str> {
    csv.lines()
        .filter_map(|line| line.split("\",\"").next())
        .map(|name| name.trim().trim_matches('"'))
        .filter(|name| name.starts_with('\\'))
}

fn classify(path: &str, out: &CommandOutput) -> SysError {
    let text = out.combined().to_ascii_lowercase();
    if text.contains("cannot find") || text.contains("does not exist") {
        SysError::not_found("scheduled task", path)
    } else if text.contains("access is denied") {
        SysError::AccessDenied(format!("scheduled task {path}"))
    } else {
        SysError::CommandFailed {
            program: SCHTASKS.to_string(),
            code: out.code.unwrap_or(-1),
            detail: out.diagnostic(),
        }
    }
}
