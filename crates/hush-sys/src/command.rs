//! External command execution with a bounded timeout.

use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::process::Command as TokioCommand;
use tokio::time::timeout as within;

use crate::error::SysError;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failed(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Both streams, for substring checks on localized tool output.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// The most informative single line: first non-empty stderr line, else
    /// the last non-empty stdout line.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let first_err = self.stderr.lines().map(str::trim).find(|l| !l.is_empty());
        let last_out = self.stdout.lines().map(str::trim).rfind(|l| !l.is_empty());
        first_err
            .or(last_out)
            .map_or_else(|| "no output".to_string(), str::to_string)
    }

    /// Convert a non-zero exit into [`SysError::CommandFailed`].
    ///
    /// # Errors
    ///
    /// When the command did not exit with code 0.
    pub fn into_result(self, program: &str) -> Result<Self, SysError> {
        if self.success() {
            return Ok(self);
        }
        Err(SysError::CommandFailed {
            program: program.to_string(),
            code: self.code.unwrap_or(-1),
            detail: self.diagnostic(),
        })
    }
}

pub trait CommandRunner {
    /// Run to completion, killing the process if `timeout` elapses.
    fn run(&self, program: &str, args: &[&str], timeout: Duration)
    -> Result<CommandOutput, SysError>;

    /// Start a process without waiting for it.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), SysError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, SysError> {
        (**self).run(program, args, timeout)
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), SysError> {
        (**self).spawn_detached(program, args)
    }
}

/// Runs real processes on a throwaway current-thread runtime so callers
/// stay synchronous.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, SysError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut cmd = TokioCommand::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        tracing::debug!(program, ?args, "running command");
        let Ok(finished) = runtime.block_on(async { within(timeout, cmd.output()).await }) else {
            tracing::warn!(program, secs = timeout.as_secs(), "command timed out");
            return Err(SysError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs(),
            });
        };
        let output = finished?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: decode_output(&output.stdout),
            stderr: decode_output(&output.stderr),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), SysError> {
        tracing::debug!(program, ?args, "spawning detached process");
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// `sfc` writes UTF-16LE when its output is redirected; everything else is
/// treated as (lossy) UTF-8.
fn decode_output(bytes: &[u8]) -> String {
    const BOM: [u8; 2] = [0xFF, 0xFE];
    let looks_wide = bytes.starts_with(&BOM)
        || (bytes.len() >= 4
            && bytes.len() % 2 == 0
            && bytes.iter().skip(1).step_by(2).take(64).all(|b| *b == 0));
    if !looks_wide {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let body = bytes.strip_prefix(&BOM).unwrap_or(bytes);
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
