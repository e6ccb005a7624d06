//! Service control through `sc.exe`.
//!
//! `sc` reports the Win32 error code as its exit code, which is what the
//! classification below keys on.

use std::thread;
use std::time::{Duration, Instant};

use crate::command::{CommandOutput, CommandRunner};
use crate::error::SysError;
use crate::ports::ServicePort;

const SC: &str = "sc.exe";

const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_DEPENDENT_SERVICES_RUNNING: i32 = 1051;
const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;
const ERROR_SERVICE_CANNOT_ACCEPT_CTRL: i32 = 1061;
const ERROR_SERVICE_NOT_ACTIVE: i32 = 1062;

const SERVICE_STOPPED: u32 = 1;

const STOP_POLL: Duration = Duration::from_millis(250);

pub struct ScServiceControl<R> {
    runner: R,
    timeout: Duration,
    stop_wait: Duration,
}

impl<R: CommandRunner> ScServiceControl<R> {
    pub const fn new(runner: R, timeout: Duration, stop_wait: Duration) -> Self {
        Self {
            runner,
            timeout,
            stop_wait,
        }
    }

    fn sc(&self, args: &[&str]) -> Result<CommandOutput, SysError> {
        self.runner.run(SC, args, self.timeout)
    }

    fn query_state(&self, name: &str) -> Result<u32, SysError> {
        let out = self.sc(&["query", name])?;
        if !out.success() {
            return Err(classify(name, &out));
        }
        parse_state(&out.stdout).ok_or_else(|| SysError::CommandFailed {
            program: SC.to_string(),
            code: 0,
            detail: format!("no STATE line in `sc query {name}` output"),
        })
    }

    fn wait_until_stopped(&self, name: &str) -> Result<(), SysError> {
        let started = Instant::now();
        loop {
            if !self.is_running(name)? {
                return Ok(());
            }
            if started.elapsed() >= self.stop_wait {
                return Err(SysError::Transient {
                    name: name.to_string(),
                    detail: format!("still stopping after {}s", self.stop_wait.as_secs()),
                });
            }
            thread::sleep(STOP_POLL);
        }
    }
}

impl<R: CommandRunner> ServicePort for ScServiceControl<R> {
    fn exists(&self, name: &str) -> Result<bool, SysError> {
        match self.query_state(name) {
            Ok(_) => Ok(true),
            Err(err) if err.is_absent() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn is_running(&self, name: &str) -> Result<bool, SysError> {
        Ok(self.query_state(name)? != SERVICE_STOPPED)
    }

    fn stop(&self, name: &str) -> Result<(), SysError> {
        let out = self.sc(&["stop", name])?;
        if out.success() {
            return self.wait_until_stopped(name);
        }
        match out.code {
            Some(ERROR_SERVICE_NOT_ACTIVE) => {
                tracing::debug!(service = name, "service already stopped");
                Ok(())
            }
            _ => Err(classify(name, &out)),
        }
    }

    fn disable(&self, name: &str) -> Result<(), SysError> {
        // `sc` wants `start=` and the mode as separate arguments.
        let out = self.sc(&["config", name, "start=", "disabled"])?;
        if out.success() {
            return Ok(());
        }
        Err(classify(name, &out))
    }
}

fn classify(name: &str, out: &CommandOutput) -> SysError {
    match out.code {
        Some(ERROR_SERVICE_DOES_NOT_EXIST) => SysError::not_found("service", name),
        Some(ERROR_ACCESS_DENIED) => SysError::AccessDenied(format!("service {name}")),
        Some(ERROR_SERVICE_CANNOT_ACCEPT_CTRL) => SysError::Transient {
            name: name.to_string(),
            detail: out.diagnostic(),
        },
        Some(ERROR_DEPENDENT_SERVICES_RUNNING) => SysError::CommandFailed {
            program: SC.to_string(),
            code: ERROR_DEPENDENT_SERVICES_RUNNING,
            detail: format!("other running services depend on {name}"),
        },
        code => SysError::CommandFailed {
            program: SC.to_string(),
            code: code.unwrap_or(-1),
            detail: out.diagnostic(),
        },
    }
}

/// Extract the numeric state from `sc query` output:
///
/// ```text
///         STATE              : 4  RUNNING
/// ```
fn parse_state(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("STATE"))
        .and_then(|line| line.split_once(':'))
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|code| code.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::ScriptedRunner;
    use pretty_assertions::assert_eq;

    const RUNNING: &str = "\nSERVICE_NAME: DiagTrack\n        TYPE               : 10  WIN32_OWN_PROCESS\n        STATE              : 4  RUNNING\n                                (STOPPABLE, NOT_PAUSABLE, ACCEPTS_SHUTDOWN)\n";
    const STOPPED: &str = "\nSERVICE_NAME: DiagTrack\n        TYPE               : 10  WIN32_OWN_PROCESS\n        STATE              : 1  STOPPED\n";
    const STOP_PENDING: &str = "\nSERVICE_NAME: DiagTrack\n        STATE              : 3  STOP_PENDING\n";
    const MISSING: &str = "[SC] EnumQueryServicesStatus:OpenService FAILED 1060:\n\nThe specified service does not exist as an installed service.\n";

    fn control(runner: &ScriptedRunner) -> ScServiceControl<&ScriptedRunner> {
        ScServiceControl::new(runner, Duration::from_secs(5), Duration::ZERO)
    }

    #[test]
    fn parses_state_codes() {
        assert_eq!(parse_state(RUNNING), Some(4));
        assert_eq!(parse_state(STOPPED), Some(1));
        assert_eq!(parse_state("garbage"), None);
    }

    #[test]
    fn exists_is_false_for_error_1060() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(1060, MISSING, ""));
        assert!(!control(&runner).exists("Cortana").unwrap());
        assert_eq!(runner.invocations(), vec!["sc.exe query Cortana"]);
    }

    #[test]
    fn stop_waits_for_stopped_state() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(STOP_PENDING));
        runner.push(CommandOutput::ok(STOPPED));
        let sc = ScServiceControl::new(&runner, Duration::from_secs(5), Duration::from_secs(5));
        sc.stop("DiagTrack").expect("stop succeeds");
        assert_eq!(
            runner.invocations(),
            vec!["sc.exe stop DiagTrack", "sc.exe query DiagTrack"]
        );
    }

    #[test]
    fn stop_still_pending_after_wait_is_transient() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(STOP_PENDING));
        runner.push(CommandOutput::ok(STOP_PENDING));
        let err = control(&runner).stop("DiagTrack").expect_err("still pending");
        assert!(err.is_transient());
    }

    #[test]
    fn stop_of_stopped_service_succeeds() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(
            1062,
            "[SC] ControlService FAILED 1062:\n\nThe service has not been started.\n",
            "",
        ));
        control(&runner).stop("DiagTrack").expect("idempotent stop");
    }

    #[test]
    fn stop_of_missing_service_is_not_found() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(1060, MISSING, ""));
        let err = control(&runner).stop("Cortana").expect_err("absent");
        assert!(err.is_absent());
    }

    #[test]
    fn disable_passes_split_start_argument() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok("[SC] ChangeServiceConfig SUCCESS\n"));
        control(&runner).disable("DiagTrack").expect("disable");
        assert_eq!(
            runner.invocations(),
            vec!["sc.exe config DiagTrack start= disabled"]
        );
    }

    #[test]
    fn access_denied_and_busy_are_classified() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(5, "[SC] OpenService FAILED 5:\n\nAccess is denied.\n", ""));
        runner.push(CommandOutput::failed(1061, "[SC] ControlService FAILED 1061:\n", ""));
        let sc = control(&runner);
        assert!(matches!(sc.disable("DiagTrack"), Err(SysError::AccessDenied(_))));
        assert!(sc.stop("DiagTrack").expect_err("busy").is_transient());
    }
}
