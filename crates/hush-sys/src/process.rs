//! Process inspection and control through `tasklist.exe` / `taskkill.exe`.

use std::time::Duration;

use crate::command::CommandRunner;
use crate::error::SysError;
use crate::ports::ProcessPort;

const TASKLIST: &str = "tasklist.exe";
const TASKKILL: &str = "taskkill.exe";

/// `taskkill` exit code when no process matched the filter.
const NO_MATCHING_PROCESS: i32 = 128;

pub struct TasklistProcesses<R> {
    runner: R,
    timeout: Duration,
}

impl<R: CommandRunner> TasklistProcesses<R> {
    pub const fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl<R: CommandRunner> ProcessPort for TasklistProcesses<R> {
    fn is_running(&self, image: &str) -> Result<bool, SysError> {
        let filter = format!("IMAGENAME eq {image}");
        let out = self
            .runner
            .run(TASKLIST, &["/FI", &filter, "/NH", "/FO", "CSV"], self.timeout)?
            .into_result(TASKLIST)?;
        Ok(csv_lists_image(&out.stdout, image))
    }

    fn terminate(&self, image: &str) -> Result<(), SysError> {
        let out = self
            .runner
            .run(TASKKILL, &["/F", "/IM", image], self.timeout)?;
        if out.code == Some(NO_MATCHING_PROCESS) {
            tracing::debug!(image, "no running process to terminate");
            return Ok(());
        }
        out.into_result(TASKKILL).map(drop)
    }

    fn launch(&self, image: &str) -> Result<(), SysError> {
        self.runner.spawn_detached(image, &[])
    }
}

/// `tasklist /FO CSV /NH` prints one `"image","pid",...` row per match, or
/// an `INFO:` line when nothing matched.
fn csv_lists_image(stdout: &str, image: &str) -> bool {
    stdout.lines().any(|line| {
        line.trim()
            .strip_prefix('"')
            .and_then(|rest| rest.split('"').next())
            .is_some_and(|name| name.eq_ignore_ascii_case(image))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::fake::ScriptedRunner;

    fn processes(runner: &ScriptedRunner) -> TasklistProcesses<&ScriptedRunner> {
        TasklistProcesses::new(runner, Duration::from_secs(5))
    }

    #[test]
    fn detects_running_image_case_insensitively() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(
            "\"Cortana.exe\",\"8812\",\"Console\",\"1\",\"61,204 K\"\n",
        ));
        assert!(processes(&runner).is_running("cortana.exe").unwrap());
    }

    #[test]
    fn info_line_means_not_running() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(
            "INFO: No tasks are running which match the specified criteria.\n",
        ));
        assert!(!processes(&runner).is_running("Cortana.exe").unwrap());
    }

    #[test]
    fn terminate_tolerates_no_match() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(
            128,
            "",
            "ERROR: The process \"explorer.exe\" not found.\n",
        ));
        processes(&runner).terminate("explorer.exe").expect("nothing to kill");
    }

    #[test]
    fn terminate_reports_other_failures() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(1, "", "ERROR: Access is denied.\n"));
        assert!(processes(&runner).terminate("explorer.exe").is_err());
    }

    #[test]
    fn launch_spawns_detached() {
        let runner = ScriptedRunner::new();
        processes(&runner).launch("explorer.exe").expect("spawned");
        assert_eq!(runner.invocations(), vec!["spawn explorer.exe"]);
    }
}
