//! System File Checker and DISM.

use std::time::Duration;

use crate::command::CommandRunner;
use crate::error::SysError;
use crate::ports::MaintenancePort;

const SFC: &str = "sfc.exe";
const DISM: &str = "DISM.exe";

pub struct WindowsMaintenance<R> {
    runner: R,
    timeout: Duration,
}

impl<R: CommandRunner> WindowsMaintenance<R> {
    pub const fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl<R: CommandRunner> MaintenancePort for WindowsMaintenance<R> {
    fn scan_system_files(&self) -> Result<String, SysError> {
        let out = self.runner.run(SFC, &["/scannow"], self.timeout)?;
        Ok(out.into_result(SFC)?.stdout)
    }

    fn repair_component_store(&self) -> Result<String, SysError> {
        let out = self.runner.run(
            DISM,
            &["/Online", "/Cleanup-Image", "/RestoreHealth"],
            self.timeout,
        )?;
        Ok(out.into_result(DISM)?.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::fake::ScriptedRunner;

    #[test]
    fn runs_both_tools_with_expected_arguments() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok("Windows Resource Protection did not find any integrity violations.\n"));
        runner.push(CommandOutput::ok("The restore operation completed successfully.\n"));
        let tools = WindowsMaintenance::new(&runner, Duration::from_secs(60));

        let sfc = tools.scan_system_files().expect("sfc ok");
        assert!(sfc.contains("integrity violations"));
        tools.repair_component_store().expect("dism ok");

        assert_eq!(
            runner.invocations(),
            vec![
                "sfc.exe /scannow",
                "DISM.exe /Online /Cleanup-Image /RestoreHealth"
            ]
        );
    }

    #[test]
    fn nonzero_exit_is_command_failed() {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::failed(
            87,
            "Error: 87\n\nThe cleanup-image option is unknown.\n",
            "",
        ));
        let tools = WindowsMaintenance::new(&runner, Duration::from_secs(60));
        assert!(matches!(
            tools.repair_component_store(),
            Err(SysError::CommandFailed { code: 87, .. })
        ));
    }
}
