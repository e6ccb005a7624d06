//! Elevation check via the process token's mandatory integrity label.

use std::time::Duration;

use crate::command::CommandRunner;
use crate::ports::ElevationGuard;

/// High and System mandatory levels; an elevated administrator token carries
/// one of them.
const ELEVATED_LABELS: [&str; 2] = ["S-1-16-12288", "S-1-16-16384"];

pub struct WhoamiElevation<R> {
    runner: R,
    timeout: Duration,
}

impl<R: CommandRunner> WhoamiElevation<R> {
    pub const fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl<R: CommandRunner> ElevationGuard for WhoamiElevation<R> {
    fn is_elevated(&self) -> bool {
        match self.runner.run("whoami.exe", &["/groups"], self.timeout) {
            Ok(out) if out.success() => ELEVATED_LABELS
                .iter()
                .any(|label| out.stdout.contains(label)),
            Ok(out) => {
                tracing::debug!(detail = %out.diagnostic(), "whoami failed; assuming not elevated");
                false
            }
            Err(error) => {
                tracing::debug!(%error, "elevation query failed; assuming not elevated");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::error::SysError;
    use crate::fake::ScriptedRunner;
    use rstest::rstest;

    const HIGH: &str = "Mandatory Label\\High Mandatory Level   Label   S-1-16-12288\n";
    const MEDIUM: &str = "Mandatory Label\\Medium Mandatory Level Label   S-1-16-8192\n";
    const SYSTEM: &str = "Mandatory Label\\System Mandatory Level Label   S-1-16-16384\n";

    #[rstest]
    #[case(HIGH, true)]
    #[case(SYSTEM, true)]
    #[case(MEDIUM, false)]
    fn reads_mandatory_label(#[case] stdout: &str, #[case] expected: bool) {
        let runner = ScriptedRunner::new();
        runner.push(CommandOutput::ok(stdout));
        let guard = WhoamiElevation::new(&runner, Duration::from_secs(5));
        assert_eq!(guard.is_elevated(), expected);
    }

    #[test]
    fn fails_closed_on_error() {
        let runner = ScriptedRunner::new();
        runner.push_error(SysError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "whoami.exe missing",
        )));
        runner.push(CommandOutput::failed(1, HIGH, "ERROR"));
        let guard = WhoamiElevation::new(&runner, Duration::from_secs(5));
        assert!(!guard.is_elevated());
        assert!(!guard.is_elevated());
    }
}
