//! Console rendering and exit codes.

use std::fmt::Write as _;

use hush_core::{Outcome, ReconciliationResult};

use crate::cli::OutputFormat;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_UNVERIFIED: i32 = 3;

/// Render a result in the requested format.
///
/// # Errors
///
/// Only if JSON serialization fails.
pub fn render(result: &ReconciliationResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(render_text(result)),
    }
}

/// Print a result to stdout in the requested format.
///
/// # Errors
///
/// Only if JSON serialization fails.
pub fn output(result: &ReconciliationResult, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(result, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_text(result: &ReconciliationResult) -> String {
    let mut text = format!("{}: {}", result.feature.label(), result.summary);
    if result.elevated {
        for (phase, ok) in &result.phases {
            let verdict = if *ok { "ok" } else { "FAILED" };
            let _ = write!(text, "\n  {:<10}{verdict}", phase.as_str());
        }
    }
    for note in &result.notes {
        let _ = write!(text, "\n  note: {note}");
    }
    text
}

#[must_use]
pub fn exit_code(result: &ReconciliationResult) -> i32 {
    match result.outcome {
        Outcome::Success if result.is_success() => EXIT_SUCCESS,
        Outcome::AppliedUnverified => EXIT_UNVERIFIED,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hush_core::{Feature, Phase, VerificationSnapshot};
    use pretty_assertions::assert_eq;

    use super::*;

    fn telemetry(service_ok: bool) -> ReconciliationResult {
        ReconciliationResult::from_phases(
            Feature::Telemetry,
            BTreeMap::from([
                (Phase::Registry, true),
                (Phase::Service, service_ok),
                (Phase::Tasks, true),
            ]),
        )
    }

    #[test]
    fn text_lists_each_phase() {
        let mut result = telemetry(false).with_summary("Some operations failed.");
        result.notes.push("stop DiagTrack: access denied: DiagTrack".into());

        assert_eq!(
            render_text(&result),
            "Telemetry: Some operations failed.\n  \
             Registry  ok\n  \
             Service   FAILED\n  \
             Tasks     ok\n  \
             note: stop DiagTrack: access denied: DiagTrack"
        );
    }

    #[test]
    fn denied_text_omits_phase_lines() {
        let result = ReconciliationResult::denied(
            Feature::AiOverlay,
            &[Phase::Registry],
            "This operation requires administrator privileges.",
        );
        assert_eq!(
            render_text(&result),
            "Copilot: This operation requires administrator privileges."
        );
    }

    #[test]
    fn json_is_the_serialized_result() {
        let rendered = render(&telemetry(true), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["phases"]["Service"], true);
    }

    #[test]
    fn exit_codes_follow_outcome() {
        assert_eq!(exit_code(&telemetry(true)), EXIT_SUCCESS);
        assert_eq!(exit_code(&telemetry(false)), EXIT_FAILURE);

        let denied = ReconciliationResult::denied(Feature::Telemetry, &[Phase::Registry], "");
        assert_eq!(exit_code(&denied), EXIT_FAILURE);

        let running = VerificationSnapshot {
            services_stopped: true,
            processes_absent: false,
            registry_disabled: true,
        };
        let unverified = ReconciliationResult::from_phases(
            Feature::VoiceAssistant,
            BTreeMap::from([(Phase::Registry, true)]),
        )
        .with_verification(running, running);
        assert_eq!(exit_code(&unverified), EXIT_UNVERIFIED);
    }
}
