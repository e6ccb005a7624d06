//! JSON shape of results as consumed by `hush --format json`.

use hush_core::{Feature, Outcome, Phase, ReconciliationResult, VerificationSnapshot};
use pretty_assertions::assert_eq;

#[test]
fn voice_assistant_result_carries_snapshots() {
    let before = VerificationSnapshot {
        services_stopped: true,
        processes_absent: false,
        registry_disabled: false,
    };
    let after = VerificationSnapshot {
        services_stopped: true,
        processes_absent: true,
        registry_disabled: true,
    };
    let result = ReconciliationResult::from_phases(
        Feature::VoiceAssistant,
        [(Phase::Registry, true), (Phase::Service, true), (Phase::Tasks, true)]
            .into_iter()
            .collect(),
    )
    .with_verification(before, after)
    .with_summary("Cortana disabled and verified.");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["outcome"], "success");
    assert_eq!(json["before"]["processes_absent"], false);
    assert_eq!(json["after"]["registry_disabled"], true);

    let recovered: ReconciliationResult = serde_json::from_value(json).unwrap();
    assert_eq!(recovered, result);
    assert_eq!(recovered.outcome, Outcome::Success);
}

#[test]
fn older_results_without_optional_fields_deserialize() {
    let json = r#"{"feature":"ai_overlay","elevated":true,"phases":{"Registry":true},"outcome":"success","summary":"ok"}"#;
    let result: ReconciliationResult = serde_json::from_str(json).unwrap();
    assert!(result.is_success());
    assert!(result.notes.is_empty());
    assert_eq!(result.phase(Phase::Registry), Some(true));
}
