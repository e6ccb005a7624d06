//! Per-run reconciliation results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{Feature, Outcome, Phase};

/// Observed state of a feature, captured before and after mutation.
///
/// Never used to gate retries; only to classify the reported outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSnapshot {
    pub services_stopped: bool,
    pub processes_absent: bool,
    pub registry_disabled: bool,
}

impl VerificationSnapshot {
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.services_stopped && self.processes_absent && self.registry_disabled
    }
}

/// Outcome of one top-level reconciliation routine.
///
/// Created fresh per invocation and consumed by the dispatcher for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub feature: Feature,
    pub elevated: bool,
    pub phases: BTreeMap<Phase, bool>,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<VerificationSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<VerificationSnapshot>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ReconciliationResult {
    /// Result for a run refused by the elevation guard: every phase false.
    #[must_use]
    pub fn denied(feature: Feature, phases: &[Phase], summary: impl Into<String>) -> Self {
        Self {
            feature,
            elevated: false,
            phases: phases.iter().map(|phase| (*phase, false)).collect(),
            outcome: Outcome::Failed,
            before: None,
            after: None,
            summary: summary.into(),
            notes: Vec::new(),
        }
    }

    /// Result for a completed run; the outcome follows the phase verdicts.
    #[must_use]
    pub fn from_phases(feature: Feature, phases: BTreeMap<Phase, bool>) -> Self {
        let outcome = if phases.values().all(|ok| *ok) {
            Outcome::Success
        } else {
            Outcome::Failed
        };
        Self {
            feature,
            elevated: true,
            phases,
            outcome,
            before: None,
            after: None,
            summary: String::new(),
            notes: Vec::new(),
        }
    }

    /// Attach verification snapshots and reclassify the outcome.
    ///
    /// A run whose phases all succeeded but whose post-mutation snapshot does
    /// not read as disabled becomes [`Outcome::AppliedUnverified`].
    #[must_use]
    pub fn with_verification(
        mut self,
        before: VerificationSnapshot,
        after: VerificationSnapshot,
    ) -> Self {
        self.before = Some(before);
        self.after = Some(after);
        if self.is_success() && !after.is_disabled() {
            self.outcome = Outcome::AppliedUnverified;
        }
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Aggregate result: logical AND of all phase outcomes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.elevated && self.phases.values().all(|ok| *ok)
    }

    #[must_use]
    pub fn phase(&self, phase: Phase) -> Option<bool> {
        self.phases.get(&phase).copied()
    }

    #[must_use]
    pub fn failed_phases(&self) -> Vec<Phase> {
        self.phases
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(phase, _)| *phase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn phases(entries: &[(Phase, bool)]) -> BTreeMap<Phase, bool> {
        entries.iter().copied().collect()
    }

    const DISABLED: VerificationSnapshot = VerificationSnapshot {
        services_stopped: true,
        processes_absent: true,
        registry_disabled: true,
    };

    #[test]
    fn aggregate_is_logical_and() {
        let result = ReconciliationResult::from_phases(
            Feature::Telemetry,
            phases(&[(Phase::Registry, true), (Phase::Service, false), (Phase::Tasks, true)]),
        );
        assert!(!result.is_success());
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.failed_phases(), vec![Phase::Service]);
    }

    #[test]
    fn denied_marks_every_phase_false() {
        let result = ReconciliationResult::denied(
            Feature::Telemetry,
            &[Phase::Registry, Phase::Service, Phase::Tasks],
            "requires elevation",
        );
        assert!(!result.is_success());
        assert!(!result.elevated);
        assert_eq!(result.failed_phases().len(), 3);
    }

    #[test]
    fn verification_mismatch_is_its_own_outcome() {
        let stale = VerificationSnapshot {
            processes_absent: false,
            ..DISABLED
        };
        let result = ReconciliationResult::from_phases(
            Feature::VoiceAssistant,
            phases(&[(Phase::Registry, true), (Phase::Tasks, true)]),
        )
        .with_verification(stale, stale);

        assert!(result.is_success());
        assert_eq!(result.outcome, Outcome::AppliedUnverified);
    }

    #[test]
    fn verification_does_not_upgrade_failures() {
        let result = ReconciliationResult::from_phases(
            Feature::VoiceAssistant,
            phases(&[(Phase::Registry, false)]),
        )
        .with_verification(DISABLED, DISABLED);
        assert_eq!(result.outcome, Outcome::Failed);
    }

    #[test]
    fn serializes_phase_mapping_by_name() {
        let result = ReconciliationResult::from_phases(
            Feature::Telemetry,
            phases(&[(Phase::Registry, true), (Phase::Service, true), (Phase::Tasks, true)]),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json["phases"],
            serde_json::json!({"Registry": true, "Service": true, "Tasks": true})
        );
        assert!(json.get("before").is_none());
    }
}
