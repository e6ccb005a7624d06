//! Feature, phase, policy and outcome enums.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// An operating-system feature hush knows how to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Telemetry,
    VoiceAssistant,
    ContextMenu,
    AiOverlay,
    Integrity,
}

impl Feature {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::VoiceAssistant => "voice_assistant",
            Self::ContextMenu => "context_menu",
            Self::AiOverlay => "ai_overlay",
            Self::Integrity => "integrity",
        }
    }

    /// Human-facing name used in console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Telemetry => "Telemetry",
            Self::VoiceAssistant => "Cortana",
            Self::ContextMenu => "Classic context menu",
            Self::AiOverlay => "Copilot",
            Self::Integrity => "System integrity check",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// A sub-operation category within one reconciliation run.
///
/// Variant names double as the keys of the result mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Registry,
    Service,
    Tasks,
    Sfc,
    Dism,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registry => "Registry",
            Self::Service => "Service",
            Self::Tasks => "Tasks",
            Self::Sfc => "Sfc",
            Self::Dism => "Dism",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What an ordered phase does after one of its steps fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Later steps depend on earlier ones: stop at the first failure.
    AbortRemaining,
    /// Steps are independent: attempt all, record partial success.
    ContinueIndependent,
}

impl FailurePolicy {
    #[must_use]
    pub const fn aborts(self) -> bool {
        matches!(self, Self::AbortRemaining)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Overall classification of a reconciliation run.
///
/// ```text
/// all phases ok, verification agrees (or absent) → success
/// any phase failed                                → failed
/// all phases ok, verification disagrees           → applied_unverified
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
    AppliedUnverified,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::AppliedUnverified => "applied_unverified",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_as_result_key() {
        let json = serde_json::to_string(&Phase::Tasks).unwrap();
        assert_eq!(json, "\"Tasks\"");
    }

    #[test]
    fn phases_order_registry_service_tasks() {
        let mut phases = vec![Phase::Tasks, Phase::Registry, Phase::Service];
        phases.sort();
        assert_eq!(phases, vec![Phase::Registry, Phase::Service, Phase::Tasks]);
    }

    #[test]
    fn feature_roundtrip() {
        for feature in [
            Feature::Telemetry,
            Feature::VoiceAssistant,
            Feature::ContextMenu,
            Feature::AiOverlay,
            Feature::Integrity,
        ] {
            let json = serde_json::to_string(&feature).unwrap();
            assert_eq!(json, format!("\"{}\"", feature.as_str()));
            let recovered: Feature = serde_json::from_str(&json).unwrap();
            assert_eq!(recovered, feature);
        }
    }
}
