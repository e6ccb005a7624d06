//! Maps a selected action onto its reconciler entry point.

use hush_core::{CoreError, Feature, ReconciliationResult};

use crate::engine::Reconciler;
use crate::features::{ai_overlay, context_menu, integrity, telemetry, voice_assistant};

/// One feature selection per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Telemetry,
    VoiceAssistant,
    ContextMenu { restart_shell: bool },
    AiOverlay,
    Integrity,
}

impl Action {
    #[must_use]
    pub const fn feature(self) -> Feature {
        match self {
            Self::Telemetry => Feature::Telemetry,
            Self::VoiceAssistant => Feature::VoiceAssistant,
            Self::ContextMenu { .. } => Feature::ContextMenu,
            Self::AiOverlay => Feature::AiOverlay,
            Self::Integrity => Feature::Integrity,
        }
    }
}

/// # Errors
///
/// Only if a built-in plan fails validation; adapter failures are part of
/// the returned result.
pub fn run(action: Action, reconciler: &Reconciler<'_>) -> Result<ReconciliationResult, CoreError> {
    tracing::info!(feature = %action.feature(), "starting");
    match action {
        Action::Telemetry => telemetry::disable_all(reconciler),
        Action::VoiceAssistant => voice_assistant::disable_all(reconciler),
        Action::ContextMenu { restart_shell } => context_menu::reconcile(reconciler, restart_shell),
        Action::AiOverlay => ai_overlay::disable(reconciler),
        Action::Integrity => Ok(integrity::run_checks(reconciler)),
    }
}
