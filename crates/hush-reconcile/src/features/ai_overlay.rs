//! Windows Copilot: one per-user policy value.

use hush_core::{
    ChangeSet, CoreError, FailurePolicy, Feature, Hive, ReconciliationResult, RegValue,
};

use crate::engine::{FeaturePlan, Messages, Reconciler};

pub const POLICY_PATH: &str = r"Software\Policies\Microsoft\Windows\WindowsCopilot";
pub const VALUE_NAME: &str = "DisableCopilot";

pub const MESSAGES: Messages = Messages {
    success: "Successfully disabled Copilot.",
    failure: "Failed to disable Copilot.",
    unverified: "Copilot policy was written but could not be verified.",
};

/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn plan() -> Result<FeaturePlan, CoreError> {
    let policy = ChangeSet::new(
        Hive::CurrentUser,
        POLICY_PATH,
        [(VALUE_NAME, RegValue::Dword(1))],
    )?;
    Ok(FeaturePlan::new(Feature::AiOverlay, MESSAGES)
        .with_registry(vec![policy], FailurePolicy::AbortRemaining))
}

/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn disable(reconciler: &Reconciler<'_>) -> Result<ReconciliationResult, CoreError> {
    Ok(reconciler.disable_all(&plan()?))
}
