//! Cortana personal-assistant features.
//!
//! Only the assistant is targeted; core Windows Search stays intact. The
//! plan carries a post-condition, so a run that applies every change while
//! Cortana keeps running reports `applied_unverified` instead of success.

use hush_core::{
    ChangeSet, CoreError, FailurePolicy, Feature, Hive, ReconciliationResult, RegValue,
    ServiceTarget, TaskTarget,
};

use crate::engine::{FeaturePlan, Messages, PostCondition, Reconciler};

pub const REGISTRY_PATHS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\SearchSettings",
    r"SOFTWARE\Policies\Microsoft\Windows\Windows Search",
];

pub const SERVICE: &str = "Cortana";
pub const PROCESS: &str = "Cortana.exe";
pub const TASK: &str = r"Microsoft\Windows\Windows Search\CortanaConsent";

pub const MESSAGES: Messages = Messages {
    success: "Successfully disabled Cortana personal assistant features! \
              Core Windows Search functionality remains active.",
    failure: "Some operations failed. Check the error messages above.",
    unverified: "Changes were applied but verification failed: Cortana still appears active. \
                 Sign out or restart to finish.",
};

fn values() -> [(&'static str, RegValue); 3] {
    [
        ("CortanaConsent", RegValue::Dword(0)),
        ("CortanaEnabled", RegValue::Dword(0)),
        ("AllowCortana", RegValue::Dword(0)),
    ]
}

/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn plan() -> Result<FeaturePlan, CoreError> {
    let registry = ChangeSet::for_paths(Hive::LocalMachine, &REGISTRY_PATHS, &values())?;
    let post = PostCondition {
        services_stopped: vec![SERVICE.to_string()],
        processes_absent: vec![PROCESS.to_string()],
        registry_expect: registry.clone(),
    };

    Ok(FeaturePlan::new(Feature::VoiceAssistant, MESSAGES)
        .with_registry(registry, FailurePolicy::AbortRemaining)
        .with_services(vec![ServiceTarget::stop_and_disable(SERVICE)], true)
        .with_tasks(vec![TaskTarget::new(TASK)?], FailurePolicy::AbortRemaining)
        .with_post_condition(post))
}

/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn disable_all(reconciler: &Reconciler<'_>) -> Result<ReconciliationResult, CoreError> {
    Ok(reconciler.disable_all(&plan()?))
}
