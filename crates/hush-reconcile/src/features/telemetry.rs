//! Diagnostic data collection: policy values, the `DiagTrack` service and
//! the compatibility and CEIP scheduled tasks.

use hush_core::{
    ChangeSet, CoreError, FailurePolicy, Feature, Hive, ReconciliationResult, RegValue,
    ServiceTarget, TaskTarget,
};

use crate::engine::{FeaturePlan, Messages, Reconciler};

pub const REGISTRY_PATHS: [&str; 3] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Diagnostics\DiagTrack",
    r"SOFTWARE\Policies\Microsoft\Windows\DataCollection",
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies\DataCollection",
];

pub const SERVICE: &str = "DiagTrack";

pub const TASKS: [&str; 5] = [
    r"Microsoft\Windows\Application Experience\Microsoft Compatibility Appraiser",
    r"Microsoft\Windows\Application Experience\ProgramDataUpdater",
    r"Microsoft\Windows\Customer Experience Improvement Program\Consolidator",
    r"Microsoft\Windows\Customer Experience Improvement Program\UsbCeip",
    r"Microsoft\Windows\Customer Experience Improvement Program\KernelCeipTask",
];

pub const MESSAGES: Messages = Messages {
    success: "Successfully disabled all telemetry features!",
    failure: "Some operations failed. Check the error messages above.",
    unverified: "Telemetry changes were applied but could not be verified.",
};

fn values() -> [(&'static str, RegValue); 4] {
    [
        ("DiagTrackAuthorization", RegValue::Dword(1)),
        ("AllowTelemetry", RegValue::Dword(0)),
        ("AllowDeviceNameInTelemetry", RegValue::Dword(0)),
        ("MaxTelemetryAllowed", RegValue::Dword(0)),
    ]
}

/// Registry and task phases abort at the first failure; the service phase
/// always attempts both stop and disable.
///
/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn plan() -> Result<FeaturePlan, CoreError> {
    let registry = ChangeSet::for_paths(Hive::LocalMachine, &REGISTRY_PATHS, &values())?;
    let tasks = TASKS
        .iter()
        .map(|path| TaskTarget::new(*path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeaturePlan::new(Feature::Telemetry, MESSAGES)
        .with_registry(registry, FailurePolicy::AbortRemaining)
        .with_services(vec![ServiceTarget::stop_and_disable(SERVICE)], false)
        .with_tasks(tasks, FailurePolicy::AbortRemaining))
}

/// # Errors
///
/// Only if the built-in targets fail validation.
pub fn disable_all(reconciler: &Reconciler<'_>) -> Result<ReconciliationResult, CoreError> {
    Ok(reconciler.disable_all(&plan()?))
}

#[cfg(test)]
mod tests {
    use hush_core::Phase;

    use super::*;

    #[test]
    fn plan_covers_all_three_phases() {
        let plan = plan().unwrap();
        assert_eq!(plan.phases(), vec![Phase::Registry, Phase::Service, Phase::Tasks]);
        assert_eq!(plan.registry.len(), 3);
        assert_eq!(plan.tasks.len(), 5);
        assert!(plan.registry.iter().all(|set| set.values().len() == 4));
        assert!(plan.post_condition.is_none());
    }
}
