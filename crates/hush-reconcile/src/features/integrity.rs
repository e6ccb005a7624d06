//! System file and component store repair (`sfc` then `DISM`).
//!
//! Both tools always run; each reports its own phase.

use std::collections::BTreeMap;

use hush_core::{AuditKind, Feature, Phase, ReconciliationResult};
use hush_sys::SysError;
use tracing::{debug, info};

use crate::engine::{Messages, Reconciler, conclude};

pub const MESSAGES: Messages = Messages {
    success: "System integrity check completed successfully.",
    failure: "System integrity check encountered issues.",
    unverified: "System integrity check finished without confirmation.",
};

pub fn run_checks(reconciler: &Reconciler<'_>) -> ReconciliationResult {
    let feature = Feature::Integrity;
    if let Err(denied) = reconciler.guard(feature, &[Phase::Sfc, Phase::Dism]) {
        return denied;
    }

    let maintenance = reconciler.ports().maintenance;
    let mut notes = Vec::new();

    info!("running System File Checker");
    let sfc = settle(reconciler, "sfc", maintenance.scan_system_files(), &mut notes);
    info!("running DISM component store repair");
    let dism = settle(reconciler, "dism", maintenance.repair_component_store(), &mut notes);

    let mut result = ReconciliationResult::from_phases(
        feature,
        BTreeMap::from([(Phase::Sfc, sfc), (Phase::Dism, dism)]),
    );
    result.notes = notes;
    conclude(result, &MESSAGES)
}

fn settle(
    reconciler: &Reconciler<'_>,
    tool: &str,
    outcome: Result<String, SysError>,
    notes: &mut Vec<String>,
) -> bool {
    match outcome {
        Ok(output) => {
            debug!(tool, %output, "tool output");
            info!(tool, "completed successfully");
            reconciler.audit(Feature::Integrity, AuditKind::Command, tool, "run", true, None);
            true
        }
        Err(error) => {
            reconciler.fail(Feature::Integrity, AuditKind::Command, tool, "run", &error, notes);
            false
        }
    }
}
