//! Classic (Windows 10 style) context menu.
//!
//! Toggle-style: the legacy menu is active when an empty `InprocServer32`
//! key exists under the per-user CLSID override. The optional shell
//! restart makes the change visible immediately; its failure is reported
//! but never invalidates the registry change.

use std::collections::BTreeMap;

use hush_core::{
    AuditKind, ChangeSet, CoreError, Feature, Hive, Phase, ReconciliationResult, RegValue,
};
use tracing::{info, warn};

use crate::engine::{Messages, Reconciler, conclude};

pub const KEY_PATH: &str =
    r"Software\Classes\CLSID\{86ca1aa0-34aa-4e8b-a509-50c905bae2a2}\InprocServer32";
pub const SHELL_IMAGE: &str = "explorer.exe";

pub const ALREADY_ACTIVE: &str = "Classic context menu is already active.";

pub const MESSAGES: Messages = Messages {
    success: "Classic context menu activated.",
    failure: "Failed to activate the classic context menu.",
    unverified: "Classic context menu key was written but could not be verified.",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Activated,
    AlreadyActive,
    /// Refused by the elevation guard; nothing was read or written.
    Denied,
    /// The key write failed; carries the diagnostics.
    Failed(Vec<String>),
}

fn change_set() -> Result<ChangeSet, CoreError> {
    ChangeSet::new(Hive::CurrentUser, KEY_PATH, [("", RegValue::String(String::new()))])
}

/// Whether the override key exists. A failed lookup reads as inactive.
#[must_use]
pub fn check_active(reconciler: &Reconciler<'_>) -> bool {
    match reconciler.ports().registry.key_exists(Hive::CurrentUser, KEY_PATH) {
        Ok(exists) => exists,
        Err(error) => {
            warn!(path = KEY_PATH, %error, "could not read context menu key");
            false
        }
    }
}

/// Create the override key with an empty default value, unless it is
/// already present. Requires elevation.
///
/// # Errors
///
/// Only if the built-in key fails validation.
pub fn activate(reconciler: &Reconciler<'_>) -> Result<Activation, CoreError> {
    if reconciler.guard(Feature::ContextMenu, &[Phase::Registry]).is_err() {
        return Ok(Activation::Denied);
    }
    apply(reconciler)
}

fn apply(reconciler: &Reconciler<'_>) -> Result<Activation, CoreError> {
    let change_set = change_set()?;
    if check_active(reconciler) {
        info!(path = KEY_PATH, "{ALREADY_ACTIVE}");
        return Ok(Activation::AlreadyActive);
    }

    let mut notes = Vec::new();
    if reconciler.apply_change_set(Feature::ContextMenu, &change_set, &mut notes) {
        Ok(Activation::Activated)
    } else {
        Ok(Activation::Failed(notes))
    }
}

/// Guarded entry point: activate, then optionally restart the shell.
///
/// # Errors
///
/// Only if the built-in key fails validation.
pub fn reconcile(
    reconciler: &Reconciler<'_>,
    restart_shell: bool,
) -> Result<ReconciliationResult, CoreError> {
    if let Err(denied) = reconciler.guard(Feature::ContextMenu, &[Phase::Registry]) {
        return Ok(denied);
    }

    let activation = apply(reconciler)?;
    let (ok, mut notes) = match &activation {
        Activation::Failed(notes) => (false, notes.clone()),
        Activation::Denied => (false, Vec::new()),
        Activation::Activated | Activation::AlreadyActive => (true, Vec::new()),
    };
    if restart_shell && activation == Activation::Activated {
        restart(reconciler, &mut notes);
    }

    let mut result = ReconciliationResult::from_phases(
        Feature::ContextMenu,
        BTreeMap::from([(Phase::Registry, ok)]),
    );
    result.notes = notes;
    let result = conclude(result, &MESSAGES);
    Ok(match activation {
        Activation::AlreadyActive => result.with_summary(ALREADY_ACTIVE),
        _ => result,
    })
}

/// Stop then start the shell. No rollback: a failure becomes a note.
fn restart(reconciler: &Reconciler<'_>, notes: &mut Vec<String>) {
    let processes = reconciler.ports().processes;
    let feature = Feature::ContextMenu;

    if let Err(error) = processes.terminate(SHELL_IMAGE) {
        warn!(image = SHELL_IMAGE, %error, "could not stop the shell; restart it manually");
        let detail = error.to_string();
        let kind = AuditKind::Process;
        reconciler.audit(feature, kind, SHELL_IMAGE, "terminate", false, Some(&detail));
        notes.push(format!("shell restart skipped: {error}"));
        return;
    }
    reconciler.audit(feature, AuditKind::Process, SHELL_IMAGE, "terminate", true, None);

    match processes.launch(SHELL_IMAGE) {
        Ok(()) => {
            info!(image = SHELL_IMAGE, "shell restarted");
            reconciler.audit(feature, AuditKind::Process, SHELL_IMAGE, "launch", true, None);
        }
        Err(error) => {
            warn!(image = SHELL_IMAGE, %error, "could not start the shell; start it manually");
            let detail = error.to_string();
            let kind = AuditKind::Process;
            reconciler.audit(feature, kind, SHELL_IMAGE, "launch", false, Some(&detail));
            notes.push(format!("shell did not restart: {error}"));
        }
    }
}
