//! The generic reconciliation engine.
//!
//! A [`FeaturePlan`] lists what "disabled" means for one feature. The
//! [`Reconciler`] applies it in a fixed order:
//!
//! ```text
//! elevation check ─ no ──▶ all phases false, no adapter call
//!        │ yes
//!        ▼
//! snapshot (if post-condition) ─▶ registry ─▶ services ─▶ tasks
//!        ─▶ snapshot again ─▶ AND of phases, outcome, summary
//! ```
//!
//! Registry change-sets and tasks are ordered sequences governed by a
//! [`FailurePolicy`]; services are always attempted one by one. Absent
//! services and tasks count as already disabled.

use std::collections::BTreeMap;

use hush_core::{
    AuditKind, AuditRecord, ChangeSet, FailurePolicy, Feature, Outcome, Phase,
    ReconciliationResult, ServiceTarget, TaskTarget, VerificationSnapshot,
};
use hush_sys::SysError;
use tracing::{debug, error, info, warn};

use crate::ports::SystemPorts;
use crate::retry::RetryPolicy;

/// Summary for a run refused by the elevation guard.
pub const ELEVATION_REQUIRED: &str = "This operation requires administrator privileges.";

/// User-facing summaries, one per outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub success: &'static str,
    pub failure: &'static str,
    pub unverified: &'static str,
}

impl Messages {
    #[must_use]
    pub const fn for_outcome(&self, outcome: Outcome) -> &'static str {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Failed => self.failure,
            Outcome::AppliedUnverified => self.unverified,
        }
    }
}

/// Observable conditions that hold once a feature is disabled.
///
/// A service counts as stopped when it is not running or not installed. A
/// registry expectation holds when every value of the change-set reads back
/// equal. Any read failure counts as "not disabled".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCondition {
    pub services_stopped: Vec<String>,
    pub processes_absent: Vec<String>,
    pub registry_expect: Vec<ChangeSet>,
}

/// Declarative description of one feature's disabled state.
#[derive(Debug, Clone)]
pub struct FeaturePlan {
    pub feature: Feature,
    pub registry: Vec<ChangeSet>,
    pub registry_policy: FailurePolicy,
    pub services: Vec<ServiceTarget>,
    /// Check service existence before acting; absent services get no
    /// further calls.
    pub probe_services: bool,
    pub tasks: Vec<TaskTarget>,
    pub task_policy: FailurePolicy,
    pub post_condition: Option<PostCondition>,
    pub messages: Messages,
}

impl FeaturePlan {
    /// An empty plan. Both ordered phases default to aborting on the first
    /// failure.
    #[must_use]
    pub const fn new(feature: Feature, messages: Messages) -> Self {
        Self {
            feature,
            registry: Vec::new(),
            registry_policy: FailurePolicy::AbortRemaining,
            services: Vec::new(),
            probe_services: false,
            tasks: Vec::new(),
            task_policy: FailurePolicy::AbortRemaining,
            post_condition: None,
            messages,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, change_sets: Vec<ChangeSet>, policy: FailurePolicy) -> Self {
        self.registry = change_sets;
        self.registry_policy = policy;
        self
    }

    #[must_use]
    pub fn with_services(mut self, services: Vec<ServiceTarget>, probe: bool) -> Self {
        self.services = services;
        self.probe_services = probe;
        self
    }

    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskTarget>, policy: FailurePolicy) -> Self {
        self.tasks = tasks;
        self.task_policy = policy;
        self
    }

    #[must_use]
    pub fn with_post_condition(mut self, post: PostCondition) -> Self {
        self.post_condition = Some(post);
        self
    }

    /// Phases this plan reports, in execution order.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        [
            (Phase::Registry, !self.registry.is_empty()),
            (Phase::Service, !self.services.is_empty()),
            (Phase::Tasks, !self.tasks.is_empty()),
        ]
        .into_iter()
        .filter_map(|(phase, configured)| configured.then_some(phase))
        .collect()
    }
}

/// Runs feature plans against one set of adapter ports.
#[derive(Debug)]
pub struct Reconciler<'a> {
    ports: SystemPorts<'a>,
    retry: RetryPolicy,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(ports: SystemPorts<'a>, retry: RetryPolicy) -> Self {
        Self { ports, retry }
    }

    #[must_use]
    pub const fn ports(&self) -> &SystemPorts<'a> {
        &self.ports
    }

    /// Apply `plan` and report per-phase verdicts. Never fails: adapter
    /// errors become `false` verdicts and result notes.
    pub fn disable_all(&self, plan: &FeaturePlan) -> ReconciliationResult {
        let feature = plan.feature;
        if let Err(denied) = self.guard(feature, &plan.phases()) {
            return denied;
        }
        let _span = tracing::info_span!("reconcile", feature = %feature).entered();

        let before = plan.post_condition.as_ref().map(|post| {
            let snapshot = self.snapshot(post);
            info!(?snapshot, "state before changes");
            snapshot
        });

        let mut notes = Vec::new();
        let mut verdicts = BTreeMap::new();
        if !plan.registry.is_empty() {
            verdicts.insert(Phase::Registry, self.registry_phase(plan, &mut notes));
        }
        if !plan.services.is_empty() {
            verdicts.insert(Phase::Service, self.service_phase(plan, &mut notes));
        }
        if !plan.tasks.is_empty() {
            verdicts.insert(Phase::Tasks, self.task_phase(plan, &mut notes));
        }

        let mut result = ReconciliationResult::from_phases(feature, verdicts);
        if let (Some(post), Some(before)) = (&plan.post_condition, before) {
            let after = self.snapshot(post);
            info!(?after, "state after changes");
            result = result.with_verification(before, after);
        }
        result.notes = notes;
        conclude(result, &plan.messages)
    }

    /// Refuse to proceed without elevation. The guard is the only port
    /// touched on the refusal path.
    pub(crate) fn guard(
        &self,
        feature: Feature,
        phases: &[Phase],
    ) -> Result<(), ReconciliationResult> {
        if self.ports.elevation.is_elevated() {
            return Ok(());
        }
        error!(feature = %feature, "{ELEVATION_REQUIRED}");
        Err(ReconciliationResult::denied(feature, phases, ELEVATION_REQUIRED))
    }

    /// Evaluate a post-condition against current state.
    #[must_use]
    pub fn snapshot(&self, post: &PostCondition) -> VerificationSnapshot {
        let services_stopped = post.services_stopped.iter().all(|name| {
            match self.ports.services.is_running(name) {
                Ok(running) => !running,
                Err(error) => error.is_absent(),
            }
        });
        let processes_absent = post
            .processes_absent
            .iter()
            .all(|image| matches!(self.ports.processes.is_running(image), Ok(false)));
        let registry_disabled = post.registry_expect.iter().all(|change_set| {
            change_set.values().iter().all(|(name, want)| {
                match self
                    .ports
                    .registry
                    .read_value(change_set.hive(), change_set.path(), name)
                {
                    Ok(Some(got)) => got == *want,
                    Ok(None) => false,
                    Err(error) => {
                        debug!(
                            path = change_set.path(),
                            name = name.as_str(),
                            %error,
                            "verification read failed"
                        );
                        false
                    }
                }
            })
        });

        VerificationSnapshot {
            services_stopped,
            processes_absent,
            registry_disabled,
        }
    }

    // -- registry ---------------------------------------------------------

    fn registry_phase(&self, plan: &FeaturePlan, notes: &mut Vec<String>) -> bool {
        let mut ok = true;
        for (index, change_set) in plan.registry.iter().enumerate() {
            if self.apply_change_set(plan.feature, change_set, notes) {
                continue;
            }
            ok = false;
            if plan.registry_policy.aborts() {
                let skipped = plan.registry.len() - index - 1;
                if skipped > 0 {
                    warn!(skipped, "aborting remaining registry change-sets");
                }
                break;
            }
        }
        ok
    }

    /// Ensure the key exists, then write every value of the change-set.
    pub(crate) fn apply_change_set(
        &self,
        feature: Feature,
        change_set: &ChangeSet,
        notes: &mut Vec<String>,
    ) -> bool {
        let hive = change_set.hive();
        let path = change_set.path();
        let display = change_set.display_path();

        match self.ports.registry.create_key(hive, path) {
            Ok(created) => {
                if created {
                    info!(%hive, path, "created registry key");
                }
                self.audit(feature, AuditKind::Registry, &display, "create_key", true, None);
            }
            Err(error) => {
                self.fail(feature, AuditKind::Registry, &display, "create_key", &error, notes);
                return false;
            }
        }

        match self.ports.registry.set_values(change_set) {
            Ok(()) => {
                for (name, value) in change_set.values() {
                    debug!(%hive, path, name = name.as_str(), %value, "registry value written");
                }
                info!(%hive, path, values = change_set.values().len(), "registry values written");
                self.audit(feature, AuditKind::Registry, &display, "set_values", true, None);
                true
            }
            Err(error) => {
                self.fail(feature, AuditKind::Registry, &display, "set_values", &error, notes);
                false
            }
        }
    }

    // -- services ---------------------------------------------------------

    fn service_phase(&self, plan: &FeaturePlan, notes: &mut Vec<String>) -> bool {
        let mut ok = true;
        for target in &plan.services {
            ok &= self.disable_service(plan.feature, target, plan.probe_services, notes);
        }
        ok
    }

    fn disable_service(
        &self,
        feature: Feature,
        target: &ServiceTarget,
        probe: bool,
        notes: &mut Vec<String>,
    ) -> bool {
        let name = target.name.as_str();
        if probe {
            match self.ports.services.exists(name) {
                Ok(true) => {}
                Ok(false) => {
                    info!(service = name, "service not installed; nothing to disable");
                    self.audit(feature, AuditKind::Service, name, "probe", true, Some("absent"));
                    return true;
                }
                Err(error) => {
                    self.fail(feature, AuditKind::Service, name, "probe", &error, notes);
                    return false;
                }
            }
        }

        let stopped = !target.action.wants_stop() || {
            let result = self.retry.run(&format!("stop {name}"), || self.ports.services.stop(name));
            self.settle(feature, AuditKind::Service, name, "stop", result, notes)
        };
        let disabled = !target.action.wants_disable() || {
            let result = self
                .retry
                .run(&format!("disable {name}"), || self.ports.services.disable(name));
            self.settle(feature, AuditKind::Service, name, "disable", result, notes)
        };
        stopped && disabled
    }

    // -- tasks ------------------------------------------------------------

    fn task_phase(&self, plan: &FeaturePlan, notes: &mut Vec<String>) -> bool {
        let mut ok = true;
        for (index, task) in plan.tasks.iter().enumerate() {
            if self.disable_task(plan.feature, task, notes) {
                continue;
            }
            ok = false;
            if plan.task_policy.aborts() {
                let skipped = plan.tasks.len() - index - 1;
                if skipped > 0 {
                    warn!(skipped, "aborting remaining scheduled tasks");
                }
                break;
            }
        }
        ok
    }

    fn disable_task(&self, feature: Feature, task: &TaskTarget, notes: &mut Vec<String>) -> bool {
        let path = task.path();
        match self.ports.tasks.exists(path) {
            Ok(true) => {}
            Ok(false) => {
                info!(task = path, "scheduled task not present; nothing to disable");
                self.audit(feature, AuditKind::Task, path, "probe", true, Some("absent"));
                return true;
            }
            Err(error) => {
                self.fail(feature, AuditKind::Task, path, "probe", &error, notes);
                return false;
            }
        }
        let result = self.ports.tasks.disable(path);
        self.settle(feature, AuditKind::Task, path, "disable", result, notes)
    }

    // -- bookkeeping ------------------------------------------------------

    /// Turn one adapter result into a verdict. Absence counts as success.
    fn settle(
        &self,
        feature: Feature,
        kind: AuditKind,
        subject: &str,
        action: &str,
        result: Result<(), SysError>,
        notes: &mut Vec<String>,
    ) -> bool {
        match result {
            Ok(()) => {
                info!(item = subject, action, "done");
                self.audit(feature, kind, subject, action, true, None);
                true
            }
            Err(error) if error.is_absent() => {
                info!(item = subject, action, "not present; treating as satisfied");
                self.audit(feature, kind, subject, action, true, Some("absent"));
                true
            }
            Err(error) => {
                self.fail(feature, kind, subject, action, &error, notes);
                false
            }
        }
    }

    pub(crate) fn fail(
        &self,
        feature: Feature,
        kind: AuditKind,
        subject: &str,
        action: &str,
        error: &SysError,
        notes: &mut Vec<String>,
    ) {
        error!(item = subject, action, %error, "operation failed");
        let detail = error.to_string();
        self.audit(feature, kind, subject, action, false, Some(&detail));
        notes.push(format!("{action} {subject}: {detail}"));
    }

    pub(crate) fn audit(
        &self,
        feature: Feature,
        kind: AuditKind,
        subject: &str,
        action: &str,
        success: bool,
        detail: Option<&str>,
    ) {
        let record = AuditRecord::now(feature, kind, subject, action, success);
        let record = match detail {
            Some(detail) => record.with_detail(detail),
            None => record,
        };
        self.ports.audit.record(record);
    }
}

/// Log the outcome and attach the matching summary.
pub(crate) fn conclude(result: ReconciliationResult, messages: &Messages) -> ReconciliationResult {
    let summary = messages.for_outcome(result.outcome);
    match result.outcome {
        Outcome::Success => info!(feature = %result.feature, "{summary}"),
        Outcome::AppliedUnverified => warn!(feature = %result.feature, "{summary}"),
        Outcome::Failed => error!(
            feature = %result.feature,
            failed = ?result.failed_phases(),
            "{summary}"
        ),
    }
    result.with_summary(summary)
}
