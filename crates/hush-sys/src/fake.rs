//! In-memory fakes for tests.
//!
//! [`FakeSystem`] implements every port over a simulated machine: registry
//! keys and values, services, scheduled tasks and processes. Faults can be
//! injected per target, and every adapter call is logged so tests can assert
//! on call counts. [`ScriptedRunner`] replays canned command output for the
//! command-line adapters.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use hush_core::{ChangeSet, Hive, RegValue};

use crate::command::{CommandOutput, CommandRunner};
use crate::error::SysError;
use crate::ports::{
    ElevationGuard, MaintenancePort, ProcessPort, RegistryPort, ServicePort, TaskPort,
};

// ---------------------------------------------------------------------------
// FakeSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeService {
    pub running: bool,
    pub disabled: bool,
}

/// Observable machine state. Compared across runs for idempotence checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeState {
    pub registry: BTreeMap<(Hive, String), BTreeMap<String, RegValue>>,
    pub services: BTreeMap<String, FakeService>,
    /// Task path -> enabled.
    pub tasks: BTreeMap<String, bool>,
    /// Lowercased image names.
    pub processes: BTreeSet<String>,
}

/// One adapter call, in invocation order.
#[derive(Debug, Clone)]
struct Call {
    op: &'static str,
    target: String,
    mutating: bool,
}

#[derive(Debug, Default)]
struct Faults {
    registry_keys: BTreeSet<String>,
    registry_values: BTreeSet<(String, String)>,
    registry_reads: BTreeSet<String>,
    service_ops: BTreeSet<(String, &'static str)>,
    transient_stops: BTreeMap<String, u32>,
    task_disables: BTreeSet<String>,
    task_queries: BTreeSet<String>,
    sticky_processes: BTreeSet<String>,
    terminate: bool,
    launch: bool,
    maintenance: BTreeSet<&'static str>,
}

#[derive(Debug)]
pub struct FakeSystem {
    state: RefCell<FakeState>,
    faults: RefCell<Faults>,
    elevated: Cell<bool>,
    elevation_checks: Cell<usize>,
    calls: RefCell<Vec<Call>>,
}

impl Default for FakeSystem {
    fn default() -> Self {
        Self::elevated()
    }
}

impl FakeSystem {
    /// An empty machine whose elevation guard says yes.
    #[must_use]
    pub fn elevated() -> Self {
        Self {
            state: RefCell::new(FakeState::default()),
            faults: RefCell::new(Faults::default()),
            elevated: Cell::new(true),
            elevation_checks: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// An empty machine whose elevation guard says no.
    #[must_use]
    pub fn unelevated() -> Self {
        let system = Self::elevated();
        system.elevated.set(false);
        system
    }

    // -- state ------------------------------------------------------------

    #[must_use]
    pub fn with_key(self, hive: Hive, path: &str) -> Self {
        self.state
            .borrow_mut()
            .registry
            .entry((hive, path.to_string()))
            .or_default();
        self
    }

    #[must_use]
    pub fn with_value(self, hive: Hive, path: &str, name: &str, value: RegValue) -> Self {
        self.state
            .borrow_mut()
            .registry
            .entry((hive, path.to_string()))
            .or_default()
            .insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_service(self, name: &str, running: bool) -> Self {
        self.state.borrow_mut().services.insert(
            name.to_string(),
            FakeService {
                running,
                disabled: false,
            },
        );
        self
    }

    #[must_use]
    pub fn with_task(self, path: &str) -> Self {
        self.state.borrow_mut().tasks.insert(path.to_string(), true);
        self
    }

    #[must_use]
    pub fn with_process(self, image: &str) -> Self {
        self.state
            .borrow_mut()
            .processes
            .insert(image.to_ascii_lowercase());
        self
    }

    // -- faults -----------------------------------------------------------

    /// Writes and key creation under `path` fail with access denied.
    #[must_use]
    pub fn fail_key(self, path: &str) -> Self {
        self.faults.borrow_mut().registry_keys.insert(path.to_string());
        self
    }

    /// Writing `name` under `path` fails; earlier values of the same
    /// change-set stay written.
    #[must_use]
    pub fn fail_value(self, path: &str, name: &str) -> Self {
        self.faults
            .borrow_mut()
            .registry_values
            .insert((path.to_string(), name.to_string()));
        self
    }

    #[must_use]
    pub fn fail_read(self, path: &str) -> Self {
        self.faults.borrow_mut().registry_reads.insert(path.to_string());
        self
    }

    /// `op` is `"stop"` or `"disable"`.
    #[must_use]
    pub fn fail_service(self, name: &str, op: &'static str) -> Self {
        self.faults
            .borrow_mut()
            .service_ops
            .insert((name.to_string(), op));
        self
    }

    /// The next `times` stop calls report the service as busy.
    #[must_use]
    pub fn transient_stop(self, name: &str, times: u32) -> Self {
        self.faults
            .borrow_mut()
            .transient_stops
            .insert(name.to_string(), times);
        self
    }

    #[must_use]
    pub fn fail_task(self, path: &str) -> Self {
        self.faults.borrow_mut().task_disables.insert(path.to_string());
        self
    }

    #[must_use]
    pub fn fail_task_query(self, path: &str) -> Self {
        self.faults.borrow_mut().task_queries.insert(path.to_string());
        self
    }

    /// Terminating `image` reports success but the process keeps running.
    #[must_use]
    pub fn keep_alive(self, image: &str) -> Self {
        self.faults
            .borrow_mut()
            .sticky_processes
            .insert(image.to_ascii_lowercase());
        self
    }

    #[must_use]
    pub fn fail_terminate(self) -> Self {
        self.faults.borrow_mut().terminate = true;
        self
    }

    #[must_use]
    pub fn fail_launch(self) -> Self {
        self.faults.borrow_mut().launch = true;
        self
    }

    /// `tool` is `"sfc"` or `"dism"`.
    #[must_use]
    pub fn fail_maintenance(self, tool: &'static str) -> Self {
        self.faults.borrow_mut().maintenance.insert(tool);
        self
    }

    // -- inspection -------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> FakeState {
        self.state.borrow().clone()
    }

    /// Adapter calls, excluding elevation checks.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| c.mutating).count()
    }

    /// Targets of every call with this op, in order.
    #[must_use]
    pub fn targets_of(&self, op: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.target.clone())
            .collect()
    }

    #[must_use]
    pub fn elevation_checks(&self) -> usize {
        self.elevation_checks.get()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
        self.elevation_checks.set(0);
    }

    #[must_use]
    pub fn value(&self, hive: Hive, path: &str, name: &str) -> Option<RegValue> {
        self.state
            .borrow()
            .registry
            .get(&(hive, path.to_string()))
            .and_then(|values| values.get(name).cloned())
    }

    fn log(&self, op: &'static str, target: impl Into<String>, mutating: bool) {
        self.calls.borrow_mut().push(Call {
            op,
            target: target.into(),
            mutating,
        });
    }
}

fn denied(target: &str) -> SysError {
    SysError::AccessDenied(target.to_string())
}

impl RegistryPort for FakeSystem {
    fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, SysError> {
        self.log("registry.key_exists", path, false);
        Ok(self
            .state
            .borrow()
            .registry
            .contains_key(&(hive, path.to_string())))
    }

    fn create_key(&self, hive: Hive, path: &str) -> Result<bool, SysError> {
        self.log("registry.create_key", path, true);
        if self.faults.borrow().registry_keys.contains(path) {
            return Err(denied(path));
        }
        let mut state = self.state.borrow_mut();
        let key = (hive, path.to_string());
        if state.registry.contains_key(&key) {
            return Ok(false);
        }
        state.registry.insert(key, BTreeMap::new());
        Ok(true)
    }

    fn set_values(&self, change_set: &ChangeSet) -> Result<(), SysError> {
        let path = change_set.path();
        self.log("registry.set_values", path, true);
        let faults = self.faults.borrow();
        if faults.registry_keys.contains(path) {
            return Err(denied(path));
        }

        let mut state = self.state.borrow_mut();
        let values = state
            .registry
            .entry((change_set.hive(), path.to_string()))
            .or_default();
        for (name, value) in change_set.values() {
            if faults
                .registry_values
                .contains(&(path.to_string(), name.clone()))
            {
                return Err(denied(&format!("{path}\\{name}")));
            }
            values.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    fn read_value(
        &self,
        hive: Hive,
        path: &str,
        name: &str,
    ) -> Result<Option<RegValue>, SysError> {
        self.log("registry.read_value", format!("{path}\\{name}"), false);
        if self.faults.borrow().registry_reads.contains(path) {
            return Err(denied(path));
        }
        Ok(self.value(hive, path, name))
    }

    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), SysError> {
        self.log("registry.delete_value", format!("{path}\\{name}"), true);
        if self.faults.borrow().registry_keys.contains(path) {
            return Err(denied(path));
        }
        if let Some(values) = self
            .state
            .borrow_mut()
            .registry
            .get_mut(&(hive, path.to_string()))
        {
            values.remove(name);
        }
        Ok(())
    }
}

impl ServicePort for FakeSystem {
    fn exists(&self, name: &str) -> Result<bool, SysError> {
        self.log("service.exists", name, false);
        Ok(self.state.borrow().services.contains_key(name))
    }

    fn is_running(&self, name: &str) -> Result<bool, SysError> {
        self.log("service.is_running", name, false);
        self.state
            .borrow()
            .services
            .get(name)
            .map(|service| service.running)
            .ok_or_else(|| SysError::not_found("service", name))
    }

    fn stop(&self, name: &str) -> Result<(), SysError> {
        self.log("service.stop", name, true);
        let mut faults = self.faults.borrow_mut();
        if faults.service_ops.contains(&(name.to_string(), "stop")) {
            return Err(denied(name));
        }
        if let Some(remaining) = faults.transient_stops.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SysError::Transient {
                    name: name.to_string(),
                    detail: "stop pending".to_string(),
                });
            }
        }
        let mut state = self.state.borrow_mut();
        let service = state
            .services
            .get_mut(name)
            .ok_or_else(|| SysError::not_found("service", name))?;
        service.running = false;
        Ok(())
    }

    fn disable(&self, name: &str) -> Result<(), SysError> {
        self.log("service.disable", name, true);
        if self
            .faults
            .borrow()
            .service_ops
            .contains(&(name.to_string(), "disable"))
        {
            return Err(denied(name));
        }
        let mut state = self.state.borrow_mut();
        let service = state
            .services
            .get_mut(name)
            .ok_or_else(|| SysError::not_found("service", name))?;
        service.disabled = true;
        Ok(())
    }
}

impl TaskPort for FakeSystem {
    fn exists(&self, path: &str) -> Result<bool, SysError> {
        self.log("task.exists", path, false);
        if self.faults.borrow().task_queries.contains(path) {
            return Err(SysError::CommandFailed {
                program: "schtasks.exe".to_string(),
                code: 1,
                detail: "query failed".to_string(),
            });
        }
        Ok(self.state.borrow().tasks.contains_key(path))
    }

    fn disable(&self, path: &str) -> Result<(), SysError> {
        self.log("task.disable", path, true);
        if self.faults.borrow().task_disables.contains(path) {
            return Err(denied(path));
        }
        let mut state = self.state.borrow_mut();
        let enabled = state
            .tasks
            .get_mut(path)
            .ok_or_else(|| SysError::not_found("scheduled task", path))?;
        *enabled = false;
        Ok(())
    }
}

impl ProcessPort for FakeSystem {
    fn is_running(&self, image: &str) -> Result<bool, SysError> {
        self.log("process.is_running", image, false);
        Ok(self
            .state
            .borrow()
            .processes
            .contains(&image.to_ascii_lowercase()))
    }

    fn terminate(&self, image: &str) -> Result<(), SysError> {
        self.log("process.terminate", image, true);
        let faults = self.faults.borrow();
        if faults.terminate {
            return Err(denied(image));
        }
        let image = image.to_ascii_lowercase();
        if !faults.sticky_processes.contains(&image) {
            self.state.borrow_mut().processes.remove(&image);
        }
        Ok(())
    }

    fn launch(&self, image: &str) -> Result<(), SysError> {
        self.log("process.launch", image, true);
        if self.faults.borrow().launch {
            return Err(SysError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{image} not found"),
            )));
        }
        self.state
            .borrow_mut()
            .processes
            .insert(image.to_ascii_lowercase());
        Ok(())
    }
}

impl MaintenancePort for FakeSystem {
    fn scan_system_files(&self) -> Result<String, SysError> {
        self.log("maintenance.sfc", "sfc", true);
        if self.faults.borrow().maintenance.contains("sfc") {
            return Err(SysError::CommandFailed {
                program: "sfc.exe".to_string(),
                code: 1,
                detail: "Windows Resource Protection could not perform the requested operation."
                    .to_string(),
            });
        }
        Ok("Windows Resource Protection did not find any integrity violations.".to_string())
    }

    fn repair_component_store(&self) -> Result<String, SysError> {
        self.log("maintenance.dism", "dism", true);
        if self.faults.borrow().maintenance.contains("dism") {
            return Err(SysError::CommandFailed {
                program: "DISM.exe".to_string(),
                code: 87,
                detail: "Error: 87".to_string(),
            });
        }
        Ok("The restore operation completed successfully.".to_string())
    }
}

impl ElevationGuard for FakeSystem {
    fn is_elevated(&self) -> bool {
        self.elevation_checks.set(self.elevation_checks.get() + 1);
        self.elevated.get()
    }
}

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// Replays queued command results in order and records every invocation.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<Result<CommandOutput, SysError>>>,
    invocations: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, output: CommandOutput) {
        self.responses.borrow_mut().push_back(Ok(output));
    }

    pub fn push_error(&self, error: SysError) {
        self.responses.borrow_mut().push_back(Err(error));
    }

    /// `program arg1 arg2 ...` per call; detached spawns are prefixed with
    /// `spawn`.
    #[must_use]
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.borrow().clone()
    }

    fn record(&self, prefix: Option<&str>, program: &str, args: &[&str]) -> String {
        let line = prefix
            .into_iter()
            .chain(std::iter::once(program))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.invocations.borrow_mut().push(line.clone());
        line
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput, SysError> {
        let line = self.record(None, program, args);
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(SysError::Unsupported(format!(
                "no scripted response for `{line}`"
            )))
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), SysError> {
        self.record(Some("spawn"), program, args);
        Ok(())
    }
}
