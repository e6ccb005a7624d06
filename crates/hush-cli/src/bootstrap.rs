//! Builds the real adapters from configuration.

use anyhow::Context;
use hush_config::HushConfig;
use hush_reconcile::SystemPorts;
use hush_sys::{
    AuditSink, JsonlAuditSink, NullAuditSink, PlatformRegistry, SchtasksScheduler,
    ScServiceControl, SystemRunner, TasklistProcesses, WhoamiElevation, WindowsMaintenance,
};
use tracing::info;

/// Owns every adapter for one run.
pub struct Machine {
    registry: PlatformRegistry,
    services: ScServiceControl<SystemRunner>,
    tasks: SchtasksScheduler<SystemRunner>,
    processes: TasklistProcesses<SystemRunner>,
    maintenance: WindowsMaintenance<SystemRunner>,
    elevation: WhoamiElevation<SystemRunner>,
    audit: Box<dyn AuditSink>,
}

impl Machine {
    /// # Errors
    ///
    /// When the audit directory cannot be created.
    pub fn from_config(config: &HushConfig) -> anyhow::Result<Self> {
        let exec = &config.exec;
        let timeout = exec.command_timeout();

        let audit: Box<dyn AuditSink> = if config.audit.enabled {
            let sink = JsonlAuditSink::create(config.audit_dir()).with_context(|| {
                format!(
                    "failed to prepare audit directory {}",
                    config.audit_dir().display()
                )
            })?;
            info!(path = %sink.path().display(), "audit trail");
            Box::new(sink)
        } else {
            Box::new(NullAuditSink)
        };

        Ok(Self {
            registry: PlatformRegistry,
            services: ScServiceControl::new(SystemRunner, timeout, exec.stop_wait()),
            tasks: SchtasksScheduler::new(SystemRunner, timeout),
            processes: TasklistProcesses::new(SystemRunner, timeout),
            maintenance: WindowsMaintenance::new(SystemRunner, exec.repair_timeout()),
            elevation: WhoamiElevation::new(SystemRunner, timeout),
            audit,
        })
    }

    #[must_use]
    pub fn ports(&self) -> SystemPorts<'_> {
        SystemPorts {
            registry: &self.registry,
            services: &self.services,
            tasks: &self.tasks,
            processes: &self.processes,
            maintenance: &self.maintenance,
            elevation: &self.elevation,
            audit: self.audit.as_ref(),
        }
    }
}
