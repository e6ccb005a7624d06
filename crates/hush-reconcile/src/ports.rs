//! The adapter bundle a reconciler runs against.

use hush_sys::{
    AuditSink, ElevationGuard, MaintenancePort, ProcessPort, RegistryPort, ServicePort, TaskPort,
};

/// Borrowed adapters for one run. Built once by the caller and passed in.
#[derive(Clone, Copy)]
pub struct SystemPorts<'a> {
    pub registry: &'a dyn RegistryPort,
    pub services: &'a dyn ServicePort,
    pub tasks: &'a dyn TaskPort,
    pub processes: &'a dyn ProcessPort,
    pub maintenance: &'a dyn MaintenancePort,
    pub elevation: &'a dyn ElevationGuard,
    pub audit: &'a dyn AuditSink,
}

impl<'a> SystemPorts<'a> {
    /// Use one value for every port, e.g. an in-memory fake system.
    pub fn uniform<S>(system: &'a S, audit: &'a dyn AuditSink) -> Self
    where
        S: RegistryPort + ServicePort + TaskPort + ProcessPort + MaintenancePort + ElevationGuard,
    {
        Self {
            registry: system,
            services: system,
            tasks: system,
            processes: system,
            maintenance: system,
            elevation: system,
            audit,
        }
    }
}

impl std::fmt::Debug for SystemPorts<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPorts").finish_non_exhaustive()
    }
}
