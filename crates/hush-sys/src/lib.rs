//! # hush-sys
//!
//! Primitive adapters between the reconciler and the operating system.
//!
//! Each subsystem is a small trait in [`ports`] with a Windows
//! implementation:
//! - registry: `winreg` ([`PlatformRegistry`])
//! - services: `sc.exe` ([`ScServiceControl`])
//! - scheduled tasks: `schtasks.exe` ([`SchtasksScheduler`])
//! - processes: `tasklist.exe` / `taskkill.exe` ([`TasklistProcesses`])
//! - integrity tools: `sfc.exe` / `DISM.exe` ([`WindowsMaintenance`])
//! - elevation: `whoami /groups` ([`WhoamiElevation`])
//!
//! Everything except the registry shells out through a [`CommandRunner`],
//! so output parsing is testable on any host with a scripted runner.
//! Adapters are stateless and blocking; none of them retries.

pub mod audit;
pub mod command;
pub mod elevation;
pub mod error;
pub mod maintenance;
pub mod ports;
pub mod process;
pub mod registry;
pub mod service;
pub mod task;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use audit::{AuditSink, JsonlAuditSink, MemoryAuditSink, NullAuditSink};
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use elevation::WhoamiElevation;
pub use error::SysError;
pub use maintenance::WindowsMaintenance;
pub use ports::{ElevationGuard, MaintenancePort, ProcessPort, RegistryPort, ServicePort, TaskPort};
pub use process::TasklistProcesses;
pub use registry::PlatformRegistry;
pub use service::ScServiceControl;
pub use task::SchtasksScheduler;
