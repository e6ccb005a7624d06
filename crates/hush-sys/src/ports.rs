//! Adapter traits.
//!
//! The reconciler only ever talks to these traits. All methods take `&self`;
//! implementations hold no mutable state of their own.

use hush_core::{ChangeSet, Hive, RegValue};

use crate::error::SysError;

pub trait RegistryPort {
    fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, SysError>;

    /// Create the key if absent. Returns `true` when it was newly created.
    fn create_key(&self, hive: Hive, path: &str) -> Result<bool, SysError>;

    /// Create the key on demand, then write every value in order.
    ///
    /// Best-effort: a failure part-way leaves earlier values written.
    fn set_values(&self, change_set: &ChangeSet) -> Result<(), SysError>;

    /// Read one value. A missing key or value reads as `None`.
    fn read_value(&self, hive: Hive, path: &str, name: &str)
    -> Result<Option<RegValue>, SysError>;

    /// Delete one value. A missing key or value is not an error.
    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), SysError>;
}

pub trait ServicePort {
    fn exists(&self, name: &str) -> Result<bool, SysError>;

    /// Any state other than stopped counts as running.
    fn is_running(&self, name: &str) -> Result<bool, SysError>;

    /// Stop and wait for the service to leave the running state. Stopping an
    /// already-stopped service succeeds.
    fn stop(&self, name: &str) -> Result<(), SysError>;

    /// Set the start mode to disabled.
    fn disable(&self, name: &str) -> Result<(), SysError>;
}

pub trait TaskPort {
    fn exists(&self, path: &str) -> Result<bool, SysError>;
    fn disable(&self, path: &str) -> Result<(), SysError>;
}

pub trait ProcessPort {
    fn is_running(&self, image: &str) -> Result<bool, SysError>;

    /// Terminate every process with this image name. Nothing running is not
    /// an error.
    fn terminate(&self, image: &str) -> Result<(), SysError>;

    /// Start the image detached from this process.
    fn launch(&self, image: &str) -> Result<(), SysError>;
}

/// Long-running system repair tools. Each returns the tool's captured output.
pub trait MaintenancePort {
    fn scan_system_files(&self) -> Result<String, SysError>;
    fn repair_component_store(&self) -> Result<String, SysError>;
}

/// "Does the current process hold administrative rights?"
///
/// Must not fail: any query error reads as not elevated.
pub trait ElevationGuard {
    fn is_elevated(&self) -> bool;
}
