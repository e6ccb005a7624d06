//! Service and scheduled-task targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Desired lifecycle action for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    Stop,
    Disable,
    StopAndDisable,
}

impl ServiceAction {
    #[must_use]
    pub const fn wants_stop(self) -> bool {
        matches!(self, Self::Stop | Self::StopAndDisable)
    }

    #[must_use]
    pub const fn wants_disable(self) -> bool {
        matches!(self, Self::Disable | Self::StopAndDisable)
    }
}

/// A service identified by its short name.
///
/// When both actions are requested, stop is attempted before disable and
/// both are attempted regardless of the other's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub action: ServiceAction,
}

impl ServiceTarget {
    #[must_use]
    pub fn stop_and_disable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: ServiceAction::StopAndDisable,
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A scheduled task to disable, addressed by its backslash-separated path
/// relative to the task scheduler root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTarget {
    path: String,
}

impl TaskTarget {
    /// # Errors
    ///
    /// [`CoreError::Validation`] when the path is empty.
    pub fn new(path: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();
        let trimmed = path.trim_matches('\\');
        if trimmed.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "scheduled task path '{path}' is empty"
            )));
        }
        Ok(Self {
            path: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Task name, the last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('\\').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for TaskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_action_flags() {
        assert!(ServiceAction::StopAndDisable.wants_stop());
        assert!(ServiceAction::StopAndDisable.wants_disable());
        assert!(!ServiceAction::Stop.wants_disable());
        assert!(!ServiceAction::Disable.wants_stop());
    }

    #[test]
    fn task_path_is_normalized() {
        let task = TaskTarget::new(r"\Microsoft\Windows\Windows Search\CortanaConsent\")
            .expect("valid task");
        assert_eq!(task.path(), r"Microsoft\Windows\Windows Search\CortanaConsent");
        assert_eq!(task.name(), "CortanaConsent");
    }

    #[test]
    fn empty_task_path_is_rejected() {
        assert!(TaskTarget::new(r"\\").is_err());
        assert!(TaskTarget::new("").is_err());
    }
}
