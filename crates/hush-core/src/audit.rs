//! Audit records.
//!
//! Every discrete adapter operation performed during a reconciliation is
//! recorded as an `AuditRecord`. Records go to a side channel and are never
//! read back for control flow.

use serde::{Deserialize, Serialize};

use crate::enums::Feature;

/// Which subsystem an audited operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Registry,
    Service,
    Task,
    Process,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339 timestamp.
    pub ts: String,
    pub feature: Feature,
    pub kind: AuditKind,
    /// Key path, service name, task path or process image.
    pub target: String,
    /// Operation verb, e.g. `set_values`, `stop`, `disable`.
    pub action: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditRecord {
    /// Build a record stamped with the current time.
    #[must_use]
    pub fn now(
        feature: Feature,
        kind: AuditKind,
        target: impl Into<String>,
        action: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            feature,
            kind,
            target: target.into(),
            action: action.into(),
            success,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
