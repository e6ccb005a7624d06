//! Audit trail configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Record every registry/service/task operation to a JSONL file.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Audit directory; falls back to `log.dir` when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: None,
        }
    }
}
