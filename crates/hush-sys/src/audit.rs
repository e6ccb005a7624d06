//! Audit sinks.
//!
//! The sink is a side channel: recording never fails from the caller's point
//! of view and nothing reads records back during a run.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use hush_core::AuditRecord;

use crate::error::SysError;

pub trait AuditSink {
    fn record(&self, record: AuditRecord);
}

/// Discards everything. Used when auditing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _record: AuditRecord) {}
}

/// Appends one JSON object per line to `audit_<YYYYMMDD_HHMMSS>.jsonl`.
#[derive(Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Prepare a fresh audit file in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// [`SysError::Io`] when the directory cannot be created.
    pub fn create(dir: &Path) -> Result<Self, SysError> {
        fs::create_dir_all(dir)?;
        let name = format!("audit_{}.jsonl", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        Ok(Self {
            path: dir.join(name),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, record: AuditRecord) {
        if let Err(error) = serde_jsonlines::append_json_lines(&self.path, [&record]) {
            tracing::warn!(path = %self.path.display(), %error, "failed to write audit record");
        }
    }
}

/// Keeps records in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RefCell<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.borrow().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records.borrow_mut().push(record);
    }
}
