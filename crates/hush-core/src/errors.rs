//! Cross-cutting error types for hush.
//!
//! Adapter failures (`SysError`) and configuration failures (`ConfigError`)
//! live in their own crates. `CoreError` covers invariant violations in the
//! data model itself.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A change-set named the same registry value twice.
    #[error("duplicate registry value '{name}' in change-set for {path}")]
    DuplicateValue { path: String, name: String },

    /// Registry key paths are hive-relative and must not be empty.
    #[error("invalid registry key path '{path}': {reason}")]
    InvalidKeyPath { path: String, reason: String },

    /// Data failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}
