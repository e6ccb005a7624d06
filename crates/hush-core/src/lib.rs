//! # hush-core
//!
//! Core types and error types for hush.
//!
//! This crate provides the foundational types shared across all hush crates:
//! - Registry change-sets with a closed value type (`DWORD` or string)
//! - Service and scheduled-task targets
//! - Feature, phase, policy and outcome enums
//! - The per-run `ReconciliationResult` and `VerificationSnapshot`
//! - Audit records for the side-channel audit sink
//! - Cross-cutting error types

pub mod audit;
pub mod enums;
pub mod errors;
pub mod registry;
pub mod result;
pub mod targets;

pub use audit::{AuditKind, AuditRecord};
pub use enums::{FailurePolicy, Feature, Outcome, Phase};
pub use errors::CoreError;
pub use registry::{ChangeSet, Hive, RegValue};
pub use result::{ReconciliationResult, VerificationSnapshot};
pub use targets::{ServiceAction, ServiceTarget, TaskTarget};
