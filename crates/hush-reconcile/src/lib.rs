//! # hush-reconcile
//!
//! Drives operating-system features toward their disabled state.
//!
//! A [`Reconciler`] holds the adapter ports for one run. Each feature is a
//! declarative [`FeaturePlan`] (registry change-sets, services, scheduled
//! tasks, an optional post-condition) executed by the generic engine, or a
//! small variant built on the same primitives:
//! - [`features::telemetry`] and [`features::voice_assistant`]: full plans
//! - [`features::ai_overlay`]: a single policy write
//! - [`features::context_menu`]: a toggle with an optional shell restart
//! - [`features::integrity`]: the system file and component store checks
//!
//! Every entry point checks elevation first and performs no adapter call
//! when it is missing. Adapter errors never escape: each one becomes a
//! phase verdict, a log line, an audit record and a result note.

pub mod dispatch;
pub mod engine;
pub mod features;
pub mod ports;
pub mod retry;

pub use dispatch::{Action, run};
pub use engine::{FeaturePlan, Messages, PostCondition, Reconciler, ELEVATION_REQUIRED};
pub use ports::SystemPorts;
pub use retry::RetryPolicy;
