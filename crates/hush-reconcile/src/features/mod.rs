//! Per-feature plans and variants.

pub mod ai_overlay;
pub mod context_menu;
pub mod integrity;
pub mod telemetry;
pub mod voice_assistant;
