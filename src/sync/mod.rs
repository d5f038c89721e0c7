//! Sync orchestration
//!
//! Computes the date window, drives the paginated fetch per posting
//! category, and records run telemetry.

pub mod orchestrator;
pub mod window;

pub use orchestrator::OrderSyncer;
pub use window::sync_window;
