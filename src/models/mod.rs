//! Domain models for ozon-sync
//!
//! This module contains the core domain models used throughout the application.

pub mod order;
pub mod sync_log;

// Re-export commonly used types
pub use order::{Order, OrderProduct, PostingCategory, TplIntegration};
pub use sync_log::{CategoryCounts, SyncLog, SyncLogPatch, SyncRunStatus, SyncSummary};
