//! Database layer for ozon-sync
//!
//! This module defines the database trait and SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::{Order, OrderProduct, PostingCategory, SyncLog, SyncLogPatch};

/// Database trait for data persistence
///
/// This trait defines all database operations needed by the application.
/// It uses `async_trait` for async methods and `mockall::automock` for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    // =========================================================================
    // Order operations
    // =========================================================================

    /// Insert or update an order by posting number
    ///
    /// Returns true when the order was newly inserted, false when an
    /// existing row was updated
    async fn upsert_order(&self, order: &Order) -> Result<bool, DbError>;

    /// Insert or update the product rows of one order
    async fn upsert_order_products(
        &self,
        posting_number: &str,
        products: &[OrderProduct],
    ) -> Result<(), DbError>;

    /// Get an order by posting number
    async fn get_order(&self, posting_number: &str) -> Result<Option<Order>, DbError>;

    /// Get the product rows of an order
    async fn get_order_products(&self, posting_number: &str)
        -> Result<Vec<OrderProduct>, DbError>;

    /// Count stored orders of one category
    async fn count_orders(&self, category: PostingCategory) -> Result<u64, DbError>;

    // =========================================================================
    // Sync log operations
    // =========================================================================

    /// Create a sync run record in the running state
    ///
    /// Returns the id of the new record
    async fn create_sync_log(
        &self,
        job_start: DateTime<Utc>,
        category: PostingCategory,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<i64, DbError>;

    /// Apply a sparse patch to a sync run record
    ///
    /// Only the fields set in the patch are written; an empty patch is a no-op
    async fn update_sync_log(&self, id: i64, patch: &SyncLogPatch) -> Result<(), DbError>;

    /// Get a sync run record by id
    async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>, DbError>;
}
