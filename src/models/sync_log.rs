//! Sync run record models
//!
//! One [`SyncLog`] row is created per posting category per invocation. It is
//! created with status `running` and finalized exactly once with either
//! `success` or `failed` plus the final counters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::PostingCategory;

/// Status of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRunStatus {
    /// Run is in progress
    Running,
    /// Run completed without error
    Success,
    /// Run aborted with an error
    Failed,
}

impl SyncRunStatus {
    /// Status tag as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncRunStatus::Running => "running",
            SyncRunStatus::Success => "success",
            SyncRunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(SyncRunStatus::Running),
            "success" => Ok(SyncRunStatus::Success),
            "failed" => Ok(SyncRunStatus::Failed),
            other => Err(format!("Unknown sync run status: {}", other)),
        }
    }
}

/// Persisted sync run record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLog {
    /// Auto-generated row id
    pub id: i64,

    /// When the run started
    pub job_start: DateTime<Utc>,

    /// When the run finished (None while running)
    pub job_end: Option<DateTime<Utc>>,

    /// Posting category this run covered
    pub posting_type: PostingCategory,

    /// Start of the synced date window
    pub date_from: DateTime<Utc>,

    /// End of the synced date window
    pub date_to: DateTime<Utc>,

    /// Run status
    pub status: SyncRunStatus,

    /// Orders fetched from the API
    pub orders_fetched: u64,

    /// Orders newly inserted
    pub orders_inserted: u64,

    /// Orders updated in place
    pub orders_updated: u64,

    /// Product lines written
    pub products_count: u64,

    /// HTTP requests issued during the run
    pub http_requests: u64,

    /// Retries performed during the run
    pub retries: u64,

    /// Error message, set when the run failed
    pub error_message: Option<String>,
}

/// Sparse update for a sync run record
///
/// Only fields that are `Some` are written; everything else is left untouched.
/// The fixed field list replaces ad hoc field-name matching with a
/// compile-time checked structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncLogPatch {
    /// New end time
    pub job_end: Option<DateTime<Utc>>,
    /// New status
    pub status: Option<SyncRunStatus>,
    /// Orders fetched counter
    pub orders_fetched: Option<u64>,
    /// Orders inserted counter
    pub orders_inserted: Option<u64>,
    /// Orders updated counter
    pub orders_updated: Option<u64>,
    /// Product lines counter
    pub products_count: Option<u64>,
    /// HTTP request counter
    pub http_requests: Option<u64>,
    /// Retry counter
    pub retries: Option<u64>,
    /// Error message
    pub error_message: Option<String>,
}

impl SyncLogPatch {
    /// Returns true when no field is set
    pub fn is_empty(&self) -> bool {
        *self == SyncLogPatch::default()
    }

    /// Finalization patch shared by the success and failure paths
    pub fn finalize(
        status: SyncRunStatus,
        counts: &CategoryCounts,
        http_requests: u64,
        retries: u64,
    ) -> Self {
        Self {
            job_end: Some(Utc::now()),
            status: Some(status),
            orders_fetched: Some(counts.orders_fetched),
            orders_inserted: Some(counts.orders_inserted),
            orders_updated: Some(counts.orders_updated),
            products_count: Some(counts.products_count),
            http_requests: Some(http_requests),
            retries: Some(retries),
            error_message: None,
        }
    }

    /// Attach an error message
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Per-category counters accumulated during a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Orders fetched from the API
    pub orders_fetched: u64,
    /// Orders newly inserted
    pub orders_inserted: u64,
    /// Orders updated in place
    pub orders_updated: u64,
    /// Product lines written
    pub products_count: u64,
}

/// Aggregate result of one full sync pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Counters for the marketplace-fulfilled category
    pub fbo: CategoryCounts,
    /// Counters for the seller-fulfilled category
    pub fbs: CategoryCounts,
    /// Start of the synced date window
    pub date_from: DateTime<Utc>,
    /// End of the synced date window
    pub date_to: DateTime<Utc>,
}

impl SyncSummary {
    /// Create an empty summary for the given window
    pub fn new(date_from: DateTime<Utc>, date_to: DateTime<Utc>) -> Self {
        Self {
            fbo: CategoryCounts::default(),
            fbs: CategoryCounts::default(),
            date_from,
            date_to,
        }
    }

    /// Set the counters for one category
    pub fn set_counts(&mut self, category: PostingCategory, counts: CategoryCounts) {
        match category {
            PostingCategory::Fbo => self.fbo = counts,
            PostingCategory::Fbs => self.fbs = counts,
        }
    }

    /// Combined counters across both categories
    pub fn total(&self) -> CategoryCounts {
        CategoryCounts {
            orders_fetched: self.fbo.orders_fetched + self.fbs.orders_fetched,
            orders_inserted: self.fbo.orders_inserted + self.fbs.orders_inserted,
            orders_updated: self.fbo.orders_updated + self.fbs.orders_updated,
            products_count: self.fbo.products_count + self.fbs.products_count,
        }
    }
}
