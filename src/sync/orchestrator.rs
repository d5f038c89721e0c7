//! Sync run orchestration
//!
//! Drives one full sync pass: per posting category, creates a run record,
//! streams postings from the API into the store, and finalizes the record
//! with the run counters. Categories are isolated from each other, a failed
//! category never prevents the other from syncing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use futures::{pin_mut, StreamExt};
use tracing::{error, info};

use crate::api::{fetch_postings, OzonClient};
use crate::config::RequestConfig;
use crate::database::Database;
use crate::error::AppError;
use crate::models::{CategoryCounts, PostingCategory, SyncLogPatch, SyncRunStatus, SyncSummary};

/// Orchestrates sync runs against the API and the store
pub struct OrderSyncer<D: Database> {
    database: Arc<D>,
    client: Arc<OzonClient>,
    request: RequestConfig,
    days_to_fetch: u32,
}

impl<D: Database> OrderSyncer<D> {
    /// Create a new syncer
    pub fn new(
        database: Arc<D>,
        client: Arc<OzonClient>,
        request: RequestConfig,
        days_to_fetch: u32,
    ) -> Self {
        Self {
            database,
            client,
            request,
            days_to_fetch,
        }
    }

    /// Run one full sync pass over all posting categories
    ///
    /// A category failure is logged and recorded in its run record but does
    /// not abort the other categories. The summary only reflects categories
    /// that completed.
    pub async fn sync_all_orders(&self) -> Result<SyncSummary, AppError> {
        let (since, to) = super::sync_window(self.days_to_fetch, Local::now())?;
        let mut summary = SyncSummary::new(since, to);

        info!(
            date_from = %since,
            date_to = %to,
            days = self.days_to_fetch,
            "Starting order sync"
        );

        for category in PostingCategory::all() {
            match self.sync_category(category, since, to).await {
                Ok(counts) => {
                    info!(
                        category = %category,
                        fetched = counts.orders_fetched,
                        inserted = counts.orders_inserted,
                        updated = counts.orders_updated,
                        products = counts.products_count,
                        "Category sync finished"
                    );
                    summary.set_counts(category, counts);
                }
                Err(err) => {
                    error!(category = %category, error = %err, "Category sync failed");
                }
            }
        }

        Ok(summary)
    }

    /// Sync one posting category over the given window
    async fn sync_category(
        &self,
        category: PostingCategory,
        since: chrono::DateTime<Utc>,
        to: chrono::DateTime<Utc>,
    ) -> Result<CategoryCounts, AppError> {
        self.client.reset_stats();

        let log_id = self
            .database
            .create_sync_log(Utc::now(), category, since, to)
            .await?;

        match self.run_category(category, since, to).await {
            Ok(counts) => {
                let stats = self.client.stats();
                let patch = SyncLogPatch::finalize(
                    SyncRunStatus::Success,
                    &counts,
                    stats.http_requests,
                    stats.retries,
                );
                self.database.update_sync_log(log_id, &patch).await?;
                Ok(counts)
            }
            Err((err, counts)) => {
                let stats = self.client.stats();
                let patch = SyncLogPatch::finalize(
                    SyncRunStatus::Failed,
                    &counts,
                    stats.http_requests,
                    stats.retries,
                )
                .with_error(err.to_string());
                // Best effort, the original failure is the one to surface
                if let Err(db_err) = self.database.update_sync_log(log_id, &patch).await {
                    error!(
                        sync_log_id = log_id,
                        error = %db_err,
                        "Failed to record sync failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Drive the posting stream into the store, accumulating counters
    ///
    /// On failure the counters accumulated so far are returned alongside the
    /// error so the run record still reflects the partial progress.
    async fn run_category(
        &self,
        category: PostingCategory,
        since: chrono::DateTime<Utc>,
        to: chrono::DateTime<Utc>,
    ) -> Result<CategoryCounts, (AppError, CategoryCounts)> {
        let mut counts = CategoryCounts::default();

        let stream = fetch_postings(
            &self.client,
            category,
            since,
            to,
            self.request.limit,
            Duration::from_millis(self.request.page_delay_ms),
        );
        pin_mut!(stream);

        while let Some(item) = stream.next().await {
            let posting = item.map_err(|e| (AppError::Api(e), counts))?;
            counts.orders_fetched += 1;

            let inserted = self
                .database
                .upsert_order(&posting.order)
                .await
                .map_err(|e| (AppError::Database(e), counts))?;
            if inserted {
                counts.orders_inserted += 1;
            } else {
                counts.orders_updated += 1;
            }

            if !posting.products.is_empty() {
                self.database
                    .upsert_order_products(&posting.order.posting_number, &posting.products)
                    .await
                    .map_err(|e| (AppError::Database(e), counts))?;
                counts.products_count += posting.products.len() as u64;
            }

            if counts.orders_fetched % 100 == 0 {
                info!(
                    category = %category,
                    fetched = counts.orders_fetched,
                    "Sync progress"
                );
            }
        }

        Ok(counts)
    }
}
