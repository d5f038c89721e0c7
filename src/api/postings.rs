//! Paginated posting retrieval
//!
//! Drives the list endpoints page by page and yields normalized postings
//! lazily as a stream, so the caller can upsert each posting while the next
//! page is still being paged in.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures::Stream;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::client::OzonClient;
use crate::api::normalize::{normalize_posting, FetchedPosting};
use crate::error::ApiError;
use crate::models::PostingCategory;

/// List endpoint for a posting category
fn endpoint(category: PostingCategory) -> &'static str {
    match category {
        PostingCategory::Fbo => "/v2/posting/fbo/list",
        PostingCategory::Fbs => "/v3/posting/fbs/list",
    }
}

/// Request body for one page
fn page_body(
    category: PostingCategory,
    since: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: u32,
    offset: u64,
) -> Value {
    let with = match category {
        PostingCategory::Fbo => json!({
            "analytics_data": true,
            "financial_data": true,
        }),
        PostingCategory::Fbs => json!({
            "analytics_data": true,
            "financial_data": true,
            "barcodes": true,
            "translit": true,
        }),
    };

    json!({
        "dir": "ASC",
        "filter": {
            "since": since.to_rfc3339_opts(SecondsFormat::Millis, true),
            "to": to.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        "limit": limit,
        "offset": offset,
        "with": with,
    })
}

/// Pull the posting array out of a page response
///
/// FBO returns `result` as the array directly; FBS wraps it in
/// `result.postings`, with a bare `result` array as a legacy fallback.
fn extract_page(category: PostingCategory, response: &Value) -> Vec<Value> {
    let result = &response["result"];
    let page = match category {
        PostingCategory::Fbo => result.as_array(),
        PostingCategory::Fbs => result["postings"].as_array().or_else(|| result.as_array()),
    };
    page.cloned().unwrap_or_default()
}

/// Fetch all postings of one category in the given window as a lazy stream
///
/// Pages are requested in ascending order with a growing offset; the stream
/// ends after an empty page or a page shorter than `limit`. A fixed delay is
/// inserted between page requests. Any API error ends the stream after being
/// yielded.
pub fn fetch_postings<'a>(
    client: &'a OzonClient,
    category: PostingCategory,
    since: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: u32,
    page_delay: Duration,
) -> impl Stream<Item = Result<FetchedPosting, ApiError>> + 'a {
    async_stream::try_stream! {
        let endpoint = endpoint(category);
        let mut offset: u64 = 0;

        loop {
            let body = page_body(category, since, to, limit, offset);
            let response = client.request(endpoint, &body).await?;
            let page = extract_page(category, &response);
            let count = page.len();

            debug!(
                category = %category,
                offset = offset,
                count = count,
                "Fetched posting page"
            );

            if count == 0 {
                break;
            }

            for raw in &page {
                let posting = normalize_posting(raw, category)?;
                yield posting;
            }

            if count < limit as usize {
                break;
            }

            offset += count as u64;
            tokio::time::sleep(page_delay).await;
        }
    }
}
