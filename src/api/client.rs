//! Authenticated HTTP client for the Ozon seller API
//!
//! This module provides a POST client with response classification,
//! exponential-backoff retry for transient failures, and request/retry
//! counters scoped to one sync invocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::warn;

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{ApiError, RetryableError};

/// Snapshot of the client's diagnostic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiStatsSnapshot {
    /// Total HTTP requests issued (including retried attempts)
    pub http_requests: u64,
    /// Total retries performed (one per retry, not per attempt)
    pub retries: u64,
}

/// Request/retry counters owned by the client
///
/// Scoped to one sync invocation: the orchestrator resets them at the start
/// of each category sync and snapshots them at the end.
#[derive(Debug, Default)]
struct ApiStats {
    http_requests: AtomicU64,
    retries: AtomicU64,
}

/// Ozon seller API client
///
/// Issues authenticated JSON POST requests and retries transient failures
/// (HTTP 429, HTTP 5xx, connection-level errors) with exponential backoff.
#[derive(Debug)]
pub struct OzonClient {
    http: Client,
    base_url: String,
    client_id: String,
    api_key: String,
    retry: RetryConfig,
    stats: ApiStats,
}

impl OzonClient {
    /// Create a new client from configuration
    pub fn new(api: &ApiConfig, retry: RetryConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            client_id: api.client_id.clone(),
            api_key: api.api_key.clone(),
            retry,
            stats: ApiStats::default(),
        })
    }

    /// Issue a POST request, retrying transient failures
    ///
    /// Returns the parsed JSON body on success. Non-retryable failures and
    /// retry-budget exhaustion surface the last error unchanged.
    pub async fn request(&self, endpoint: &str, body: &Value) -> Result<Value, ApiError> {
        let mut attempt = 1u32;

        loop {
            match self.send(endpoint, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt <= self.retry.max_retries => {
                    self.stats.retries.fetch_add(1, Ordering::Relaxed);
                    let wait = self.backoff_delay(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.retry.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "Retrying after transient API error"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Backoff duration before the retry following the given attempt
    ///
    /// Attempts are counted from 1: base, base*2, base*4, ...
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry.backoff_base_ms.saturating_mul(multiplier))
    }

    /// Snapshot of the diagnostic counters
    pub fn stats(&self) -> ApiStatsSnapshot {
        ApiStatsSnapshot {
            http_requests: self.stats.http_requests.load(Ordering::Relaxed),
            retries: self.stats.retries.load(Ordering::Relaxed),
        }
    }

    /// Reset the diagnostic counters to zero
    pub fn reset_stats(&self) {
        self.stats.http_requests.store(0, Ordering::Relaxed);
        self.stats.retries.store(0, Ordering::Relaxed);
    }

    /// Issue a single attempt and classify the response
    async fn send(&self, endpoint: &str, body: &Value) -> Result<Value, ApiError> {
        self.stats.http_requests.fetch_add(1, Ordering::Relaxed);

        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ApiError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidData(e.to_string()))
    }
}

/// Map reqwest transport errors into the API error taxonomy
fn classify_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::NetworkTimeout
    } else if err.is_connect() {
        ApiError::ConnectionRefused
    } else {
        ApiError::Network(err.to_string())
    }
}
