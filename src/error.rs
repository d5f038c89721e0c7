//! Application error types for ozon-sync
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Errors returned by the Ozon seller API client
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Rate limited by the API (HTTP 429)
    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    /// Server-side error (HTTP 5xx)
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Network timeout
    #[error("Network timeout")]
    NetworkTimeout,

    /// Connection refused or reset
    #[error("Connection refused")]
    ConnectionRefused,

    /// Generic network error
    #[error("Network error: {0}")]
    Network(String),

    /// Terminal non-success response (carries status and body text)
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Response body could not be parsed
    #[error("Invalid response data: {0}")]
    InvalidData(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection-level error (closed pool, lost worker)
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Record not found
    #[error("Record not found")]
    NotFound,
}

impl From<tokio_rusqlite::Error> for DbError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => DbError::Sqlite(e),
            other => DbError::Connection(other.to_string()),
        }
    }
}

/// Application-level error type
///
/// This is the main error type used at the orchestrator boundary.
/// It aggregates all domain-specific error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for determining if an error is retryable
pub trait RetryableError {
    /// Returns true if the error is retryable
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ApiError {
    fn is_retryable(&self) -> bool {
        match self {
            // Retryable errors
            ApiError::RateLimited => true,
            ApiError::ServerError(code) => *code >= 500,
            ApiError::NetworkTimeout => true,
            ApiError::ConnectionRefused => true,
            ApiError::Network(_) => true,

            // Non-retryable errors
            ApiError::Status { .. } => false,
            ApiError::InvalidData(_) => false,
        }
    }
}
