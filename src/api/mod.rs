//! Ozon seller API integration
//!
//! This module provides the authenticated HTTP client with retry and backoff,
//! the pure payload normalizer, and the paginated posting fetch stream.
//!
//! # Components
//!
//! - [`client`]: authenticated POST client with exponential-backoff retry and
//!   per-invocation request/retry counters
//! - [`normalize`]: pure transforms from raw posting JSON into flat rows
//! - [`postings`]: lazy paginated stream of normalized postings per category

pub mod client;
pub mod normalize;
pub mod postings;

// Re-export main types for convenience
pub use client::{ApiStatsSnapshot, OzonClient};
pub use normalize::FetchedPosting;
pub use postings::fetch_postings;
