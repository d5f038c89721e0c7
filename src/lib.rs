//! ozon-sync - Batch synchronization of Ozon seller orders into a relational store
//!
//! This crate fetches FBO and FBS postings from the Ozon seller API for a
//! trailing date window, normalizes the nested JSON payloads into flat order
//! and product rows, and upserts them idempotently while recording run-level
//! telemetry.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod sync;
