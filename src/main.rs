//! ozon-sync - Batch synchronization of Ozon seller orders into SQLite
//!
//! This is the main entry point for the ozon-sync application.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ozon_sync::api::OzonClient;
use ozon_sync::config::Config;
use ozon_sync::database::SqliteDatabase;
use ozon_sync::models::{CategoryCounts, SyncSummary};
use ozon_sync::sync::OrderSyncer;

/// ozon-sync - Batch synchronization of Ozon seller orders into SQLite
#[derive(Parser, Debug)]
#[command(name = "ozon-sync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "OZON_SYNC_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(&args)?;

    // Initialize tracing/logging
    init_tracing(&config.logging.level, &config.logging.format);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ozon-sync");

    // Initialize database
    let database = SqliteDatabase::new(&config.database.path).await?;
    let database = Arc::new(database);
    info!(path = %config.database.path, "Database initialized");

    // Initialize API client
    let client = Arc::new(OzonClient::new(
        &config.api,
        config.request.retry.clone(),
    )?);

    // Run the sync
    let syncer = OrderSyncer::new(
        database,
        client,
        config.request.clone(),
        config.sync.days_to_fetch,
    );
    let summary = syncer.sync_all_orders().await?;

    print_summary(&summary);

    info!("ozon-sync complete");
    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
        }
        None => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
        }
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Initialize the tracing subscriber
fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Print the run summary to stdout
fn print_summary(summary: &SyncSummary) {
    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("Sync finished");
    println!(
        "Period: {} .. {}",
        summary.date_from.format("%Y-%m-%d %H:%M:%S"),
        summary.date_to.format("%Y-%m-%d %H:%M:%S")
    );
    print_category("FBO", &summary.fbo);
    print_category("FBS", &summary.fbs);
    let total = summary.total();
    println!(
        "Total: {} orders ({} new, {} updated), {} product lines",
        total.orders_fetched, total.orders_inserted, total.orders_updated, total.products_count
    );
    println!("{}", separator);
}

fn print_category(name: &str, counts: &CategoryCounts) {
    println!(
        "{}: fetched {}, new {}, updated {}, products {}",
        name,
        counts.orders_fetched,
        counts.orders_inserted,
        counts.orders_updated,
        counts.products_count
    );
}
