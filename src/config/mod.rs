//! Configuration management for ozon-sync
//!
//! This module handles loading, parsing, and validating application
//! configuration from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Ozon seller API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Request pagination and retry configuration
    #[serde(default)]
    pub request: RequestConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Sync window configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // First, expand environment variables in the YAML string
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix OZON_SYNC_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("OZON_SYNC_API_URL") {
            config.api.base_url = url;
        }
        if let Ok(client_id) = std::env::var("OZON_SYNC_CLIENT_ID") {
            config.api.client_id = client_id;
        }
        if let Ok(api_key) = std::env::var("OZON_SYNC_API_KEY") {
            config.api.api_key = api_key;
        }

        if let Ok(limit) = std::env::var("OZON_SYNC_REQUEST_LIMIT") {
            config.request.limit = limit
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid request limit".to_string()))?;
        }
        if let Ok(delay) = std::env::var("OZON_SYNC_PAGE_DELAY_MS") {
            config.request.page_delay_ms = delay
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid page delay".to_string()))?;
        }
        if let Ok(retries) = std::env::var("OZON_SYNC_MAX_RETRIES") {
            config.request.retry.max_retries = retries
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid max retries".to_string()))?;
        }
        if let Ok(backoff) = std::env::var("OZON_SYNC_RETRY_BACKOFF_MS") {
            config.request.retry.backoff_base_ms = backoff
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid retry backoff".to_string()))?;
        }

        if let Ok(path) = std::env::var("OZON_SYNC_DATABASE_PATH") {
            config.database.path = path;
        }

        if let Ok(days) = std::env::var("OZON_SYNC_DAYS_TO_FETCH") {
            config.sync.days_to_fetch = days
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid days to fetch".to_string()))?;
        }

        if let Ok(level) = std::env::var("OZON_SYNC_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("OZON_SYNC_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Validate that required configuration is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.client_id.is_empty() {
            return Err(ConfigError::MissingRequired("api.client_id".to_string()));
        }
        if self.api.api_key.is_empty() {
            return Err(ConfigError::MissingRequired("api.api_key".to_string()));
        }
        if self.request.limit == 0 {
            return Err(ConfigError::InvalidValue(
                "request.limit must be positive".to_string(),
            ));
        }
        if self.sync.days_to_fetch == 0 {
            return Err(ConfigError::InvalidValue(
                "sync.days_to_fetch must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ozon seller API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the seller API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-Id credential header value
    #[serde(default)]
    pub client_id: String,

    /// Api-Key credential header value
    #[serde(default)]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api-seller.ozon.ru".to_string()
}

/// Request pagination and retry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestConfig {
    /// Page size for posting list requests
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Delay between consecutive page requests in milliseconds
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            page_delay_ms: default_page_delay(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_limit() -> u32 {
    100
}

fn default_page_delay() -> u64 {
    500
}

/// Retry configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff duration in milliseconds; doubled on each retry
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "/data/db/ozon-sync.db".to_string()
}

/// Sync window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Number of trailing days to fetch (excluding the current day)
    #[serde(default = "default_days_to_fetch")]
    pub days_to_fetch: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            days_to_fetch: default_days_to_fetch(),
        }
    }
}

fn default_days_to_fetch() -> u32 {
    7
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
