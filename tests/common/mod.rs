//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use ozon_sync::api::OzonClient;
use ozon_sync::config::{ApiConfig, RequestConfig, RetryConfig};
use ozon_sync::database::SqliteDatabase;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create an in-memory database for testing
pub async fn create_test_database() -> Arc<SqliteDatabase> {
    Arc::new(
        SqliteDatabase::new(":memory:")
            .await
            .expect("Failed to create test database"),
    )
}

/// Create an API client pointed at a mock server, with instant retries
pub fn create_test_client(uri: &str, max_retries: u32) -> Arc<OzonClient> {
    Arc::new(
        OzonClient::new(
            &ApiConfig {
                base_url: uri.to_string(),
                client_id: "test-client".to_string(),
                api_key: "test-key".to_string(),
            },
            RetryConfig {
                max_retries,
                backoff_base_ms: 0,
            },
        )
        .expect("Failed to create test client"),
    )
}

/// Request settings without inter-page delays
pub fn fast_request_config() -> RequestConfig {
    RequestConfig {
        limit: 100,
        page_delay_ms: 0,
        retry: RetryConfig {
            max_retries: 2,
            backoff_base_ms: 0,
        },
    }
}

/// Build a realistic posting payload
pub fn sample_posting(posting_number: &str, sku: i64) -> Value {
    json!({
        "posting_number": posting_number,
        "order_id": 900_000,
        "order_number": posting_number.trim_end_matches("-1"),
        "status": "awaiting_deliver",
        "created_at": "2026-08-20T10:15:30.000Z",
        "in_process_at": "2026-08-20T10:16:00.000Z",
        "delivery_method": {
            "id": 1020,
            "name": "Courier",
            "warehouse_id": 555,
            "warehouse_name": "Main WH",
            "tpl_provider_id": 24
        },
        "analytics_data": {
            "city": "Moscow",
            "region": "Moscow Region"
        },
        "financial_data": {
            "products": [{
                "product_id": sku,
                "commission_amount": 45.5,
                "commission_percent": 9.1,
                "payout": 454.5
            }]
        },
        "products": [{
            "sku": sku,
            "name": "Widget",
            "offer_id": "W-1",
            "quantity": 2,
            "price": "500.00",
            "currency_code": "RUB"
        }]
    })
}

/// Mount a single-page FBO response
pub async fn mount_fbo(server: &MockServer, postings: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/v2/posting/fbo/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": postings })))
        .mount(server)
        .await;
}

/// Mount a single-page FBS response in the nested envelope
pub async fn mount_fbs(server: &MockServer, postings: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/v3/posting/fbs/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": { "postings": postings } })),
        )
        .mount(server)
        .await;
}
