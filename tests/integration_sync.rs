//! Integration tests for the full sync flow
//!
//! These run the orchestrator end to end against a mock API server and a
//! real in-memory SQLite database.

mod common;

use std::sync::Arc;

use ozon_sync::database::Database;
use ozon_sync::models::{PostingCategory, SyncRunStatus};
use ozon_sync::sync::OrderSyncer;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

// Test 1: A full sync stores orders and products from both categories
#[tokio::test]
async fn test_full_sync_stores_orders() {
    let mock_server = MockServer::start().await;
    mount_fbo(
        &mock_server,
        vec![
            sample_posting("fbo-1-1", 101),
            sample_posting("fbo-2-1", 102),
        ],
    )
    .await;
    mount_fbs(&mock_server, vec![sample_posting("fbs-1-1", 201)]).await;

    let db = create_test_database().await;
    let syncer = OrderSyncer::new(
        Arc::clone(&db),
        create_test_client(&mock_server.uri(), 2),
        fast_request_config(),
        7,
    );

    let summary = syncer.sync_all_orders().await.unwrap();

    assert_eq!(summary.fbo.orders_fetched, 2);
    assert_eq!(summary.fbo.orders_inserted, 2);
    assert_eq!(summary.fbs.orders_fetched, 1);
    assert_eq!(summary.total().products_count, 3);

    assert_eq!(db.count_orders(PostingCategory::Fbo).await.unwrap(), 2);
    assert_eq!(db.count_orders(PostingCategory::Fbs).await.unwrap(), 1);

    let order = db.get_order("fbo-1-1").await.unwrap().unwrap();
    assert_eq!(order.customer_city.as_deref(), Some("Moscow"));
    assert_eq!(order.warehouse_id, Some(555));

    let products = db.get_order_products("fbs-1-1").await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, 201);
    assert_eq!(products[0].price, 500.0);
    assert_eq!(products[0].commission_amount, Some(45.5));
}

// Test 2: Re-running the same sync is idempotent
#[tokio::test]
async fn test_sync_is_idempotent() {
    let mock_server = MockServer::start().await;
    mount_fbo(&mock_server, vec![sample_posting("fbo-1-1", 101)]).await;
    mount_fbs(&mock_server, vec![]).await;

    let db = create_test_database().await;
    let syncer = OrderSyncer::new(
        Arc::clone(&db),
        create_test_client(&mock_server.uri(), 2),
        fast_request_config(),
        7,
    );

    let first = syncer.sync_all_orders().await.unwrap();
    let second = syncer.sync_all_orders().await.unwrap();

    assert_eq!(first.fbo.orders_inserted, 1);
    assert_eq!(second.fbo.orders_inserted, 0);
    assert_eq!(second.fbo.orders_updated, 1);
    assert_eq!(db.count_orders(PostingCategory::Fbo).await.unwrap(), 1);
}

// Test 3: Transient server errors are retried and recorded in the run log
#[tokio::test]
async fn test_retries_recorded_in_sync_log() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/posting/fbo/list"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_fbo(&mock_server, vec![sample_posting("fbo-1-1", 101)]).await;
    mount_fbs(&mock_server, vec![]).await;

    let db = create_test_database().await;
    let syncer = OrderSyncer::new(
        Arc::clone(&db),
        create_test_client(&mock_server.uri(), 2),
        fast_request_config(),
        7,
    );

    let summary = syncer.sync_all_orders().await.unwrap();
    assert_eq!(summary.fbo.orders_fetched, 1);

    // FBO is the first run record
    let log = db.get_sync_log(1).await.unwrap().unwrap();
    assert_eq!(log.posting_type, PostingCategory::Fbo);
    assert_eq!(log.status, SyncRunStatus::Success);
    assert_eq!(log.orders_fetched, 1);
    assert!(log.retries >= 1);
    assert!(log.http_requests >= 2);
    assert!(log.job_end.is_some());
}

// Test 4: A terminal API failure on one category leaves the other intact
#[tokio::test]
async fn test_category_failure_is_isolated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/posting/fbo/list"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;
    mount_fbs(&mock_server, vec![sample_posting("fbs-1-1", 201)]).await;

    let db = create_test_database().await;
    let syncer = OrderSyncer::new(
        Arc::clone(&db),
        create_test_client(&mock_server.uri(), 2),
        fast_request_config(),
        7,
    );

    let summary = syncer.sync_all_orders().await.unwrap();

    assert_eq!(summary.fbo.orders_fetched, 0);
    assert_eq!(summary.fbs.orders_fetched, 1);
    assert_eq!(db.count_orders(PostingCategory::Fbs).await.unwrap(), 1);

    let fbo_log = db.get_sync_log(1).await.unwrap().unwrap();
    assert_eq!(fbo_log.status, SyncRunStatus::Failed);
    assert!(fbo_log
        .error_message
        .as_deref()
        .is_some_and(|m| m.contains("invalid api key")));

    let fbs_log = db.get_sync_log(2).await.unwrap().unwrap();
    assert_eq!(fbs_log.status, SyncRunStatus::Success);
}

// Test 5: Pagination walks multiple pages before storing everything
#[tokio::test]
async fn test_multi_page_sync() {
    let mock_server = MockServer::start().await;

    // Page size 2: a full first page, then an under-limit second page
    Mock::given(method("POST"))
        .and(path("/v2/posting/fbo/list"))
        .and(wiremock::matchers::body_partial_json(json!({ "offset": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [sample_posting("fbo-1-1", 101), sample_posting("fbo-2-1", 102)]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/posting/fbo/list"))
        .and(wiremock::matchers::body_partial_json(json!({ "offset": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [sample_posting("fbo-3-1", 103)]
        })))
        .mount(&mock_server)
        .await;
    mount_fbs(&mock_server, vec![]).await;

    let db = create_test_database().await;
    let mut request = fast_request_config();
    request.limit = 2;
    let syncer = OrderSyncer::new(
        Arc::clone(&db),
        create_test_client(&mock_server.uri(), 2),
        request,
        7,
    );

    let summary = syncer.sync_all_orders().await.unwrap();

    assert_eq!(summary.fbo.orders_fetched, 3);
    assert_eq!(db.count_orders(PostingCategory::Fbo).await.unwrap(), 3);
}
