//! SQLite implementation of the Database trait
//!
//! This module provides a SQLite-based implementation of the Database trait
//! using rusqlite and tokio-rusqlite for async operations.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::migrations::CREATE_SCHEMA;
use super::Database;
use crate::error::DbError;
use crate::models::{
    Order, OrderProduct, PostingCategory, SyncLog, SyncLogPatch, SyncRunStatus, TplIntegration,
};

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for in-memory database or a file path for persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        // Run migrations
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // =========================================================================
    // Order operations
    // =========================================================================

    async fn upsert_order(&self, order: &Order) -> Result<bool, DbError> {
        let order = order.clone();

        let inserted = self
            .conn
            .call(move |conn| {
                let existed: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM orders WHERE posting_number = ?1)",
                    [&order.posting_number],
                    |row| row.get(0),
                )?;

                let now = Utc::now().to_rfc3339();
                conn.execute(
                    r#"
                    INSERT INTO orders (
                        posting_number, order_id, order_number, posting_type,
                        status, substatus, cancel_reason_id,
                        created_at, in_process_at, shipment_date, delivering_date,
                        warehouse_id, warehouse_name, tracking_number,
                        tpl_integration_type, delivery_method_id, delivery_method_name,
                        customer_city, customer_region,
                        financial_data, analytics_data, raw_data,
                        synced_at, updated_at
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                            ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?23)
                    ON CONFLICT(posting_number) DO UPDATE SET
                        status = excluded.status,
                        substatus = excluded.substatus,
                        created_at = COALESCE(orders.created_at, excluded.created_at),
                        in_process_at = excluded.in_process_at,
                        shipment_date = excluded.shipment_date,
                        delivering_date = excluded.delivering_date,
                        tracking_number = excluded.tracking_number,
                        customer_city = COALESCE(orders.customer_city, excluded.customer_city),
                        customer_region = COALESCE(orders.customer_region, excluded.customer_region),
                        financial_data = excluded.financial_data,
                        analytics_data = excluded.analytics_data,
                        raw_data = excluded.raw_data,
                        updated_at = excluded.updated_at
                    "#,
                    rusqlite::params![
                        order.posting_number,
                        order.order_id,
                        order.order_number,
                        order.posting_type.as_str(),
                        order.status,
                        order.substatus,
                        order.cancel_reason_id,
                        order.created_at.map(|dt| dt.to_rfc3339()),
                        order.in_process_at.map(|dt| dt.to_rfc3339()),
                        order.shipment_date.map(|dt| dt.to_rfc3339()),
                        order.delivering_date.map(|dt| dt.to_rfc3339()),
                        order.warehouse_id,
                        order.warehouse_name,
                        order.tracking_number,
                        order.tpl_integration_type.as_str(),
                        order.delivery_method_id,
                        order.delivery_method_name,
                        order.customer_city,
                        order.customer_region,
                        order.financial_data.as_ref().map(|v| v.to_string()),
                        order.analytics_data.as_ref().map(|v| v.to_string()),
                        order.raw_data.to_string(),
                        now,
                    ],
                )?;

                Ok(!existed)
            })
            .await?;

        Ok(inserted)
    }

    async fn upsert_order_products(
        &self,
        posting_number: &str,
        products: &[OrderProduct],
    ) -> Result<(), DbError> {
        let posting_number = posting_number.to_string();
        let products = products.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for product in &products {
                    tx.execute(
                        r#"
                        INSERT INTO order_products (
                            posting_number, sku, name, offer_id, quantity, price,
                            currency_code, commission_amount, commission_percent,
                            payout, product_id, mandatory_mark,
                            height, length, width, weight
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                                ?13, ?14, ?15, ?16)
                        ON CONFLICT(posting_number, sku) DO UPDATE SET
                            quantity = excluded.quantity,
                            price = excluded.price,
                            commission_amount = excluded.commission_amount,
                            payout = excluded.payout
                        "#,
                        rusqlite::params![
                            posting_number,
                            product.sku,
                            product.name,
                            product.offer_id,
                            product.quantity,
                            product.price,
                            product.currency_code,
                            product.commission_amount,
                            product.commission_percent,
                            product.payout,
                            product.product_id,
                            product.mandatory_mark.as_ref().map(|v| v.to_string()),
                            product.height,
                            product.length,
                            product.width,
                            product.weight,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn get_order(&self, posting_number: &str) -> Result<Option<Order>, DbError> {
        let posting_number = posting_number.to_string();

        let order = self
            .conn
            .call(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT posting_number, order_id, order_number, posting_type,
                               status, substatus, cancel_reason_id,
                               created_at, in_process_at, shipment_date, delivering_date,
                               warehouse_id, warehouse_name, tracking_number,
                               tpl_integration_type, delivery_method_id, delivery_method_name,
                               customer_city, customer_region,
                               financial_data, analytics_data, raw_data
                        FROM orders WHERE posting_number = ?1
                        "#,
                        [&posting_number],
                        |row| {
                            Ok(Order {
                                posting_number: row.get(0)?,
                                order_id: row.get(1)?,
                                order_number: row.get(2)?,
                                posting_type: PostingCategory::from_str(
                                    &row.get::<_, String>(3)?,
                                )
                                .unwrap_or(PostingCategory::Fbo),
                                status: row.get(4)?,
                                substatus: row.get(5)?,
                                cancel_reason_id: row.get(6)?,
                                created_at: parse_datetime(row.get::<_, Option<String>>(7)?),
                                in_process_at: parse_datetime(row.get::<_, Option<String>>(8)?),
                                shipment_date: parse_datetime(row.get::<_, Option<String>>(9)?),
                                delivering_date: parse_datetime(
                                    row.get::<_, Option<String>>(10)?,
                                ),
                                warehouse_id: row.get(11)?,
                                warehouse_name: row.get(12)?,
                                tracking_number: row.get(13)?,
                                tpl_integration_type: row
                                    .get::<_, Option<String>>(14)?
                                    .and_then(|s| TplIntegration::from_str(&s).ok())
                                    .unwrap_or(TplIntegration::Ozon),
                                delivery_method_id: row.get(15)?,
                                delivery_method_name: row.get(16)?,
                                customer_city: row.get(17)?,
                                customer_region: row.get(18)?,
                                financial_data: parse_json(row.get::<_, Option<String>>(19)?),
                                analytics_data: parse_json(row.get::<_, Option<String>>(20)?),
                                raw_data: parse_json(row.get::<_, Option<String>>(21)?)
                                    .unwrap_or(serde_json::Value::Null),
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await?;

        Ok(order)
    }

    async fn get_order_products(
        &self,
        posting_number: &str,
    ) -> Result<Vec<OrderProduct>, DbError> {
        let posting_number = posting_number.to_string();

        let products = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT sku, name, offer_id, quantity, price, currency_code,
                           commission_amount, commission_percent, payout,
                           product_id, mandatory_mark, height, length, width, weight
                    FROM order_products WHERE posting_number = ?1 ORDER BY sku
                    "#,
                )?;
                let rows = stmt
                    .query_map([&posting_number], |row| {
                        Ok(OrderProduct {
                            sku: row.get(0)?,
                            name: row.get(1)?,
                            offer_id: row.get(2)?,
                            quantity: row.get(3)?,
                            price: row.get(4)?,
                            currency_code: row.get(5)?,
                            commission_amount: row.get(6)?,
                            commission_percent: row.get(7)?,
                            payout: row.get(8)?,
                            product_id: row.get(9)?,
                            mandatory_mark: parse_json(row.get::<_, Option<String>>(10)?),
                            height: row.get(11)?,
                            length: row.get(12)?,
                            width: row.get(13)?,
                            weight: row.get(14)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(products)
    }

    async fn count_orders(&self, category: PostingCategory) -> Result<u64, DbError> {
        let category = category.as_str();

        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM orders WHERE posting_type = ?1",
                    [category],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;

        Ok(count as u64)
    }

    // =========================================================================
    // Sync log operations
    // =========================================================================

    async fn create_sync_log(
        &self,
        job_start: DateTime<Utc>,
        category: PostingCategory,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO sync_log (job_start, posting_type, date_from, date_to, status)
                    VALUES (?1, ?2, ?3, ?4, 'running')
                    "#,
                    rusqlite::params![
                        job_start.to_rfc3339(),
                        category.as_str(),
                        date_from.to_rfc3339(),
                        date_to.to_rfc3339(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        Ok(id)
    }

    async fn update_sync_log(&self, id: i64, patch: &SyncLogPatch) -> Result<(), DbError> {
        if patch.is_empty() {
            return Ok(());
        }

        // Build the SET clause from the populated patch fields
        let mut fields: Vec<(&'static str, SqlValue)> = Vec::new();
        if let Some(job_end) = patch.job_end {
            fields.push(("job_end", SqlValue::Text(job_end.to_rfc3339())));
        }
        if let Some(status) = patch.status {
            fields.push(("status", SqlValue::Text(status.as_str().to_string())));
        }
        if let Some(n) = patch.orders_fetched {
            fields.push(("orders_fetched", SqlValue::Integer(n as i64)));
        }
        if let Some(n) = patch.orders_inserted {
            fields.push(("orders_inserted", SqlValue::Integer(n as i64)));
        }
        if let Some(n) = patch.orders_updated {
            fields.push(("orders_updated", SqlValue::Integer(n as i64)));
        }
        if let Some(n) = patch.products_count {
            fields.push(("products_count", SqlValue::Integer(n as i64)));
        }
        if let Some(n) = patch.http_requests {
            fields.push(("http_requests", SqlValue::Integer(n as i64)));
        }
        if let Some(n) = patch.retries {
            fields.push(("retries", SqlValue::Integer(n as i64)));
        }
        if let Some(ref message) = patch.error_message {
            fields.push(("error_message", SqlValue::Text(message.clone())));
        }

        self.conn
            .call(move |conn| {
                let set_clause = fields
                    .iter()
                    .enumerate()
                    .map(|(i, (name, _))| format!("{} = ?{}", name, i + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!("UPDATE sync_log SET {} WHERE id = ?1", set_clause);

                let mut params: Vec<SqlValue> = vec![SqlValue::Integer(id)];
                params.extend(fields.into_iter().map(|(_, value)| value));

                conn.execute(&sql, rusqlite::params_from_iter(params))?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>, DbError> {
        let log = self
            .conn
            .call(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, job_start, job_end, posting_type, date_from, date_to,
                               status, orders_fetched, orders_inserted, orders_updated,
                               products_count, http_requests, retries, error_message
                        FROM sync_log WHERE id = ?1
                        "#,
                        [id],
                        |row| {
                            Ok(SyncLog {
                                id: row.get(0)?,
                                job_start: parse_datetime(row.get::<_, Option<String>>(1)?)
                                    .unwrap_or_else(Utc::now),
                                job_end: parse_datetime(row.get::<_, Option<String>>(2)?),
                                posting_type: PostingCategory::from_str(
                                    &row.get::<_, String>(3)?,
                                )
                                .unwrap_or(PostingCategory::Fbo),
                                date_from: parse_datetime(row.get::<_, Option<String>>(4)?)
                                    .unwrap_or_else(Utc::now),
                                date_to: parse_datetime(row.get::<_, Option<String>>(5)?)
                                    .unwrap_or_else(Utc::now),
                                status: SyncRunStatus::from_str(&row.get::<_, String>(6)?)
                                    .unwrap_or(SyncRunStatus::Running),
                                orders_fetched: row.get::<_, i64>(7)? as u64,
                                orders_inserted: row.get::<_, i64>(8)? as u64,
                                orders_updated: row.get::<_, i64>(9)? as u64,
                                products_count: row.get::<_, i64>(10)? as u64,
                                http_requests: row.get::<_, i64>(11)? as u64,
                                retries: row.get::<_, i64>(12)? as u64,
                                error_message: row.get(13)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await?;

        Ok(log)
    }
}

/// Parse a datetime from SQLite storage
fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // Try parsing SQLite's datetime format
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    })
}

/// Parse a JSON blob column, tolerating absent or corrupt values
fn parse_json(s: Option<String>) -> Option<serde_json::Value> {
    s.and_then(|s| serde_json::from_str(&s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_order(posting_number: &str) -> Order {
        Order {
            posting_number: posting_number.to_string(),
            order_id: Some(1001),
            order_number: Some("1001-A".to_string()),
            posting_type: PostingCategory::Fbs,
            status: Some("awaiting_deliver".to_string()),
            substatus: None,
            cancel_reason_id: None,
            created_at: Some("2026-08-20T10:00:00Z".parse().unwrap()),
            in_process_at: None,
            shipment_date: None,
            delivering_date: None,
            warehouse_id: Some(555),
            warehouse_name: Some("Main WH".to_string()),
            tracking_number: Some("TRACK1".to_string()),
            tpl_integration_type: TplIntegration::Tpl,
            delivery_method_id: Some(1020),
            delivery_method_name: Some("Courier".to_string()),
            customer_city: Some("Moscow".to_string()),
            customer_region: Some("Moscow Region".to_string()),
            financial_data: Some(json!({ "products": [] })),
            analytics_data: Some(json!({ "city": "Moscow" })),
            raw_data: json!({ "posting_number": posting_number }),
        }
    }

    fn sample_product(sku: i64) -> OrderProduct {
        OrderProduct {
            sku,
            name: Some("Widget".to_string()),
            offer_id: Some("W-1".to_string()),
            quantity: 1,
            price: 500.0,
            currency_code: Some("RUB".to_string()),
            commission_amount: Some(45.5),
            commission_percent: Some(9.1),
            payout: Some(454.5),
            product_id: Some(sku),
            mandatory_mark: None,
            height: Some(100.0),
            length: None,
            width: None,
            weight: Some(350.0),
        }
    }

    // Test 1: First upsert inserts and returns true; second returns false
    #[tokio::test]
    async fn test_upsert_order_insert_then_update() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let order = sample_order("A-1");

        assert!(db.upsert_order(&order).await.unwrap());
        assert!(!db.upsert_order(&order).await.unwrap());
        assert_eq!(db.count_orders(PostingCategory::Fbs).await.unwrap(), 1);
    }

    // Test 2: Round trip preserves the order fields and JSON blobs
    #[tokio::test]
    async fn test_order_round_trip() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let order = sample_order("A-2");
        db.upsert_order(&order).await.unwrap();

        let stored = db.get_order("A-2").await.unwrap().unwrap();
        assert_eq!(stored, order);

        assert!(db.get_order("missing").await.unwrap().is_none());
    }

    // Test 3: Re-upsert keeps the original created_at and customer location
    #[tokio::test]
    async fn test_upsert_first_write_wins_fields() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let original = sample_order("A-3");
        db.upsert_order(&original).await.unwrap();

        let mut updated = original.clone();
        updated.created_at = Some("2026-08-25T00:00:00Z".parse().unwrap());
        updated.customer_city = Some("Kazan".to_string());
        updated.customer_region = Some("Tatarstan".to_string());
        updated.status = Some("delivered".to_string());
        db.upsert_order(&updated).await.unwrap();

        let stored = db.get_order("A-3").await.unwrap().unwrap();
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.customer_city, original.customer_city);
        assert_eq!(stored.customer_region, original.customer_region);
        // Mutable fields still advance
        assert_eq!(stored.status.as_deref(), Some("delivered"));
    }

    // Test 4: A null created_at fills in on a later sync
    #[tokio::test]
    async fn test_upsert_fills_missing_created_at() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let mut order = sample_order("A-4");
        order.created_at = None;
        order.customer_city = None;
        db.upsert_order(&order).await.unwrap();

        order.created_at = Some("2026-08-20T10:00:00Z".parse().unwrap());
        order.customer_city = Some("Moscow".to_string());
        db.upsert_order(&order).await.unwrap();

        let stored = db.get_order("A-4").await.unwrap().unwrap();
        assert_eq!(stored.created_at, order.created_at);
        assert_eq!(stored.customer_city.as_deref(), Some("Moscow"));
    }

    // Test 5: Warehouse and delivery identity are write-once on conflict
    #[tokio::test]
    async fn test_upsert_preserves_delivery_identity() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let original = sample_order("A-10");
        db.upsert_order(&original).await.unwrap();

        // Later payload without the delivery sub-object
        let mut stripped = original.clone();
        stripped.order_id = None;
        stripped.order_number = None;
        stripped.warehouse_id = None;
        stripped.warehouse_name = None;
        stripped.tpl_integration_type = TplIntegration::Ozon;
        stripped.delivery_method_id = None;
        stripped.delivery_method_name = None;
        db.upsert_order(&stripped).await.unwrap();

        let stored = db.get_order("A-10").await.unwrap().unwrap();
        assert_eq!(stored.order_id, original.order_id);
        assert_eq!(stored.order_number, original.order_number);
        assert_eq!(stored.warehouse_id, Some(555));
        assert_eq!(stored.warehouse_name.as_deref(), Some("Main WH"));
        assert_eq!(stored.tpl_integration_type, TplIntegration::Tpl);
        assert_eq!(stored.delivery_method_id, Some(1020));
        assert_eq!(stored.delivery_method_name.as_deref(), Some("Courier"));
    }

    // Test 6: Product conflict updates only quantity, price, commission, payout
    #[tokio::test]
    async fn test_product_conflict_field_subset() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.upsert_order(&sample_order("A-5")).await.unwrap();
        db.upsert_order_products("A-5", &[sample_product(7)])
            .await
            .unwrap();

        let mut changed = sample_product(7);
        changed.quantity = 3;
        changed.price = 450.0;
        changed.commission_amount = Some(40.0);
        changed.payout = Some(410.0);
        changed.name = Some("Renamed".to_string());
        changed.commission_percent = Some(8.0);
        db.upsert_order_products("A-5", &[changed]).await.unwrap();

        let stored = &db.get_order_products("A-5").await.unwrap()[0];
        assert_eq!(stored.quantity, 3);
        assert_eq!(stored.price, 450.0);
        assert_eq!(stored.commission_amount, Some(40.0));
        assert_eq!(stored.payout, Some(410.0));
        // Fields outside the update list keep their first value
        assert_eq!(stored.name.as_deref(), Some("Widget"));
        assert_eq!(stored.commission_percent, Some(9.1));
    }

    // Test 7: Sync log lifecycle from running to success
    #[tokio::test]
    async fn test_sync_log_lifecycle() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let start: DateTime<Utc> = "2026-08-26T03:00:00Z".parse().unwrap();
        let from: DateTime<Utc> = "2026-08-19T00:00:00Z".parse().unwrap();
        let to: DateTime<Utc> = "2026-08-25T23:59:59Z".parse().unwrap();

        let id = db
            .create_sync_log(start, PostingCategory::Fbo, from, to)
            .await
            .unwrap();

        let created = db.get_sync_log(id).await.unwrap().unwrap();
        assert_eq!(created.status, SyncRunStatus::Running);
        assert_eq!(created.posting_type, PostingCategory::Fbo);
        assert_eq!(created.job_end, None);
        assert_eq!(created.orders_fetched, 0);

        let patch = SyncLogPatch {
            job_end: Some("2026-08-26T03:01:00Z".parse().unwrap()),
            status: Some(SyncRunStatus::Success),
            orders_fetched: Some(25),
            orders_inserted: Some(20),
            orders_updated: Some(5),
            products_count: Some(40),
            http_requests: Some(3),
            retries: Some(1),
            error_message: None,
        };
        db.update_sync_log(id, &patch).await.unwrap();

        let finished = db.get_sync_log(id).await.unwrap().unwrap();
        assert_eq!(finished.status, SyncRunStatus::Success);
        assert_eq!(finished.orders_fetched, 25);
        assert_eq!(finished.orders_inserted, 20);
        assert_eq!(finished.orders_updated, 5);
        assert_eq!(finished.products_count, 40);
        assert_eq!(finished.http_requests, 3);
        assert_eq!(finished.retries, 1);
        assert!(finished.job_end.is_some());
    }

    // Test 8: A sparse patch leaves unset fields untouched
    #[tokio::test]
    async fn test_sync_log_sparse_patch() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let now = Utc::now();
        let id = db
            .create_sync_log(now, PostingCategory::Fbs, now, now)
            .await
            .unwrap();

        db.update_sync_log(
            id,
            &SyncLogPatch {
                orders_fetched: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let log = db.get_sync_log(id).await.unwrap().unwrap();
        assert_eq!(log.orders_fetched, 10);
        assert_eq!(log.status, SyncRunStatus::Running);
        assert_eq!(log.job_end, None);
    }

    // Test 9: An empty patch is a no-op
    #[tokio::test]
    async fn test_sync_log_empty_patch() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let now = Utc::now();
        let id = db
            .create_sync_log(now, PostingCategory::Fbo, now, now)
            .await
            .unwrap();

        db.update_sync_log(id, &SyncLogPatch::default())
            .await
            .unwrap();

        let log = db.get_sync_log(id).await.unwrap().unwrap();
        assert_eq!(log.status, SyncRunStatus::Running);
    }

    // Test 10: Failure patch records the error message
    #[tokio::test]
    async fn test_sync_log_failure() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let now = Utc::now();
        let id = db
            .create_sync_log(now, PostingCategory::Fbs, now, now)
            .await
            .unwrap();

        let patch = SyncLogPatch::finalize(
            SyncRunStatus::Failed,
            &crate::models::CategoryCounts::default(),
            5,
            4,
        )
        .with_error("HTTP 500 from API");
        db.update_sync_log(id, &patch).await.unwrap();

        let log = db.get_sync_log(id).await.unwrap().unwrap();
        assert_eq!(log.status, SyncRunStatus::Failed);
        assert_eq!(log.error_message.as_deref(), Some("HTTP 500 from API"));
        assert_eq!(log.retries, 4);
    }
}
