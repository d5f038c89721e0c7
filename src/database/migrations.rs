//! Database migrations for ozon-sync
//!
//! This module contains SQL migrations for the SQLite database schema.

/// SQL statement to create the initial database schema
pub const CREATE_SCHEMA: &str = r#"
-- Orders table, one row per posting
CREATE TABLE IF NOT EXISTS orders (
    posting_number TEXT PRIMARY KEY,
    order_id INTEGER,
    order_number TEXT,
    posting_type TEXT NOT NULL,
    status TEXT,
    substatus TEXT,
    cancel_reason_id INTEGER,
    created_at DATETIME,
    in_process_at DATETIME,
    shipment_date DATETIME,
    delivering_date DATETIME,
    warehouse_id INTEGER,
    warehouse_name TEXT,
    tracking_number TEXT,
    tpl_integration_type TEXT,
    delivery_method_id INTEGER,
    delivery_method_name TEXT,
    customer_city TEXT,
    customer_region TEXT,
    financial_data TEXT,
    analytics_data TEXT,
    raw_data TEXT,
    synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_orders_type ON orders(posting_type);
CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);

-- Product rows, keyed by posting and sku
CREATE TABLE IF NOT EXISTS order_products (
    posting_number TEXT NOT NULL,
    sku INTEGER NOT NULL,
    name TEXT,
    offer_id TEXT,
    quantity INTEGER NOT NULL DEFAULT 0,
    price REAL NOT NULL DEFAULT 0,
    currency_code TEXT,
    commission_amount REAL,
    commission_percent REAL,
    payout REAL,
    product_id INTEGER,
    mandatory_mark TEXT,
    height REAL,
    length REAL,
    width REAL,
    weight REAL,
    PRIMARY KEY (posting_number, sku)
);

CREATE INDEX IF NOT EXISTS idx_products_sku ON order_products(sku);

-- Sync run telemetry
CREATE TABLE IF NOT EXISTS sync_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_start DATETIME NOT NULL,
    job_end DATETIME,
    posting_type TEXT NOT NULL,
    date_from DATETIME,
    date_to DATETIME,
    status TEXT NOT NULL DEFAULT 'running',
    orders_fetched INTEGER DEFAULT 0,
    orders_inserted INTEGER DEFAULT 0,
    orders_updated INTEGER DEFAULT 0,
    products_count INTEGER DEFAULT 0,
    http_requests INTEGER DEFAULT 0,
    retries INTEGER DEFAULT 0,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_sync_log_start ON sync_log(job_start DESC);
"#;
