//! Flattening of nested posting payloads into order and product rows
//!
//! API payloads arrive as deeply nested JSON with inconsistent typing
//! (prices as strings, optional sub-objects). This module deserializes a
//! tolerant typed view of each posting, flattens it into one [`Order`] plus
//! its [`OrderProduct`] rows, and keeps the original payload verbatim for
//! the raw/analytics/financial blob columns.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Order, OrderProduct, PostingCategory, TplIntegration};

/// One normalized posting: the flat order row and its product rows
#[derive(Debug, Clone)]
pub struct FetchedPosting {
    pub order: Order,
    pub products: Vec<OrderProduct>,
}

/// Tolerant view of a posting as returned by the list endpoints
///
/// Only `posting_number` is required; everything else defaults so a partial
/// payload still normalizes instead of failing the page.
#[derive(Debug, Deserialize)]
struct RawPosting {
    posting_number: String,
    #[serde(default)]
    order_id: Option<i64>,
    #[serde(default)]
    order_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    substatus: Option<String>,
    #[serde(default)]
    cancel_reason_id: Option<i64>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    in_process_at: Option<String>,
    #[serde(default)]
    shipment_date: Option<String>,
    #[serde(default)]
    delivering_date: Option<String>,
    #[serde(default)]
    tracking_number: Option<String>,
    #[serde(default)]
    analytics_data: Option<Value>,
    #[serde(default)]
    delivery_method: Option<RawDeliveryMethod>,
    #[serde(default)]
    financial_data: Option<Value>,
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize, Default)]
struct RawAnalytics {
    #[serde(default)]
    warehouse_id: Option<i64>,
    #[serde(default)]
    warehouse_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawDeliveryMethod {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    warehouse_id: Option<i64>,
    #[serde(default)]
    warehouse_name: Option<String>,
    #[serde(default)]
    tpl_provider_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    sku: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    offer_id: Option<String>,
    #[serde(default)]
    quantity: i64,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    mandatory_mark: Option<Value>,
    #[serde(default)]
    dimensions: Option<RawDimensions>,
}

#[derive(Debug, Deserialize, Default)]
struct RawDimensions {
    #[serde(default)]
    height: Option<Value>,
    #[serde(default)]
    length: Option<Value>,
    #[serde(default)]
    width: Option<Value>,
    #[serde(default)]
    weight: Option<Value>,
}

/// Per-product financial view joined to products by product_id == sku
#[derive(Debug, Deserialize, Default)]
struct FinancialView {
    #[serde(default)]
    products: Vec<FinancialProduct>,
}

#[derive(Debug, Deserialize)]
struct FinancialProduct {
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default)]
    commission_amount: Option<f64>,
    #[serde(default)]
    commission_percent: Option<f64>,
    #[serde(default)]
    payout: Option<f64>,
}

/// Normalize one raw posting payload
///
/// Fails with [`ApiError::InvalidData`] only when the payload lacks the
/// structural minimum (a posting_number); per-field oddities degrade to
/// defaults instead.
pub fn normalize_posting(
    raw: &Value,
    category: PostingCategory,
) -> Result<FetchedPosting, ApiError> {
    let posting: RawPosting = serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::InvalidData(format!("malformed posting: {e}")))?;

    let order = normalize_order(&posting, raw, category);
    let products = posting
        .products
        .iter()
        .map(|p| normalize_product(p, posting.financial_data.as_ref()))
        .collect();

    Ok(FetchedPosting { order, products })
}

/// Build the flat order row from the typed view plus the verbatim payload
fn normalize_order(posting: &RawPosting, raw: &Value, category: PostingCategory) -> Order {
    let analytics: RawAnalytics = posting
        .analytics_data
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let delivery = posting.delivery_method.as_ref();

    // Delivery method wins where both carry warehouse info; FBO postings
    // only have analytics_data.
    let warehouse_id = delivery
        .and_then(|d| d.warehouse_id)
        .or(analytics.warehouse_id);
    let warehouse_name = delivery
        .and_then(|d| d.warehouse_name.clone())
        .or_else(|| analytics.warehouse_name.clone());

    let tpl_integration_type = match delivery.and_then(|d| d.tpl_provider_id) {
        Some(_) => TplIntegration::Tpl,
        None => TplIntegration::Ozon,
    };

    Order {
        posting_number: posting.posting_number.clone(),
        order_id: posting.order_id,
        order_number: posting.order_number.clone(),
        posting_type: category,
        status: posting.status.clone(),
        substatus: posting.substatus.clone(),
        cancel_reason_id: posting.cancel_reason_id,
        created_at: parse_datetime(posting.created_at.as_deref()),
        in_process_at: parse_datetime(posting.in_process_at.as_deref()),
        shipment_date: parse_datetime(posting.shipment_date.as_deref()),
        delivering_date: parse_datetime(posting.delivering_date.as_deref()),
        warehouse_id,
        warehouse_name,
        tracking_number: posting.tracking_number.clone(),
        tpl_integration_type,
        delivery_method_id: delivery.and_then(|d| d.id),
        delivery_method_name: delivery.and_then(|d| d.name.clone()),
        customer_city: analytics.city,
        customer_region: analytics.region,
        financial_data: posting.financial_data.clone(),
        analytics_data: posting.analytics_data.clone(),
        raw_data: raw.clone(),
    }
}

/// Build a flat product row, joining per-product financials by sku
fn normalize_product(product: &RawProduct, financial: Option<&Value>) -> OrderProduct {
    let fin: FinancialView = financial
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let fin_product = fin
        .products
        .iter()
        .find(|p| p.product_id == Some(product.sku));

    let dims = product.dimensions.as_ref();

    OrderProduct {
        sku: product.sku,
        name: product.name.clone(),
        offer_id: product.offer_id.clone(),
        quantity: product.quantity,
        price: parse_price(product.price.as_ref()),
        currency_code: product.currency_code.clone(),
        commission_amount: fin_product.and_then(|p| p.commission_amount),
        commission_percent: fin_product.and_then(|p| p.commission_percent),
        payout: fin_product.and_then(|p| p.payout),
        product_id: fin_product.and_then(|p| p.product_id),
        mandatory_mark: product.mandatory_mark.clone(),
        height: dims.and_then(|d| parse_opt_f64(d.height.as_ref())),
        length: dims.and_then(|d| parse_opt_f64(d.length.as_ref())),
        width: dims.and_then(|d| parse_opt_f64(d.width.as_ref())),
        weight: dims.and_then(|d| parse_opt_f64(d.weight.as_ref())),
    }
}

/// Parse a price that arrives as either a JSON string or a number
///
/// Missing or unparseable prices default to 0.0 rather than failing the row.
fn parse_price(value: Option<&Value>) -> f64 {
    parse_opt_f64(value).unwrap_or(0.0)
}

fn parse_opt_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp, tolerating absent or malformed values
fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let s = value?;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
