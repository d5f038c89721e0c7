//! Order-related domain models
//!
//! A posting is a single fulfillment shipment record from the marketplace.
//! Each posting maps to one [`Order`] row and one [`OrderProduct`] row per SKU.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Posting fulfillment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostingCategory {
    /// Fulfilled by the marketplace (Fulfillment by Ozon)
    Fbo,
    /// Fulfilled by the seller (Fulfillment by Seller)
    Fbs,
}

impl PostingCategory {
    /// Category tag as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingCategory::Fbo => "FBO",
            PostingCategory::Fbs => "FBS",
        }
    }

    /// Both categories, in sync order
    pub fn all() -> [PostingCategory; 2] {
        [PostingCategory::Fbo, PostingCategory::Fbs]
    }
}

impl fmt::Display for PostingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FBO" => Ok(PostingCategory::Fbo),
            "FBS" => Ok(PostingCategory::Fbs),
            other => Err(format!("Unknown posting category: {}", other)),
        }
    }
}

/// Delivery integration type, derived from the posting's delivery method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TplIntegration {
    /// Delivered by a third-party logistics provider
    Tpl,
    /// Delivered by Ozon logistics
    Ozon,
}

impl TplIntegration {
    /// Tag as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TplIntegration::Tpl => "tpl",
            TplIntegration::Ozon => "ozon",
        }
    }
}

impl fmt::Display for TplIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TplIntegration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tpl" => Ok(TplIntegration::Tpl),
            "ozon" => Ok(TplIntegration::Ozon),
            other => Err(format!("Unknown tpl integration type: {}", other)),
        }
    }
}

/// Flattened order row, one per posting
///
/// `posting_number` is globally unique and serves as the upsert conflict key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Posting number (unique key)
    pub posting_number: String,

    /// Marketplace order id
    pub order_id: Option<i64>,

    /// Marketplace order number
    pub order_number: Option<String>,

    /// Fulfillment category of the source endpoint
    pub posting_type: PostingCategory,

    /// Lifecycle status
    pub status: Option<String>,

    /// Lifecycle substatus
    pub substatus: Option<String>,

    /// Cancellation reason id, if the posting was cancelled
    pub cancel_reason_id: Option<i64>,

    /// When the order was created
    pub created_at: Option<DateTime<Utc>>,

    /// When the order entered processing
    pub in_process_at: Option<DateTime<Utc>>,

    /// Scheduled shipment date
    pub shipment_date: Option<DateTime<Utc>>,

    /// When the order started delivering
    pub delivering_date: Option<DateTime<Utc>>,

    /// Warehouse id, preferring the delivery method over analytics data
    pub warehouse_id: Option<i64>,

    /// Warehouse name, same resolution order as the id
    pub warehouse_name: Option<String>,

    /// Carrier tracking number
    pub tracking_number: Option<String>,

    /// Delivery integration type
    pub tpl_integration_type: TplIntegration,

    /// Delivery method id
    pub delivery_method_id: Option<i64>,

    /// Delivery method name
    pub delivery_method_name: Option<String>,

    /// Customer city from analytics data
    pub customer_city: Option<String>,

    /// Customer region from analytics data
    pub customer_region: Option<String>,

    /// Opaque financial data blob
    pub financial_data: Option<Value>,

    /// Opaque analytics data blob
    pub analytics_data: Option<Value>,

    /// Full raw posting payload
    pub raw_data: Value,
}

/// Product line row, one per (posting number, SKU)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    /// Stock keeping unit
    pub sku: i64,

    /// Product name
    pub name: Option<String>,

    /// Seller-assigned offer id
    pub offer_id: Option<String>,

    /// Ordered quantity
    pub quantity: i64,

    /// Unit price; zero when the source value is missing or unparseable
    pub price: f64,

    /// ISO currency code
    pub currency_code: Option<String>,

    /// Commission amount from the posting's financial data
    pub commission_amount: Option<f64>,

    /// Commission percent from the posting's financial data
    pub commission_percent: Option<f64>,

    /// Seller payout from the posting's financial data
    pub payout: Option<f64>,

    /// Product id from the matched financial entry
    pub product_id: Option<i64>,

    /// Mandatory marking codes, carried opaquely
    pub mandatory_mark: Option<Value>,

    /// Package height
    pub height: Option<f64>,

    /// Package length
    pub length: Option<f64>,

    /// Package width
    pub width: Option<f64>,

    /// Package weight
    pub weight: Option<f64>,
}
