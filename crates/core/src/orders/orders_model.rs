//! Order domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::ORDER_STATUS_CANCELED;

/// A marketplace order header, keyed by the upstream order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub purchase_date: DateTime<Utc>,
    pub status: String,
    pub marketplace_id: String,
    pub buyer_country: Option<String>,
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub fulfillment_channel: Option<String>,
    /// Shipped plus unshipped units as reported on the order header.
    pub number_of_items: Option<i32>,
}

impl Order {
    pub fn is_canceled(&self) -> bool {
        self.status.eq_ignore_ascii_case(ORDER_STATUS_CANCELED)
    }
}

/// A line item of an order.
///
/// Items reference their order by upstream order id and are identified by
/// `(order_id, order_item_id)`, so replacing an order's items keeps refund
/// allocations pointing at the same lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: String,
    pub order_item_id: String,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub title: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Upstream line total (`ItemPrice`), kept exact. Absent on items that
    /// were never priced as a line.
    #[serde(default)]
    pub line_total: Option<Decimal>,
    pub item_tax: Decimal,
    pub promotion_discount: Decimal,
    pub currency: Option<String>,
    pub refunded: bool,
    pub product_id: Option<String>,
}

impl OrderItem {
    /// Gross line value before tax and promotions. Prefers the upstream line
    /// total over `quantity * unit_price`, which may not divide back exactly.
    pub fn line_sales(&self) -> Decimal {
        self.line_total
            .unwrap_or_else(|| Decimal::from(self.quantity) * self.unit_price)
    }
}

/// An order as collected from upstream in one sync.
///
/// `items` is `None` when the sync did not fetch the order's line items
/// (skipped by the item limit, or the fetch failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedOrder {
    pub order: Order,
    pub items: Option<Vec<OrderItem>>,
}

impl CollectedOrder {
    pub fn item_count(&self) -> usize {
        self.items.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// Outcome of persisting one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpsertOutcome {
    /// True when the order did not exist before.
    pub inserted: bool,
    /// Number of item rows written (zero for header-only upserts).
    pub items_written: usize,
}
