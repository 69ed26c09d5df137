//! Request and page types of the upstream feeds.

use chrono::{DateTime, Utc};
use serde_json::Value;

use sellerledger_core::orders::{Order, OrderItem};

/// Parameters of the orders feed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdersQuery {
    pub marketplace_id: String,
    pub created_after: DateTime<Utc>,
    pub created_before: DateTime<Utc>,
    pub page_size: u32,
}

/// Parameters of the financial events feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialEventsQuery {
    pub posted_after: DateTime<Utc>,
    pub posted_before: DateTime<Utc>,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderItemsPage {
    pub items: Vec<OrderItem>,
    pub next_token: Option<String>,
}

/// One page of financial events, still category-keyed and untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialEventsPage {
    pub payload: Value,
    pub next_token: Option<String>,
}

/// Normalizes an upstream continuation token: empty strings end pagination.
pub(crate) fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}
