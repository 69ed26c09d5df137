//! Financial event domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized upstream financial line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEvent {
    /// Content-hash key, see [`super::compute_event_key`].
    pub event_key: String,
    /// Source list name without its `List` suffix, e.g. `RefundEvent`.
    pub event_type: String,
    pub posted_date: DateTime<Utc>,
    /// Order id as reported upstream. Part of the content key.
    pub upstream_order_id: Option<String>,
    /// Link to a locally known order. Never set for orders we have not stored.
    pub order_id: Option<String>,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub occurrence_index: u32,
    pub marketplace_id: Option<String>,
    /// The upstream entry the event was flattened from.
    pub raw: Option<Value>,
}

/// A refund share attributed to one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundAllocation {
    pub event_key: String,
    pub order_id: String,
    pub order_item_id: String,
    pub amount: Decimal,
}

/// One event plus what to do with its refund allocations.
///
/// `allocations` is `Some` for refund-classified events: stored allocations
/// for the event are replaced by the given list (which may be empty).
/// `None` leaves allocations untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWrite {
    pub event: FinancialEvent,
    pub allocations: Option<Vec<RefundAllocation>>,
}

/// Outcome of persisting one event batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatchOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub allocations_written: usize,
}
