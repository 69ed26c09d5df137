//! Counts and diagnostics returned by a sync run.

use serde::{Deserialize, Serialize};

use sellerledger_core::sync::SyncWarning;

/// What the order collector did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDiagnostics {
    pub pages_fetched: u32,
    /// Unique orders kept after deduplication and the order limit.
    pub orders_fetched: usize,
    pub order_limit_hit: bool,
    pub page_limit_hit: bool,
    pub orders_with_items: usize,
    pub orders_skipped_for_items: usize,
    pub item_fetch_failures: usize,
}

/// What the financial event collector did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDiagnostics {
    pub pages_fetched: u32,
    pub page_limit_hit: bool,
    /// Entries that carried no amount.
    pub entries_dropped: usize,
    /// Events already seen on an earlier page of the same run.
    pub duplicates_dropped: usize,
    pub events_fetched: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<OrderDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<EventDiagnostics>,
}

/// Write counts of a run. A dry run reports the counts a real run would write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCounts {
    pub orders_inserted: usize,
    pub orders_updated: usize,
    /// Orders persisted without replacing their items.
    pub orders_header_only: usize,
    pub items_written: usize,
    pub events_inserted: usize,
    pub events_updated: usize,
    pub events_linked: usize,
    pub events_unlinked: usize,
    pub refund_allocations: usize,
    pub refunds_unattributed: usize,
    pub summary_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub run_id: String,
    pub dry_run: bool,
    pub counts: SyncCounts,
    pub diagnostics: SyncDiagnostics,
    pub warnings: Vec<SyncWarning>,
}
