use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

use super::finances_model::{EventBatchOutcome, EventWrite, FinancialEvent, RefundAllocation};
use crate::errors::Result;

#[async_trait]
pub trait FinancialEventRepositoryTrait: Send + Sync {
    /// Upserts a batch of events by event key in one transaction. For writes
    /// carrying allocations, the event's stored allocations are replaced and
    /// the allocated items are flagged as refunded.
    async fn upsert_events(&self, batch: Vec<EventWrite>) -> Result<EventBatchOutcome>;

    fn get_event(&self, event_key: &str) -> Result<Option<FinancialEvent>>;

    /// Returns the subset of `event_keys` already stored.
    fn get_existing_keys(&self, event_keys: &[String]) -> Result<HashSet<String>>;

    /// Events posted on any date in `[start, end]` (UTC). Events without a
    /// marketplace are included for every marketplace.
    fn get_events_posted_between(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FinancialEvent>>;

    fn get_allocations_for_event(&self, event_key: &str) -> Result<Vec<RefundAllocation>>;

    /// Keys of `(order_id, order_item_id)` pairs that hold at least one allocation.
    fn get_refunded_item_keys(&self, order_ids: &[String]) -> Result<HashSet<(String, String)>>;
}
