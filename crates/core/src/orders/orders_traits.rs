//! Order repository trait.
//!
//! Database-agnostic contract for order and line-item persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::orders_model::{Order, OrderItem, OrderUpsertOutcome};
use crate::errors::Result;

#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    /// Upserts an order header and, when `items` is `Some`, replaces the
    /// order's line items wholesale. Header and items are written in a single
    /// transaction.
    async fn upsert_order(
        &self,
        order: Order,
        items: Option<Vec<OrderItem>>,
    ) -> Result<OrderUpsertOutcome>;

    fn get_order(&self, order_id: &str) -> Result<Option<Order>>;

    /// Returns the subset of `order_ids` that exist locally.
    fn get_known_order_ids(&self, order_ids: &[String]) -> Result<HashSet<String>>;

    /// Loads stored items grouped by order id.
    fn get_items_for_orders(&self, order_ids: &[String])
        -> Result<HashMap<String, Vec<OrderItem>>>;

    /// Orders of a marketplace purchased on any date in `[start, end]` (UTC).
    fn get_orders_purchased_between(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Order>>;
}
