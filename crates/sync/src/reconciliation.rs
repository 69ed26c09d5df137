//! Reconciliation of collected data against the local store.
//!
//! [`ReconciliationWriter::plan`] decides everything that would be written
//! using read-only lookups; [`ReconciliationWriter::apply`] persists a plan.
//! Dry runs stop after planning.

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sellerledger_core::errors::Result;
use sellerledger_core::finances::{
    EventBatchOutcome, EventWrite, FinancialEvent, FinancialEventRepositoryTrait,
};
use sellerledger_core::orders::{CollectedOrder, OrderItem, OrderRepositoryTrait};
use sellerledger_core::products::{CostLookup, ProductRepositoryTrait};
use sellerledger_core::refunds::allocate_refund;
use sellerledger_core::summaries::classify_event;
use sellerledger_core::sync::{SyncWarning, SyncWarningKind};

use crate::report::SyncCounts;

#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub orders: Vec<CollectedOrder>,
    pub events: Vec<EventWrite>,
    pub counts: SyncCounts,
    pub warnings: Vec<SyncWarning>,
}

/// What `apply` actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedWrites {
    pub orders_inserted: usize,
    pub items_written: usize,
    pub events: EventBatchOutcome,
}

pub struct ReconciliationWriter {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    event_repository: Arc<dyn FinancialEventRepositoryTrait>,
    product_repository: Arc<dyn ProductRepositoryTrait>,
    write_concurrency: usize,
    event_batch_size: usize,
}

impl ReconciliationWriter {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        event_repository: Arc<dyn FinancialEventRepositoryTrait>,
        product_repository: Arc<dyn ProductRepositoryTrait>,
    ) -> Self {
        Self {
            order_repository,
            event_repository,
            product_repository,
            write_concurrency: 1,
            event_batch_size: 250,
        }
    }

    pub fn with_write_concurrency(mut self, concurrency: usize) -> Self {
        self.write_concurrency = concurrency.max(1);
        self
    }

    pub fn with_event_batch_size(mut self, size: usize) -> Self {
        self.event_batch_size = size.max(1);
        self
    }

    pub fn plan(
        &self,
        marketplace_id: &str,
        orders: Vec<CollectedOrder>,
        events: Vec<FinancialEvent>,
    ) -> Result<ReconciliationPlan> {
        let mut plan = ReconciliationPlan::default();

        let mut lookup_ids: Vec<String> = orders.iter().map(|o| o.order.order_id.clone()).collect();
        lookup_ids.extend(events.iter().filter_map(|e| e.upstream_order_id.clone()));
        lookup_ids.sort();
        lookup_ids.dedup();
        let stored_ids = self.order_repository.get_known_order_ids(&lookup_ids)?;

        let costs = CostLookup::new(self.product_repository.list_products()?);
        let fetched_ids: Vec<String> = orders
            .iter()
            .filter(|o| o.items.is_some())
            .map(|o| o.order.order_id.clone())
            .collect();
        let refunded = self.event_repository.get_refunded_item_keys(&fetched_ids)?;

        for collected in orders {
            if stored_ids.contains(&collected.order.order_id) {
                plan.counts.orders_updated += 1;
            } else {
                plan.counts.orders_inserted += 1;
            }
            let items = collected
                .items
                .map(|items| link_items(&collected.order.order_id, items, &costs, &refunded));
            match &items {
                Some(items) => plan.counts.items_written += items.len(),
                None => plan.counts.orders_header_only += 1,
            }
            plan.orders.push(CollectedOrder {
                order: collected.order,
                items,
            });
        }

        self.plan_events(marketplace_id, events, &stored_ids, &mut plan)?;

        debug!(
            "Planned {} orders and {} events for {}",
            plan.orders.len(),
            plan.events.len(),
            marketplace_id
        );
        Ok(plan)
    }

    fn plan_events(
        &self,
        marketplace_id: &str,
        events: Vec<FinancialEvent>,
        stored_ids: &HashSet<String>,
        plan: &mut ReconciliationPlan,
    ) -> Result<()> {
        let mut marketplaces: HashMap<String, String> = plan
            .orders
            .iter()
            .map(|o| (o.order.order_id.clone(), o.order.marketplace_id.clone()))
            .collect();
        let mut known: HashSet<String> = stored_ids.clone();
        known.extend(marketplaces.keys().cloned());

        let keys: Vec<String> = events.iter().map(|e| e.event_key.clone()).collect();
        let existing = self.event_repository.get_existing_keys(&keys)?;

        // Items to allocate against: this run's fetched items, else stored ones.
        let mut items_by_order: HashMap<String, Vec<OrderItem>> = plan
            .orders
            .iter()
            .filter_map(|o| o.items.clone().map(|items| (o.order.order_id.clone(), items)))
            .collect();
        let missing: Vec<String> = events
            .iter()
            .filter(|e| classify_event(&e.event_type).is_refund())
            .filter_map(|e| e.upstream_order_id.clone())
            .filter(|id| known.contains(id) && !items_by_order.contains_key(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if !missing.is_empty() {
            items_by_order.extend(self.order_repository.get_items_for_orders(&missing)?);
        }

        for mut event in events {
            if existing.contains(&event.event_key) {
                plan.counts.events_updated += 1;
            } else {
                plan.counts.events_inserted += 1;
            }

            event.order_id = event
                .upstream_order_id
                .clone()
                .filter(|id| known.contains(id));

            let linked_marketplace = match &event.order_id {
                Some(order_id) => self.order_marketplace(order_id, &mut marketplaces)?,
                None => None,
            };
            event.marketplace_id =
                Some(linked_marketplace.unwrap_or_else(|| marketplace_id.to_string()));

            if event.order_id.is_some() {
                plan.counts.events_linked += 1;
            } else {
                plan.counts.events_unlinked += 1;
            }

            let allocations = if classify_event(&event.event_type).is_refund() {
                let mut items = event
                    .order_id
                    .as_ref()
                    .and_then(|id| items_by_order.get(id))
                    .cloned()
                    .unwrap_or_default();
                items.sort_by(|a, b| a.order_item_id.cmp(&b.order_item_id));

                let allocations = allocate_refund(&event.event_key, event.amount, &items);
                if allocations.is_empty() {
                    plan.counts.refunds_unattributed += 1;
                    let message = format!(
                        "{} of {} {} has no line items to allocate to",
                        event.event_type, event.amount, event.currency
                    );
                    plan.warnings.push(match &event.upstream_order_id {
                        Some(id) => SyncWarning::for_order(
                            SyncWarningKind::RefundUnattributed,
                            id.clone(),
                            message,
                        ),
                        None => SyncWarning::new(SyncWarningKind::RefundUnattributed, message),
                    });
                }
                plan.counts.refund_allocations += allocations.len();
                Some(allocations)
            } else {
                None
            };

            plan.events.push(EventWrite { event, allocations });
        }

        Ok(())
    }

    fn order_marketplace(
        &self,
        order_id: &str,
        cache: &mut HashMap<String, String>,
    ) -> Result<Option<String>> {
        if let Some(marketplace_id) = cache.get(order_id) {
            return Ok(Some(marketplace_id.clone()));
        }
        let marketplace_id = self
            .order_repository
            .get_order(order_id)?
            .map(|o| o.marketplace_id);
        if let Some(found) = &marketplace_id {
            cache.insert(order_id.to_string(), found.clone());
        }
        Ok(marketplace_id)
    }

    /// Persists a plan: one transaction per order, then one per event batch.
    pub async fn apply(&self, plan: ReconciliationPlan) -> Result<AppliedWrites> {
        let mut applied = AppliedWrites::default();

        let outcomes: Vec<_> = stream::iter(plan.orders)
            .map(|collected| {
                self.order_repository
                    .upsert_order(collected.order, collected.items)
            })
            .buffer_unordered(self.write_concurrency)
            .try_collect()
            .await?;
        for outcome in outcomes {
            if outcome.inserted {
                applied.orders_inserted += 1;
            }
            applied.items_written += outcome.items_written;
        }

        let mut events = plan.events;
        while !events.is_empty() {
            let rest = events.split_off(events.len().min(self.event_batch_size));
            let outcome = self.event_repository.upsert_events(events).await?;
            applied.events.inserted += outcome.inserted;
            applied.events.updated += outcome.updated;
            applied.events.allocations_written += outcome.allocations_written;
            events = rest;
        }

        info!(
            "Applied reconciliation: {} orders inserted, {} items, {} events inserted, {} updated, {} allocations",
            applied.orders_inserted,
            applied.items_written,
            applied.events.inserted,
            applied.events.updated,
            applied.events.allocations_written
        );
        Ok(applied)
    }
}

/// Links items to products and carries over refunded flags.
fn link_items(
    order_id: &str,
    items: Vec<OrderItem>,
    costs: &CostLookup,
    refunded: &HashSet<(String, String)>,
) -> Vec<OrderItem> {
    items
        .into_iter()
        .map(|mut item| {
            item.order_id = order_id.to_string();
            if let Some(product_id) = costs.product_id(item.sku.as_deref(), item.asin.as_deref()) {
                item.product_id = Some(product_id);
            }
            item.refunded = refunded.contains(&(item.order_id.clone(), item.order_item_id.clone()));
            item
        })
        .collect()
}
