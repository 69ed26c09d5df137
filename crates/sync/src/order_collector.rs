//! Order collection: paginated order headers, then line items for the most
//! recent orders.

use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::Semaphore;

use sellerledger_core::orders::{CollectedOrder, Order, OrderItem};
use sellerledger_core::sync::{SyncWarning, SyncWarningKind};
use sellerledger_marketplace::{MarketplaceApiClient, MarketplaceError, OrdersQuery};

use crate::report::OrderDiagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLimits {
    pub max_pages: u32,
    pub max_orders: usize,
    pub max_orders_with_items: usize,
    pub item_fetch_concurrency: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OrderCollection {
    /// Newest purchase first.
    pub orders: Vec<CollectedOrder>,
    pub diagnostics: OrderDiagnostics,
    pub warnings: Vec<SyncWarning>,
}

pub struct OrderCollector<'a> {
    client: &'a dyn MarketplaceApiClient,
    limits: OrderLimits,
}

impl<'a> OrderCollector<'a> {
    pub fn new(client: &'a dyn MarketplaceApiClient, limits: OrderLimits) -> Self {
        Self { client, limits }
    }

    /// Collects the orders of `query`. A failing order page aborts the
    /// collection; a failing item fetch only marks that order header-only.
    pub async fn collect(&self, query: &OrdersQuery) -> Result<OrderCollection, MarketplaceError> {
        let mut collection = OrderCollection::default();
        let orders = self.collect_headers(query, &mut collection).await?;

        let with_items = orders.len().min(self.limits.max_orders_with_items);
        let (fetch, skip) = orders.split_at(with_items);

        let item_results = self.fetch_all_items(fetch).await;
        for (order, result) in fetch.iter().zip(item_results) {
            let items = match result {
                Ok(items) => {
                    collection.diagnostics.orders_with_items += 1;
                    Some(items)
                }
                Err(err) => {
                    warn!("Fetching items of order {} failed: {}", order.order_id, err);
                    collection.diagnostics.item_fetch_failures += 1;
                    collection.warnings.push(SyncWarning::for_order(
                        SyncWarningKind::ItemFetchFailed,
                        order.order_id.clone(),
                        err.to_string(),
                    ));
                    None
                }
            };
            collection.orders.push(CollectedOrder {
                order: order.clone(),
                items,
            });
        }

        collection.diagnostics.orders_skipped_for_items = skip.len();
        if !skip.is_empty() {
            collection.warnings.push(SyncWarning::new(
                SyncWarningKind::ItemsSkipped,
                format!(
                    "{} older orders were stored without line items (limit {})",
                    skip.len(),
                    self.limits.max_orders_with_items
                ),
            ));
        }
        collection
            .orders
            .extend(skip.iter().cloned().map(|order| CollectedOrder { order, items: None }));

        info!(
            "Collected {} orders over {} pages ({} with items, {} item failures)",
            collection.orders.len(),
            collection.diagnostics.pages_fetched,
            collection.diagnostics.orders_with_items,
            collection.diagnostics.item_fetch_failures
        );

        Ok(collection)
    }

    async fn collect_headers(
        &self,
        query: &OrdersQuery,
        collection: &mut OrderCollection,
    ) -> Result<Vec<Order>, MarketplaceError> {
        let diagnostics = &mut collection.diagnostics;
        let mut by_id: HashMap<String, Order> = HashMap::new();
        let mut next_token: Option<String> = None;

        loop {
            if diagnostics.pages_fetched >= self.limits.max_pages {
                diagnostics.page_limit_hit = true;
                collection.warnings.push(SyncWarning::new(
                    SyncWarningKind::PageLimitHit,
                    format!("Stopped orders pagination after {} pages", self.limits.max_pages),
                ));
                break;
            }

            let page = self.client.get_orders(query, next_token.as_deref()).await?;
            diagnostics.pages_fetched += 1;
            debug!(
                "Orders page {} returned {} orders",
                diagnostics.pages_fetched,
                page.orders.len()
            );

            for order in page.orders {
                if by_id.contains_key(&order.order_id) || by_id.len() < self.limits.max_orders {
                    by_id.insert(order.order_id.clone(), order);
                } else {
                    diagnostics.order_limit_hit = true;
                }
            }

            if by_id.len() >= self.limits.max_orders {
                diagnostics.order_limit_hit = true;
            }
            if diagnostics.order_limit_hit {
                collection.warnings.push(SyncWarning::new(
                    SyncWarningKind::OrderLimitHit,
                    format!("Stopped at the order limit of {}", self.limits.max_orders),
                ));
                break;
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        let mut orders: Vec<Order> = by_id.into_values().collect();
        orders.sort_by(|a, b| {
            b.purchase_date
                .cmp(&a.purchase_date)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        diagnostics.orders_fetched = orders.len();
        Ok(orders)
    }

    /// Fetches items for every order on a bounded pool. Results keep the
    /// order of `orders`.
    async fn fetch_all_items(
        &self,
        orders: &[Order],
    ) -> Vec<Result<Vec<OrderItem>, MarketplaceError>> {
        let pool = Semaphore::new(self.limits.item_fetch_concurrency.max(1));

        join_all(orders.iter().map(|order| {
            let pool = &pool;
            async move {
                let _permit = pool
                    .acquire()
                    .await
                    .map_err(|e| MarketplaceError::Config(e.to_string()))?;
                self.fetch_items(&order.order_id).await
            }
        }))
        .await
    }

    async fn fetch_items(&self, order_id: &str) -> Result<Vec<OrderItem>, MarketplaceError> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self
                .client
                .get_order_items(order_id, next_token.as_deref())
                .await?;
            pages += 1;
            items.extend(page.items.into_iter().map(|mut item| {
                item.order_id = order_id.to_string();
                item
            }));

            match page.next_token {
                Some(token) if pages < self.limits.max_pages => next_token = Some(token),
                Some(_) => {
                    warn!(
                        "Items of order {} exceed {} pages, keeping what was fetched",
                        order_id, self.limits.max_pages
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }
}
