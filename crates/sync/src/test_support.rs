//! Scripted marketplace client and store fixtures for tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sellerledger_core::orders::{Order, OrderItem};
use sellerledger_core::summaries::DailySummaryService;
use sellerledger_core::utils::time_utils::format_timestamp;
use sellerledger_marketplace::{
    FinancialEventsPage, FinancialEventsQuery, MarketplaceApiClient, MarketplaceError,
    OrderItemsPage, OrdersPage, OrdersQuery,
};
use sellerledger_storage_sqlite::{
    create_pool, run_migrations, spawn_writer, DailySummaryRepository, FinancialEventRepository,
    OrderRepository, ProductRepository, SyncRunRepository,
};

use crate::orchestrator::SyncRepositories;

pub const MARKETPLACE: &str = "ATVPDKIKX0DER";

/// Serves fixed pages. Page `n` is requested with token `"p{n}"`.
#[derive(Default)]
pub struct ScriptedMarketplace {
    pub order_pages: Vec<Vec<Order>>,
    pub items: HashMap<String, Vec<OrderItem>>,
    /// Order ids whose item fetch fails with this status.
    pub failing_items: HashMap<String, u16>,
    pub event_pages: Vec<Value>,
    /// Status returned by the orders feed instead of any page.
    pub orders_status: Option<u16>,
    pub calls: Mutex<Vec<String>>,
}

fn page_index(token: Option<&str>) -> usize {
    token
        .and_then(|t| t.strip_prefix('p'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn next_token(index: usize, total: usize) -> Option<String> {
    (index + 1 < total).then(|| format!("p{}", index + 1))
}

impl ScriptedMarketplace {
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl MarketplaceApiClient for ScriptedMarketplace {
    async fn get_orders(
        &self,
        _query: &OrdersQuery,
        token: Option<&str>,
    ) -> Result<OrdersPage, MarketplaceError> {
        self.calls.lock().unwrap().push("orders".to_string());
        if let Some(status) = self.orders_status {
            return Err(MarketplaceError::http(status, "orders unavailable"));
        }
        let index = page_index(token);
        Ok(OrdersPage {
            orders: self.order_pages.get(index).cloned().unwrap_or_default(),
            next_token: next_token(index, self.order_pages.len()),
        })
    }

    async fn get_order_items(
        &self,
        order_id: &str,
        _token: Option<&str>,
    ) -> Result<OrderItemsPage, MarketplaceError> {
        self.calls.lock().unwrap().push(format!("items:{}", order_id));
        if let Some(status) = self.failing_items.get(order_id) {
            return Err(MarketplaceError::http(*status, "items unavailable"));
        }
        Ok(OrderItemsPage {
            items: self.items.get(order_id).cloned().unwrap_or_default(),
            next_token: None,
        })
    }

    async fn get_financial_events(
        &self,
        _query: &FinancialEventsQuery,
        token: Option<&str>,
    ) -> Result<FinancialEventsPage, MarketplaceError> {
        self.calls.lock().unwrap().push("events".to_string());
        let index = page_index(token);
        Ok(FinancialEventsPage {
            payload: self
                .event_pages
                .get(index)
                .cloned()
                .unwrap_or(Value::Null),
            next_token: next_token(index, self.event_pages.len()),
        })
    }
}

/// Upstream timestamp text `hours_ago` hours before now, whole seconds.
pub fn posted(hours_ago: i64) -> String {
    format_timestamp(&hours_before_now(hours_ago))
}

fn hours_before_now(hours_ago: i64) -> DateTime<Utc> {
    let now = Utc::now() - Duration::hours(hours_ago);
    now - Duration::nanoseconds(i64::from(now.timestamp_subsec_nanos()))
}

/// An order purchased `hours_ago` hours before now.
pub fn order(id: &str, hours_ago: i64) -> Order {
    Order {
        order_id: id.to_string(),
        purchase_date: hours_before_now(hours_ago),
        status: "Shipped".to_string(),
        marketplace_id: MARKETPLACE.to_string(),
        buyer_country: Some("US".to_string()),
        total_amount: Some(Decimal::new(3000, 2)),
        currency: Some("USD".to_string()),
        fulfillment_channel: Some("AFN".to_string()),
        number_of_items: Some(2),
    }
}

pub fn item(order_id: &str, id: &str, sku: &str, unit_price: Decimal) -> OrderItem {
    OrderItem {
        order_id: order_id.to_string(),
        order_item_id: id.to_string(),
        sku: Some(sku.to_string()),
        asin: None,
        title: None,
        quantity: 1,
        unit_price,
        line_total: None,
        item_tax: Decimal::ZERO,
        promotion_discount: Decimal::ZERO,
        currency: Some("USD".to_string()),
        refunded: false,
        product_id: None,
    }
}

pub struct TestStore {
    pub repositories: SyncRepositories,
    pub orders: Arc<OrderRepository>,
    pub events: Arc<FinancialEventRepository>,
    pub products: Arc<ProductRepository>,
    pub runs: Arc<SyncRunRepository>,
    pub summaries: Arc<DailySummaryRepository>,
    pub summary_service: Arc<DailySummaryService>,
    _dir: tempfile::TempDir,
}

pub fn test_store() -> TestStore {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    let orders = Arc::new(OrderRepository::new(pool.clone(), writer.clone()));
    let events = Arc::new(FinancialEventRepository::new(pool.clone(), writer.clone()));
    let products = Arc::new(ProductRepository::new(pool.clone(), writer.clone()));
    let runs = Arc::new(SyncRunRepository::new(pool.clone(), writer.clone()));
    let summaries = Arc::new(DailySummaryRepository::new(pool, writer));
    let summary_service = Arc::new(DailySummaryService::new(
        orders.clone(),
        events.clone(),
        products.clone(),
        summaries.clone(),
    ));

    TestStore {
        repositories: SyncRepositories {
            orders: orders.clone(),
            events: events.clone(),
            products: products.clone(),
            runs: runs.clone(),
        },
        orders,
        events,
        products,
        runs,
        summaries,
        summary_service,
        _dir: dir,
    }
}
