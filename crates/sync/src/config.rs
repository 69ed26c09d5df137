//! Sync limits and the per-invocation request.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use sellerledger_core::errors::{Error, Result, ValidationError};
use sellerledger_core::sync::SyncRunType;

/// Largest page the upstream feeds accept.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Defaults for every sync run, overridable per request.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Marketplace synced when the request names none.
    pub default_marketplace_id: Option<String>,
    pub default_lookback_days: u32,
    /// Results per upstream page.
    pub page_size: u32,
    /// Maximum pages per feed and run.
    pub max_pages: u32,
    /// Maximum unique orders collected per run.
    pub max_orders: usize,
    /// Only the most recent orders get their line items fetched.
    pub max_orders_with_items: usize,
    /// Concurrent order-item fetches.
    pub item_fetch_concurrency: usize,
    /// Concurrent per-order write transactions.
    pub write_concurrency: usize,
    /// Events per write transaction.
    pub event_batch_size: usize,
    /// Wall-clock budget of one run.
    pub sync_timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_marketplace_id: None,
            default_lookback_days: 7,
            page_size: MAX_PAGE_SIZE,
            max_pages: 50,
            max_orders: 1000,
            max_orders_with_items: 200,
            item_fetch_concurrency: 1,
            write_concurrency: 4,
            event_batch_size: 250,
            sync_timeout: None,
        }
    }
}

/// A sync invocation. Unset limits fall back to [`SyncConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub run_type: SyncRunType,
    pub lookback_days: Option<u32>,
    pub marketplace_id: Option<String>,
    pub max_pages: Option<u32>,
    pub max_orders: Option<usize>,
    pub max_orders_with_items: Option<usize>,
    pub page_size: Option<u32>,
    #[serde(default)]
    pub dry_run: bool,
}

/// A request with every limit resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub run_type: SyncRunType,
    pub marketplace_id: String,
    pub lookback_days: u32,
    pub max_pages: u32,
    pub max_orders: usize,
    pub max_orders_with_items: usize,
    pub page_size: u32,
    pub dry_run: bool,
}

impl ResolvedRequest {
    /// Limits as recorded on the run ledger.
    pub fn limits_json(&self) -> Value {
        json!({
            "maxPages": self.max_pages,
            "maxOrders": self.max_orders,
            "maxOrdersWithItems": self.max_orders_with_items,
            "pageSize": self.page_size,
        })
    }
}

fn invalid(message: String) -> Error {
    Error::Validation(ValidationError::InvalidInput(message))
}

impl SyncRequest {
    pub fn resolve(&self, config: &SyncConfig) -> Result<ResolvedRequest> {
        let marketplace_id = self
            .marketplace_id
            .clone()
            .or_else(|| config.default_marketplace_id.clone())
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| Error::MissingConfigKey("marketplace_id".to_string()))?;

        let page_size = self.page_size.unwrap_or(config.page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(invalid(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        let max_pages = self.max_pages.unwrap_or(config.max_pages);
        if max_pages == 0 {
            return Err(invalid("max_pages must be at least 1".to_string()));
        }

        let max_orders = self.max_orders.unwrap_or(config.max_orders);
        if max_orders == 0 {
            return Err(invalid("max_orders must be at least 1".to_string()));
        }

        Ok(ResolvedRequest {
            run_type: self.run_type,
            marketplace_id,
            lookback_days: self.lookback_days.unwrap_or(config.default_lookback_days),
            max_pages,
            max_orders,
            max_orders_with_items: self
                .max_orders_with_items
                .unwrap_or(config.max_orders_with_items),
            page_size,
            dry_run: self.dry_run,
        })
    }
}
