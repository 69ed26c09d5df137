//! Upstream client trait and its Selling Partner API implementation.

mod sp_api;
mod wire;

pub use sp_api::{SpApiClient, RATE_LIMIT_HEADER};

use async_trait::async_trait;

use crate::errors::MarketplaceError;
use crate::models::{
    FinancialEventsPage, FinancialEventsQuery, OrderItemsPage, OrdersPage, OrdersQuery,
};

/// Paginated reads of the three upstream feeds.
///
/// Each call fetches exactly one page; `next_token` continues a previous call.
/// Errors keep the HTTP status so the transport can classify them.
#[async_trait]
pub trait MarketplaceApiClient: Send + Sync {
    async fn get_orders(
        &self,
        query: &OrdersQuery,
        next_token: Option<&str>,
    ) -> Result<OrdersPage, MarketplaceError>;

    async fn get_order_items(
        &self,
        order_id: &str,
        next_token: Option<&str>,
    ) -> Result<OrderItemsPage, MarketplaceError>;

    async fn get_financial_events(
        &self,
        query: &FinancialEventsQuery,
        next_token: Option<&str>,
    ) -> Result<FinancialEventsPage, MarketplaceError>;
}
