//! SellerLedger Marketplace - upstream feeds of the Selling Partner API.
//!
//! This crate provides:
//! - [`MarketplaceApiClient`]: one-page reads of the orders, order-items and
//!   financial-events feeds
//! - [`SpApiClient`]: the HTTP implementation, with access-token exchange
//! - [`RetryingClient`]: the retrying transport wrapped around any client
//! - [`MarketplaceError`]: status-carrying errors with retry classification

pub mod client;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod transport;

pub use client::{MarketplaceApiClient, SpApiClient, RATE_LIMIT_HEADER};
pub use credentials::MarketplaceCredentials;
pub use errors::{MarketplaceError, RetryClass};
pub use models::{
    FinancialEventsPage, FinancialEventsQuery, OrderItemsPage, OrdersPage, OrdersQuery,
};
pub use transport::{call_with_retry, RetryPolicy, RetryingClient};
