//! Retrying transport for upstream calls.
//!
//! Wraps a single call with bounded retry. Only throttling and transient
//! server statuses are retried; every other failure, and the last failure once
//! attempts run out, is returned untouched.

use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::client::MarketplaceApiClient;
use crate::errors::{MarketplaceError, RetryClass};
use crate::models::{
    FinancialEventsPage, FinancialEventsQuery, OrderItemsPage, OrdersPage, OrdersQuery,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Fixed slack added on top of the hinted request interval.
const RATE_LIMIT_PADDING_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, after `attempt` (1-based) failed with `error`.
    ///
    /// A 429 carrying a rate hint waits one request interval plus padding,
    /// clamped to `[base_delay, max_delay]`. Anything else backs off
    /// exponentially from `base_delay`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, error: &MarketplaceError) -> Duration {
        if error.status() == Some(429) {
            if let Some(hint) = error.rate_limit_hint().filter(|h| h.is_finite() && *h > 0.0) {
                let interval_ms = (1000.0 / hint).ceil() as u64;
                let delay = Duration::from_millis(interval_ms.saturating_add(RATE_LIMIT_PADDING_MS));
                return delay.clamp(self.base_delay, self.max_delay.max(self.base_delay));
            }
        }
        self.backoff(attempt)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Runs `call` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, MarketplaceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketplaceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts || err.retry_class() == RetryClass::Never {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt, &err);
                warn!(
                    "{} failed on attempt {}/{} ({}), retrying in {}ms",
                    operation,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Client decorator that routes every call through [`call_with_retry`].
pub struct RetryingClient {
    inner: Arc<dyn MarketplaceApiClient>,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn MarketplaceApiClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl MarketplaceApiClient for RetryingClient {
    async fn get_orders(
        &self,
        query: &OrdersQuery,
        next_token: Option<&str>,
    ) -> Result<OrdersPage, MarketplaceError> {
        call_with_retry(&self.policy, "getOrders", || {
            self.inner.get_orders(query, next_token)
        })
        .await
    }

    async fn get_order_items(
        &self,
        order_id: &str,
        next_token: Option<&str>,
    ) -> Result<OrderItemsPage, MarketplaceError> {
        call_with_retry(&self.policy, "getOrderItems", || {
            self.inner.get_order_items(order_id, next_token)
        })
        .await
    }

    async fn get_financial_events(
        &self,
        query: &FinancialEventsQuery,
        next_token: Option<&str>,
    ) -> Result<FinancialEventsPage, MarketplaceError> {
        call_with_retry(&self.policy, "listFinancialEvents", || {
            self.inner.get_financial_events(query, next_token)
        })
        .await
    }
}
