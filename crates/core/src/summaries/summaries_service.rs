use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::aggregator::aggregate_daily;
use super::summaries_model::DailySummary;
use super::summaries_traits::DailySummaryRepositoryTrait;
use crate::errors::{Result, ValidationError};
use crate::finances::FinancialEventRepositoryTrait;
use crate::orders::OrderRepositoryTrait;
use crate::products::{CostLookup, ProductRepositoryTrait};
use crate::utils::time_utils::get_days_between;

/// Recomputes daily summaries from persisted orders and events.
pub struct DailySummaryService {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    event_repository: Arc<dyn FinancialEventRepositoryTrait>,
    product_repository: Arc<dyn ProductRepositoryTrait>,
    summary_repository: Arc<dyn DailySummaryRepositoryTrait>,
}

impl DailySummaryService {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        event_repository: Arc<dyn FinancialEventRepositoryTrait>,
        product_repository: Arc<dyn ProductRepositoryTrait>,
        summary_repository: Arc<dyn DailySummaryRepositoryTrait>,
    ) -> Self {
        Self {
            order_repository,
            event_repository,
            product_repository,
            summary_repository,
        }
    }

    /// Computes summaries for `[start, end]` without writing them.
    pub fn compute(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "summary range start {} is after end {}",
                start, end
            ))
            .into());
        }

        let orders = self
            .order_repository
            .get_orders_purchased_between(marketplace_id, start, end)?;
        let order_ids: Vec<String> = orders.iter().map(|o| o.order_id.clone()).collect();
        let items = self.order_repository.get_items_for_orders(&order_ids)?;
        let events = self
            .event_repository
            .get_events_posted_between(marketplace_id, start, end)?;
        let costs = CostLookup::new(self.product_repository.list_products()?);

        debug!(
            "Aggregating {} orders and {} events for {} ({} to {})",
            orders.len(),
            events.len(),
            marketplace_id,
            start,
            end
        );

        let dates = get_days_between(start, end);
        Ok(aggregate_daily(
            &dates,
            marketplace_id,
            &orders,
            &items,
            &events,
            &costs,
        ))
    }

    /// Recomputes and fully replaces every date in `[start, end]`.
    pub async fn recompute(
        &self,
        marketplace_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        let summaries = self.compute(marketplace_id, start, end)?;
        self.summary_repository
            .replace_summaries(summaries.clone())
            .await?;
        Ok(summaries)
    }

    pub fn get_summaries(
        &self,
        marketplace_id: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        self.summary_repository
            .get_summaries(marketplace_id, start, end)
    }
}
