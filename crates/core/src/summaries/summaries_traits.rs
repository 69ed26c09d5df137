use async_trait::async_trait;
use chrono::NaiveDate;

use super::summaries_model::DailySummary;
use crate::errors::Result;

#[async_trait]
pub trait DailySummaryRepositoryTrait: Send + Sync {
    /// Upserts every row by `(date, marketplace_id)`, replacing all metrics.
    async fn replace_summaries(&self, summaries: Vec<DailySummary>) -> Result<usize>;

    fn get_summaries(
        &self,
        marketplace_id: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>>;
}
