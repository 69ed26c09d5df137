//! Daily profit and loss summaries.

mod aggregator;
mod classifier;
mod summaries_model;
mod summaries_service;
mod summaries_traits;

pub use aggregator::aggregate_daily;
pub use classifier::{classify_event, EventCategory};
pub use summaries_model::DailySummary;
pub use summaries_service::DailySummaryService;
pub use summaries_traits::DailySummaryRepositoryTrait;
