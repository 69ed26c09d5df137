//! Financial events module - normalization, content keys and repository trait.

mod event_key;
mod event_shapes;
mod finances_model;
mod finances_traits;
mod flatten;
mod walker;

#[cfg(test)]
mod flatten_tests;

pub use event_key::{compute_event_key, occurrence_fingerprint};
pub use event_shapes::{
    AdjustmentEvent, EventShape, MoneyAmount, ProductAdsPaymentEvent, ServiceFeeEvent,
    ShipmentEvent, ShipmentItem,
};
pub use finances_model::{EventBatchOutcome, EventWrite, FinancialEvent, RefundAllocation};
pub use finances_traits::FinancialEventRepositoryTrait;
pub use flatten::{
    event_type_for, extract_entry, extract_generic, flatten_page, ExtractedEntry, FlattenContext,
    FlattenedPage,
};
