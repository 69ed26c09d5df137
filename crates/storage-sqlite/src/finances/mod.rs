//! SQLite storage implementation for financial events and refund allocations.

mod model;
mod repository;

pub use model::{FinancialEventDB, RefundAllocationDB};
pub use repository::FinancialEventRepository;
