//! SellerLedger Core - Domain entities, services, and traits.
//!
//! This crate contains the reconciliation and P&L logic for SellerLedger.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod finances;
pub mod orders;
pub mod products;
pub mod refunds;
pub mod summaries;
pub mod sync;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
