//! SellerLedger Sync - the order and financial event pipeline.
//!
//! A run collects orders (with line items) and financial events from the
//! marketplace, reconciles them into the store, allocates refunds to line items
//! and recomputes the daily summaries of the run's window. Every run is
//! recorded in the sync run ledger.

pub mod config;
pub mod event_collector;
pub mod orchestrator;
pub mod order_collector;
pub mod reconciliation;
pub mod report;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod collector_tests;

pub use config::{ResolvedRequest, SyncConfig, SyncRequest};
pub use event_collector::{EventCollection, FinancialEventCollector};
pub use orchestrator::{SyncOrchestrator, SyncRepositories};
pub use order_collector::{OrderCollection, OrderCollector, OrderLimits};
pub use reconciliation::{AppliedWrites, ReconciliationPlan, ReconciliationWriter};
pub use report::{EventDiagnostics, OrderDiagnostics, SyncCounts, SyncDiagnostics, SyncReport};
