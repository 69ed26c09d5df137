//! Sync run ledger models.

mod sync_run_model;

pub use sync_run_model::*;
