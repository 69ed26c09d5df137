//! SellerLedger server - HTTP host for sync runs and daily summaries.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;

pub use main_lib::{build_state, init_tracing, AppState};
