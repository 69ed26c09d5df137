//! SQLite storage implementation for SellerLedger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `sellerledger-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for orders, financial events, summaries and sync runs
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` and `sync` are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          sync (pipeline)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod finances;
pub mod orders;
pub mod products;
pub mod summaries;
pub mod sync_runs;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use finances::FinancialEventRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use summaries::DailySummaryRepository;
pub use sync_runs::SyncRunRepository;

// Re-export from sellerledger-core for convenience
pub use sellerledger_core::errors::{DatabaseError, Error, Result};
