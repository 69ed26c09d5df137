//! SQLite storage implementation for orders and their line items.

mod model;
mod repository;

pub use model::{OrderDB, OrderItemDB};
pub use repository::OrderRepository;
