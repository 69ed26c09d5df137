//! SQLite storage implementation for the product cost reference set.

mod model;
mod repository;

pub use model::ProductDB;
pub use repository::ProductRepository;
