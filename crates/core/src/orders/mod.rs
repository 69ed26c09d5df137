//! Orders module - domain models and repository trait.

mod orders_model;
mod orders_traits;

pub use orders_model::{CollectedOrder, Order, OrderItem, OrderUpsertOutcome};
pub use orders_traits::OrderRepositoryTrait;
