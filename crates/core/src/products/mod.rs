//! Products module - the cost reference set.

mod products_model;

pub use products_model::{CostLookup, Product};

use async_trait::async_trait;

use crate::errors::Result;

/// Read access to the product cost reference set.
///
/// The catalog itself is maintained outside the sync pipeline; `upsert_product`
/// exists for seeding.
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    fn list_products(&self) -> Result<Vec<Product>>;

    async fn upsert_product(&self, product: Product) -> Result<Product>;
}
