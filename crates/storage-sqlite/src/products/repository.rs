use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use sellerledger_core::errors::{Result, ValidationError};
use sellerledger_core::products::{Product, ProductRepositoryTrait};
use sellerledger_core::Error;

use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::products;
use crate::utils::timestamp_to_text;

use super::model::ProductDB;

pub struct ProductRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ProductRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    fn list_products(&self) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = products::table
            .order(products::id.asc())
            .load::<ProductDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn upsert_product(&self, product: Product) -> Result<Product> {
        if product.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Product id cannot be empty".to_string(),
            )));
        }

        self.writer
            .exec(move |conn| {
                let row = ProductDB::from_domain(product, &timestamp_to_text(&Utc::now()));

                let saved = diesel::insert_into(products::table)
                    .values(&row)
                    .on_conflict(products::id)
                    .do_update()
                    .set(&row)
                    .get_result::<ProductDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(saved.into())
            })
            .await
    }
}
