use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sellerledger_core::products::Product;

use crate::utils::{decimal_to_text, text_to_decimal};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ProductDB {
    pub id: String,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub title: Option<String>,
    pub unit_cost: Option<String>,
    pub currency: Option<String>,
    pub updated_at: String,
}

impl ProductDB {
    pub fn from_domain(product: Product, now: &str) -> Self {
        Self {
            id: product.id,
            sku: product.sku,
            asin: product.asin,
            title: product.title,
            unit_cost: product.unit_cost.map(decimal_to_text),
            currency: product.currency,
            updated_at: now.to_string(),
        }
    }
}

impl From<ProductDB> for Product {
    fn from(db: ProductDB) -> Self {
        Self {
            id: db.id,
            sku: db.sku,
            asin: db.asin,
            title: db.title,
            unit_cost: db.unit_cost.as_deref().map(text_to_decimal),
            currency: db.currency,
        }
    }
}
