//! Product cost reference models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog product with its unit cost, used for COGS and item linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub title: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub currency: Option<String>,
}

/// In-memory index over the product set, matching by SKU first, then ASIN.
#[derive(Debug, Clone, Default)]
pub struct CostLookup {
    by_sku: HashMap<String, Product>,
    by_asin: HashMap<String, Product>,
}

impl CostLookup {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let mut lookup = Self::default();
        for product in products {
            if let Some(sku) = product.sku.as_deref().filter(|s| !s.is_empty()) {
                lookup.by_sku.insert(sku.to_string(), product.clone());
            }
            if let Some(asin) = product.asin.as_deref().filter(|s| !s.is_empty()) {
                lookup.by_asin.insert(asin.to_string(), product.clone());
            }
        }
        lookup
    }

    pub fn find(&self, sku: Option<&str>, asin: Option<&str>) -> Option<&Product> {
        sku.and_then(|s| self.by_sku.get(s))
            .or_else(|| asin.and_then(|a| self.by_asin.get(a)))
    }

    pub fn product_id(&self, sku: Option<&str>, asin: Option<&str>) -> Option<String> {
        self.find(sku, asin).map(|p| p.id.clone())
    }

    /// Unit cost for a line. A product without a cost counts as a miss.
    pub fn unit_cost(&self, sku: Option<&str>, asin: Option<&str>) -> Option<Decimal> {
        self.find(sku, asin).and_then(|p| p.unit_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str, sku: Option<&str>, asin: Option<&str>, cost: Option<Decimal>) -> Product {
        Product {
            id: id.to_string(),
            sku: sku.map(String::from),
            asin: asin.map(String::from),
            title: None,
            unit_cost: cost,
            currency: Some("USD".to_string()),
        }
    }

    #[test]
    fn test_sku_match_wins_over_asin() {
        let lookup = CostLookup::new(vec![
            product("p1", Some("SKU-1"), Some("B000A"), Some(dec!(4.50))),
            product("p2", Some("SKU-2"), Some("B000B"), Some(dec!(7))),
        ]);

        assert_eq!(lookup.unit_cost(Some("SKU-1"), Some("B000B")), Some(dec!(4.50)));
        assert_eq!(lookup.product_id(None, Some("B000B")), Some("p2".to_string()));
    }

    #[test]
    fn test_missing_cost_is_a_miss() {
        let lookup = CostLookup::new(vec![product("p1", Some("SKU-1"), None, None)]);

        assert_eq!(lookup.product_id(Some("SKU-1"), None), Some("p1".to_string()));
        assert_eq!(lookup.unit_cost(Some("SKU-1"), None), None);
        assert_eq!(lookup.unit_cost(Some("UNKNOWN"), None), None);
    }
}
