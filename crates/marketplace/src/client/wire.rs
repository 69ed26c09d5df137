//! Wire format of the Selling Partner API responses and mapping to domain types.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use sellerledger_core::orders::{Order, OrderItem};
use sellerledger_core::utils::time_utils::parse_timestamp;

use crate::errors::MarketplaceError;

/// `{"payload": ..., "errors": [...]}` envelope of every v0 response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub payload: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEntry {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorEntry {
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => format!("{}: {}", code, msg),
            (Some(code), None) => code.clone(),
            (None, Some(msg)) => msg.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LwaTokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_lifetime")]
    pub expires_in: i64,
}

fn default_token_lifetime() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Money {
    pub currency_code: Option<String>,
    pub amount: Option<String>,
}

impl Money {
    fn value(&self) -> Option<Decimal> {
        self.amount
            .as_deref()
            .and_then(|a| Decimal::from_str(a.trim()).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrdersPayload {
    #[serde(default)]
    pub orders: Vec<ApiOrder>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ShippingAddress {
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApiOrder {
    pub amazon_order_id: String,
    pub purchase_date: String,
    pub order_status: Option<String>,
    pub marketplace_id: Option<String>,
    pub order_total: Option<Money>,
    pub fulfillment_channel: Option<String>,
    pub number_of_items_shipped: Option<i32>,
    pub number_of_items_unshipped: Option<i32>,
    pub shipping_address: Option<ShippingAddress>,
}

impl ApiOrder {
    /// Maps to the domain order. `fallback_marketplace` fills a missing id.
    pub fn into_order(self, fallback_marketplace: &str) -> Result<Order, MarketplaceError> {
        let purchase_date = parse_timestamp(&self.purchase_date).ok_or_else(|| {
            MarketplaceError::Decode(format!(
                "order {} has invalid PurchaseDate '{}'",
                self.amazon_order_id, self.purchase_date
            ))
        })?;

        let number_of_items = match (self.number_of_items_shipped, self.number_of_items_unshipped) {
            (None, None) => None,
            (shipped, unshipped) => Some(shipped.unwrap_or(0) + unshipped.unwrap_or(0)),
        };

        Ok(Order {
            purchase_date,
            status: self.order_status.unwrap_or_else(|| "Unknown".to_string()),
            marketplace_id: self
                .marketplace_id
                .unwrap_or_else(|| fallback_marketplace.to_string()),
            buyer_country: self.shipping_address.and_then(|a| a.country_code),
            total_amount: self.order_total.as_ref().and_then(Money::value),
            currency: self.order_total.and_then(|m| m.currency_code),
            fulfillment_channel: self.fulfillment_channel,
            number_of_items,
            order_id: self.amazon_order_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrderItemsPayload {
    #[serde(default)]
    pub order_items: Vec<ApiOrderItem>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApiOrderItem {
    #[serde(rename = "ASIN")]
    pub asin: Option<String>,
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    pub order_item_id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub quantity_ordered: i32,
    pub item_price: Option<Money>,
    pub item_tax: Option<Money>,
    pub promotion_discount: Option<Money>,
}

impl ApiOrderItem {
    /// `ItemPrice` is the line total. It is kept as-is; the unit price is
    /// derived from it and may not multiply back exactly.
    pub fn into_item(self, order_id: &str) -> OrderItem {
        let line_total = self.item_price.as_ref().and_then(Money::value);
        let line_price = line_total.unwrap_or(Decimal::ZERO);
        let unit_price = if self.quantity_ordered > 0 {
            line_price / Decimal::from(self.quantity_ordered)
        } else {
            line_price
        };
        let currency = self
            .item_price
            .as_ref()
            .and_then(|m| m.currency_code.clone());

        OrderItem {
            order_id: order_id.to_string(),
            order_item_id: self.order_item_id,
            sku: self.seller_sku,
            asin: self.asin,
            title: self.title,
            quantity: self.quantity_ordered,
            unit_price,
            line_total,
            item_tax: self
                .item_tax
                .as_ref()
                .and_then(Money::value)
                .unwrap_or(Decimal::ZERO),
            promotion_discount: self
                .promotion_discount
                .as_ref()
                .and_then(Money::value)
                .unwrap_or(Decimal::ZERO),
            currency,
            refunded: false,
            product_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct FinancialEventsPayload {
    #[serde(default)]
    pub financial_events: Value,
    pub next_token: Option<String>,
}
