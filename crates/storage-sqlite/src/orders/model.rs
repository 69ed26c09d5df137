//! Database models for orders and order items.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sellerledger_core::orders::{Order, OrderItem};

use crate::utils::{decimal_to_text, text_to_decimal, text_to_timestamp, timestamp_to_text};

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
#[diesel(table_name = crate::schema::orders)]
#[diesel(primary_key(order_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderDB {
    pub order_id: String,
    pub purchase_date: String,
    pub status: String,
    pub marketplace_id: String,
    pub buyer_country: Option<String>,
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub fulfillment_channel: Option<String>,
    pub number_of_items: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderDB {
    pub fn from_domain(order: Order, now: &str) -> Self {
        Self {
            purchase_date: timestamp_to_text(&order.purchase_date),
            status: order.status,
            marketplace_id: order.marketplace_id,
            buyer_country: order.buyer_country,
            total_amount: order.total_amount.map(decimal_to_text),
            currency: order.currency,
            fulfillment_channel: order.fulfillment_channel,
            number_of_items: order.number_of_items,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            order_id: order.order_id,
        }
    }
}

impl From<OrderDB> for Order {
    fn from(db: OrderDB) -> Self {
        Self {
            order_id: db.order_id,
            purchase_date: text_to_timestamp(&db.purchase_date),
            status: db.status,
            marketplace_id: db.marketplace_id,
            buyer_country: db.buyer_country,
            total_amount: db.total_amount.as_deref().map(text_to_decimal),
            currency: db.currency,
            fulfillment_channel: db.fulfillment_channel,
            number_of_items: db.number_of_items,
        }
    }
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(primary_key(order_id, order_item_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItemDB {
    pub order_id: String,
    pub order_item_id: String,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub title: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: Option<String>,
    pub item_tax: String,
    pub promotion_discount: String,
    pub currency: Option<String>,
    pub refunded: bool,
    pub product_id: Option<String>,
}

impl From<OrderItem> for OrderItemDB {
    fn from(item: OrderItem) -> Self {
        Self {
            order_id: item.order_id,
            order_item_id: item.order_item_id,
            sku: item.sku,
            asin: item.asin,
            title: item.title,
            quantity: item.quantity,
            unit_price: decimal_to_text(item.unit_price),
            line_total: item.line_total.map(decimal_to_text),
            item_tax: decimal_to_text(item.item_tax),
            promotion_discount: decimal_to_text(item.promotion_discount),
            currency: item.currency,
            refunded: item.refunded,
            product_id: item.product_id,
        }
    }
}

impl From<OrderItemDB> for OrderItem {
    fn from(db: OrderItemDB) -> Self {
        Self {
            order_id: db.order_id,
            order_item_id: db.order_item_id,
            sku: db.sku,
            asin: db.asin,
            title: db.title,
            quantity: db.quantity,
            unit_price: text_to_decimal(&db.unit_price),
            line_total: db.line_total.as_deref().map(text_to_decimal),
            item_tax: text_to_decimal(&db.item_tax),
            promotion_discount: text_to_decimal(&db.promotion_discount),
            currency: db.currency,
            refunded: db.refunded,
            product_id: db.product_id,
        }
    }
}
