//! Database models for financial events.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sellerledger_core::finances::{FinancialEvent, RefundAllocation};

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
#[diesel(table_name = crate::schema::financial_events)]
#[diesel(primary_key(event_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct FinancialEventDB {
    pub event_key: String,
    pub event_type: String,
    pub posted_date: String,
    pub upstream_order_id: Option<String>,
    pub order_id: Option<String>,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub amount: String,
    pub currency: String,
    pub occurrence_index: i32,
    pub marketplace_id: Option<String>,
    pub raw: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl FinancialEventDB {
    pub fn from_domain(event: FinancialEvent, now: &str) -> Self {
        Self {
            event_key: event.event_key,
            event_type: event.event_type,
            posted_date: timestamp_to_text(&event.posted_date),
            upstream_order_id: event.upstream_order_id,
            order_id: event.order_id,
            sku: event.sku,
            asin: event.asin,
            amount: decimal_to_text(event.amount),
            currency: event.currency,
            occurrence_index: i32::try_from(event.occurrence_index).unwrap_or(i32::MAX),
            marketplace_id: event.marketplace_id,
            raw: event.raw.map(|v| v.to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

impl From<FinancialEventDB> for FinancialEvent {
    fn from(db: FinancialEventDB) -> Self {
        Self {
            event_key: db.event_key,
            event_type: db.event_type,
            posted_date: text_to_timestamp(&db.posted_date),
            upstream_order_id: db.upstream_order_id,
            order_id: db.order_id,
            sku: db.sku,
            asin: db.asin,
            amount: text_to_decimal(&db.amount),
            currency: db.currency,
            occurrence_index: u32::try_from(db.occurrence_index).unwrap_or(0),
            marketplace_id: db.marketplace_id,
            raw: db.raw.and_then(|s| serde_json::from_str(&s).ok()),
        }
    }
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::refund_allocations)]
#[diesel(primary_key(event_key, order_id, order_item_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RefundAllocationDB {
    pub event_key: String,
    pub order_id: String,
    pub order_item_id: String,
    pub amount: String,
}

impl From<RefundAllocation> for RefundAllocationDB {
    fn from(a: RefundAllocation) -> Self {
        Self {
            event_key: a.event_key,
            order_id: a.order_id,
            order_item_id: a.order_item_id,
            amount: decimal_to_text(a.amount),
        }
    }
}

impl From<RefundAllocationDB> for RefundAllocation {
    fn from(db: RefundAllocationDB) -> Self {
        Self {
            event_key: db.event_key,
            order_id: db.order_id,
            order_item_id: db.order_item_id,
            amount: text_to_decimal(&db.amount),
        }
    }
}
