use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sellerledger_core::summaries::DailySummary;

use crate::utils::{date_to_text, decimal_to_text, text_to_date, text_to_decimal};

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
#[diesel(table_name = crate::schema::daily_summaries)]
#[diesel(primary_key(date, marketplace_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailySummaryDB {
    pub date: String,
    pub marketplace_id: String,
    pub currency: String,
    pub sales: String,
    pub orders: i32,
    pub units: i32,
    pub refunds: String,
    pub amazon_fees: String,
    pub other_fees: String,
    pub net_payout: String,
    pub cogs: String,
    pub gross_profit: String,
    pub net_profit: String,
    pub cost_misses: i32,
}

impl From<DailySummary> for DailySummaryDB {
    fn from(s: DailySummary) -> Self {
        Self {
            date: date_to_text(s.date),
            marketplace_id: s.marketplace_id,
            currency: s.currency,
            sales: decimal_to_text(s.sales),
            orders: s.orders,
            units: s.units,
            refunds: decimal_to_text(s.refunds),
            amazon_fees: decimal_to_text(s.amazon_fees),
            other_fees: decimal_to_text(s.other_fees),
            net_payout: decimal_to_text(s.net_payout),
            cogs: decimal_to_text(s.cogs),
            gross_profit: decimal_to_text(s.gross_profit),
            net_profit: decimal_to_text(s.net_profit),
            cost_misses: s.cost_misses,
        }
    }
}

impl From<DailySummaryDB> for DailySummary {
    fn from(db: DailySummaryDB) -> Self {
        Self {
            date: text_to_date(&db.date).unwrap_or_default(),
            marketplace_id: db.marketplace_id,
            currency: db.currency,
            sales: text_to_decimal(&db.sales),
            orders: db.orders,
            units: db.units,
            refunds: text_to_decimal(&db.refunds),
            amazon_fees: text_to_decimal(&db.amazon_fees),
            other_fees: text_to_decimal(&db.other_fees),
            net_payout: text_to_decimal(&db.net_payout),
            cogs: text_to_decimal(&db.cogs),
            gross_profit: text_to_decimal(&db.gross_profit),
            net_profit: text_to_decimal(&db.net_profit),
            cost_misses: db.cost_misses,
        }
    }
}
