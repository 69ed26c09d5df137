use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profit and loss of one marketplace on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub marketplace_id: String,
    pub currency: String,
    pub sales: Decimal,
    pub orders: i32,
    pub units: i32,
    pub refunds: Decimal,
    pub amazon_fees: Decimal,
    pub other_fees: Decimal,
    pub net_payout: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    /// Item lines whose unit cost could not be found.
    pub cost_misses: i32,
}

impl DailySummary {
    pub fn empty(date: NaiveDate, marketplace_id: &str, currency: &str) -> Self {
        Self {
            date,
            marketplace_id: marketplace_id.to_string(),
            currency: currency.to_string(),
            sales: Decimal::ZERO,
            orders: 0,
            units: 0,
            refunds: Decimal::ZERO,
            amazon_fees: Decimal::ZERO,
            other_fees: Decimal::ZERO,
            net_payout: Decimal::ZERO,
            cogs: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            cost_misses: 0,
        }
    }

    /// Derives the profit fields from the accumulated metrics.
    pub fn finalize(&mut self) {
        self.gross_profit = self.sales - self.amazon_fees - self.cogs;
        self.net_profit = self.gross_profit - self.other_fees;
    }
}
