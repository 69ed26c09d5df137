//! Pure daily P&L aggregation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::classifier::{classify_event, EventCategory};
use super::summaries_model::DailySummary;
use crate::constants::DEFAULT_CURRENCY;
use crate::finances::FinancialEvent;
use crate::orders::{Order, OrderItem};
use crate::products::CostLookup;

/// Builds one summary per date in `dates` for `marketplace_id`.
///
/// `orders` and `events` may span more than `dates`; anything outside is
/// ignored. Dates without activity produce zero rows.
pub fn aggregate_daily(
    dates: &[NaiveDate],
    marketplace_id: &str,
    orders: &[Order],
    items: &HashMap<String, Vec<OrderItem>>,
    events: &[FinancialEvent],
    costs: &CostLookup,
) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    let mut currencies: HashMap<NaiveDate, String> = HashMap::new();

    for date in dates {
        days.insert(*date, DailySummary::empty(*date, marketplace_id, DEFAULT_CURRENCY));
    }

    for order in orders {
        if order.is_canceled() || order.marketplace_id != marketplace_id {
            continue;
        }
        let date = order.purchase_date.date_naive();
        let Some(day) = days.get_mut(&date) else {
            continue;
        };
        if let Some(currency) = order.currency.as_ref() {
            currencies.entry(date).or_insert_with(|| currency.clone());
        }

        day.orders += 1;
        match items.get(&order.order_id).filter(|lines| !lines.is_empty()) {
            Some(lines) => {
                for line in lines {
                    day.sales += line.line_sales();
                    day.units += line.quantity;
                    match costs.unit_cost(line.sku.as_deref(), line.asin.as_deref()) {
                        Some(cost) => day.cogs += cost * Decimal::from(line.quantity),
                        None => day.cost_misses += 1,
                    }
                }
            }
            None => {
                day.sales += order.total_amount.unwrap_or(Decimal::ZERO);
                day.units += order.number_of_items.unwrap_or(0);
            }
        }
    }

    for event in events {
        if event
            .marketplace_id
            .as_deref()
            .is_some_and(|m| m != marketplace_id)
        {
            continue;
        }
        let date = event.posted_date.date_naive();
        let Some(day) = days.get_mut(&date) else {
            continue;
        };
        currencies
            .entry(date)
            .or_insert_with(|| event.currency.clone());

        match classify_event(&event.event_type) {
            EventCategory::Refund => day.refunds += event.amount.abs(),
            EventCategory::AmazonFee => day.amazon_fees -= event.amount,
            EventCategory::OtherFee => day.other_fees -= event.amount,
            EventCategory::Payout => day.net_payout += event.amount.abs(),
            EventCategory::Unclassified => {}
        }
    }

    days.into_values()
        .map(|mut day| {
            if let Some(currency) = currencies.remove(&day.date) {
                day.currency = currency;
            }
            day.finalize();
            day
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::Product;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    const MARKETPLACE: &str = "ATVPDKIKX0DER";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn order(id: &str, d: u32, status: &str, total: Decimal) -> Order {
        Order {
            order_id: id.to_string(),
            purchase_date: Utc.with_ymd_and_hms(2025, 1, d, 15, 0, 0).unwrap(),
            status: status.to_string(),
            marketplace_id: MARKETPLACE.to_string(),
            buyer_country: Some("US".to_string()),
            total_amount: Some(total),
            currency: Some("USD".to_string()),
            fulfillment_channel: None,
            number_of_items: Some(1),
        }
    }

    fn line(order_id: &str, id: &str, sku: &str, quantity: i32, price: Decimal) -> OrderItem {
        OrderItem {
            order_id: order_id.to_string(),
            order_item_id: id.to_string(),
            sku: Some(sku.to_string()),
            asin: None,
            title: None,
            quantity,
            unit_price: price,
            line_total: None,
            item_tax: Decimal::ZERO,
            promotion_discount: Decimal::ZERO,
            currency: Some("USD".to_string()),
            refunded: false,
            product_id: None,
        }
    }

    fn event(event_type: &str, d: u32, amount: Decimal) -> FinancialEvent {
        FinancialEvent {
            event_key: format!("{}-{}-{}", event_type, d, amount),
            event_type: event_type.to_string(),
            posted_date: Utc.with_ymd_and_hms(2025, 1, d, 9, 0, 0).unwrap(),
            upstream_order_id: None,
            order_id: None,
            sku: None,
            asin: None,
            amount,
            currency: "USD".to_string(),
            occurrence_index: 0,
            marketplace_id: Some(MARKETPLACE.to_string()),
            raw: None,
        }
    }

    fn costs() -> CostLookup {
        CostLookup::new(vec![Product {
            id: "p1".to_string(),
            sku: Some("SKU-1".to_string()),
            asin: None,
            title: None,
            unit_cost: Some(dec!(4)),
            currency: Some("USD".to_string()),
        }])
    }

    #[test]
    fn test_daily_metrics() {
        let orders = vec![
            order("A", 1, "Shipped", dec!(50)),
            order("B", 1, "Shipped", dec!(12.50)),
            order("C", 1, "Canceled", dec!(99)),
        ];
        let mut items = HashMap::new();
        items.insert(
            "A".to_string(),
            vec![
                line("A", "1", "SKU-1", 2, dec!(10)),
                line("A", "2", "SKU-X", 1, dec!(30)),
            ],
        );
        let events = vec![
            event("RefundEvent", 1, dec!(-5)),
            event("ServiceFeeEvent", 1, dec!(-3)),
            event("ServiceFeeEvent", 1, dec!(1)),
            event("ProductAdsPaymentEvent", 1, dec!(-7)),
            event("PayoutEvent", 1, dec!(-100)),
            event("ShipmentEvent", 1, dec!(40)),
        ];

        let summaries = aggregate_daily(&[day(1)], MARKETPLACE, &orders, &items, &events, &costs());
        let s = &summaries[0];

        assert_eq!(s.orders, 2);
        assert_eq!(s.sales, dec!(62.50));
        assert_eq!(s.units, 4);
        assert_eq!(s.cogs, dec!(8));
        assert_eq!(s.cost_misses, 1);
        assert_eq!(s.refunds, dec!(5));
        assert_eq!(s.amazon_fees, dec!(2));
        assert_eq!(s.other_fees, dec!(7));
        assert_eq!(s.net_payout, dec!(100));
        assert_eq!(s.gross_profit, dec!(52.50));
        assert_eq!(s.net_profit, dec!(45.50));
        assert_eq!(s.currency, "USD");
    }

    #[test]
    fn test_empty_days_produce_zero_rows() {
        let summaries = aggregate_daily(
            &[day(1), day(2)],
            MARKETPLACE,
            &[order("A", 2, "Shipped", dec!(10))],
            &HashMap::new(),
            &[],
            &CostLookup::default(),
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].date, day(1));
        assert_eq!(summaries[0].sales, Decimal::ZERO);
        assert_eq!(summaries[0].orders, 0);
        assert_eq!(summaries[1].sales, dec!(10));
    }

    #[test]
    fn test_rows_outside_window_are_ignored() {
        let mut other = order("B", 1, "Shipped", dec!(10));
        other.marketplace_id = "A1F83G8C2ARO7P".to_string();
        let summaries = aggregate_daily(
            &[day(1)],
            MARKETPLACE,
            &[order("A", 5, "Shipped", dec!(10)), other],
            &HashMap::new(),
            &[event("RefundEvent", 6, dec!(-1))],
            &CostLookup::default(),
        );
        assert_eq!(summaries[0].orders, 0);
        assert_eq!(summaries[0].refunds, Decimal::ZERO);
    }

    #[test]
    fn test_profit_identities_hold() {
        let orders = vec![order("A", 3, "Shipped", dec!(19.99))];
        let events = vec![
            event("ServiceFeeEvent", 3, dec!(-2.10)),
            event("CouponPaymentEvent", 3, dec!(-0.60)),
        ];
        let summaries = aggregate_daily(&[day(3)], MARKETPLACE, &orders, &HashMap::new(), &events, &costs());
        let s = &summaries[0];

        assert_eq!(s.gross_profit, s.sales - s.amazon_fees - s.cogs);
        assert_eq!(s.net_profit, s.gross_profit - s.other_fees);
    }
}
