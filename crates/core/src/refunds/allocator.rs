//! Proportional allocation of a refund across an order's line items.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::ALLOCATION_DECIMAL_PRECISION;
use crate::finances::RefundAllocation;
use crate::orders::OrderItem;

/// Economic weight of an item: gross value net of promotions.
///
/// Items without usable price data fall back to their quantity, or 1.
pub fn item_weight(item: &OrderItem) -> Decimal {
    let gross = item.line_sales() + item.item_tax - item.promotion_discount.abs();
    if gross > Decimal::ZERO {
        gross
    } else if item.quantity > 0 {
        Decimal::from(item.quantity)
    } else {
        Decimal::ONE
    }
}

/// Splits `amount` (taken as absolute) across `items` by weight.
///
/// Every item but the last gets its share rounded to six places; the last takes
/// the remainder so the shares always sum to exactly `|amount|`. Returns an
/// empty list when there are no items or the total weight is zero, leaving the
/// refund unattributed.
pub fn allocate_refund(event_key: &str, amount: Decimal, items: &[OrderItem]) -> Vec<RefundAllocation> {
    let amount = amount.abs();
    if items.is_empty() {
        return Vec::new();
    }

    let weights: Vec<Decimal> = items.iter().map(item_weight).collect();
    let total_weight: Decimal = weights.iter().copied().sum();
    if total_weight.is_zero() {
        return Vec::new();
    }

    let mut allocations = Vec::with_capacity(items.len());
    let mut allocated = Decimal::ZERO;
    let last = items.len() - 1;

    for (index, (item, weight)) in items.iter().zip(weights).enumerate() {
        let share = if index == last {
            amount - allocated
        } else {
            (amount * weight / total_weight).round_dp_with_strategy(
                ALLOCATION_DECIMAL_PRECISION,
                RoundingStrategy::MidpointAwayFromZero,
            )
        };
        allocated += share;
        allocations.push(RefundAllocation {
            event_key: event_key.to_string(),
            order_id: item.order_id.clone(),
            order_item_id: item.order_item_id.clone(),
            amount: share,
        });
    }

    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(id: &str, quantity: i32, unit_price: Decimal) -> OrderItem {
        OrderItem {
            order_id: "111-0000001-0000001".to_string(),
            order_item_id: id.to_string(),
            sku: Some(format!("SKU-{}", id)),
            asin: None,
            title: None,
            quantity,
            unit_price,
            line_total: None,
            item_tax: Decimal::ZERO,
            promotion_discount: Decimal::ZERO,
            currency: Some("USD".to_string()),
            refunded: false,
            product_id: None,
        }
    }

    #[test]
    fn test_even_split() {
        let items = vec![item("1", 1, dec!(10)), item("2", 1, dec!(20))];
        let allocations = allocate_refund("ev", dec!(-30.00), &items);

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].amount, dec!(10.00));
        assert_eq!(allocations[1].amount, dec!(20.00));
    }

    #[test]
    fn test_last_item_takes_remainder() {
        let items = vec![item("1", 1, dec!(10)), item("2", 1, dec!(21))];
        let allocations = allocate_refund("ev", dec!(30.00), &items);

        assert_eq!(allocations[0].amount, dec!(9.677419));
        assert_eq!(allocations[1].amount, dec!(20.322581));
        assert_eq!(allocations[0].amount + allocations[1].amount, dec!(30.00));
    }

    #[test]
    fn test_weight_includes_tax_and_discount() {
        let mut line = item("1", 2, dec!(10));
        line.item_tax = dec!(1.60);
        line.promotion_discount = dec!(-3);
        assert_eq!(item_weight(&line), dec!(18.60));
    }

    #[test]
    fn test_weight_falls_back_to_quantity_then_one() {
        assert_eq!(item_weight(&item("1", 3, Decimal::ZERO)), dec!(3));
        assert_eq!(item_weight(&item("2", 0, Decimal::ZERO)), dec!(1));
    }

    #[test]
    fn test_items_without_prices_split_by_quantity() {
        let items = vec![item("1", 1, Decimal::ZERO), item("2", 3, Decimal::ZERO)];
        let allocations = allocate_refund("ev", dec!(8), &items);
        assert_eq!(allocations[0].amount, dec!(2));
        assert_eq!(allocations[1].amount, dec!(6));
    }

    #[test]
    fn test_no_items_means_unattributed() {
        assert!(allocate_refund("ev", dec!(12), &[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_allocations_sum_to_refund(
            cents in 1i64..10_000_000,
            lines in proptest::collection::vec((0i32..20, 0i64..100_000), 1..12),
        ) {
            let amount = Decimal::new(cents, 2);
            let items: Vec<OrderItem> = lines
                .iter()
                .enumerate()
                .map(|(i, (q, p))| item(&i.to_string(), *q, Decimal::new(*p, 2)))
                .collect();

            let allocations = allocate_refund("ev", -amount, &items);
            let total: Decimal = allocations.iter().map(|a| a.amount).sum();

            prop_assert_eq!(allocations.len(), items.len());
            prop_assert_eq!(total, amount);
        }
    }
}
