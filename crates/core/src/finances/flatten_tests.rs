use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use super::*;

fn ctx() -> FlattenContext {
    FlattenContext {
        collected_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        default_currency: "USD".to_string(),
    }
}

fn refund_entry() -> Value {
    json!({
        "AmazonOrderId": "111-0000001-0000001",
        "PostedDate": "2025-01-15T10:30:00Z",
        "MarketplaceName": "Amazon.com",
        "ShipmentItemAdjustmentList": [{
            "SellerSKU": "SKU-1",
            "OrderAdjustmentItemId": "A1",
            "QuantityShipped": 1,
            "ItemChargeAdjustmentList": [
                {"ChargeType": "Principal", "ChargeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -20.0}},
                {"ChargeType": "Tax", "ChargeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -1.6}}
            ],
            "ItemFeeAdjustmentList": [
                {"FeeType": "Commission", "FeeAmount": {"CurrencyCode": "USD", "CurrencyAmount": 2.4}}
            ]
        }]
    })
}

#[test]
fn test_typed_extraction_matches_structural_walk() {
    let entry = refund_entry();

    let typed = extract_entry("RefundEventList", &entry);
    let generic = extract_generic(&entry);

    let typed_total: rust_decimal::Decimal = typed.amounts.iter().map(|m| m.amount).sum();
    let generic_total: rust_decimal::Decimal = generic.amounts.iter().map(|m| m.amount).sum();

    assert_eq!(typed_total, dec!(-19.2));
    assert_eq!(typed_total, generic_total);
    assert_eq!(typed.order_id, generic.order_id);
    assert_eq!(typed.sku, generic.sku);
    assert_eq!(typed.posted_date, generic.posted_date);
}

#[test]
fn test_flatten_refund_event() {
    let payload = json!({ "RefundEventList": [refund_entry()] });
    let page = flatten_page(&payload, &ctx());

    assert_eq!(page.dropped, 0);
    assert_eq!(page.events.len(), 1);

    let event = &page.events[0];
    assert_eq!(event.event_type, "RefundEvent");
    assert_eq!(event.amount, dec!(-19.2));
    assert_eq!(event.currency, "USD");
    assert_eq!(event.upstream_order_id.as_deref(), Some("111-0000001-0000001"));
    assert_eq!(event.sku.as_deref(), Some("SKU-1"));
    assert_eq!(event.order_id, None);
    assert_eq!(event.occurrence_index, 0);
    assert_eq!(
        event.posted_date,
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
    );
}

#[test]
fn test_shape_mismatch_falls_back_to_walker() {
    let payload = json!({
        "ShipmentEventList": [{
            "AmazonOrderId": "111-0000002-0000002",
            "PostedDate": "2025-01-10T08:00:00Z",
            "ShipmentItemList": null,
            "ShipmentFeeList": [
                {"FeeType": "FBAPerUnitFulfillmentFee", "FeeAmount": {"CurrencyCode": "EUR", "CurrencyAmount": "-3.10"}}
            ]
        }]
    });
    let page = flatten_page(&payload, &ctx());

    assert_eq!(page.events.len(), 1);
    assert_eq!(page.events[0].amount, dec!(-3.10));
    assert_eq!(page.events[0].currency, "EUR");
}

#[test]
fn test_product_ads_camel_case_entry() {
    let payload = json!({
        "ProductAdsPaymentEventList": [{
            "postedDate": "2025-01-12T00:00:00Z",
            "transactionType": "Charge",
            "invoiceId": "INV-1",
            "transactionValue": {"CurrencyCode": "USD", "CurrencyAmount": -55.25}
        }]
    });
    let page = flatten_page(&payload, &ctx());

    assert_eq!(page.events.len(), 1);
    let event = &page.events[0];
    assert_eq!(event.event_type, "ProductAdsPaymentEvent");
    assert_eq!(event.amount, dec!(-55.25));
    assert_eq!(
        event.posted_date,
        Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_unmodeled_category_uses_walker() {
    let payload = json!({
        "DebtRecoveryEventList": [{
            "DebtRecoveryType": "DebtPayment",
            "RecoveryAmount": {"CurrencyCode": "USD", "CurrencyAmount": -12.5},
            "DebtRecoveryItemList": [{
                "RecoveryAmount": {"CurrencyCode": "USD", "CurrencyAmount": -2.5},
                "GroupBeginDate": "2025-01-01T00:00:00Z"
            }]
        }]
    });
    let page = flatten_page(&payload, &ctx());

    let event = &page.events[0];
    assert_eq!(event.event_type, "DebtRecoveryEvent");
    assert_eq!(event.amount, dec!(-15.0));
    assert_eq!(event.posted_date, ctx().collected_at);
}

#[test]
fn test_nested_posted_date_is_found_for_typed_categories() {
    let entry = json!({
        "AmazonOrderId": "111-0000003-0000003",
        "Detail": {"PostedDate": "2025-01-02T00:00:00Z"},
        "ShipmentItemAdjustmentList": [{
            "SellerSKU": "SKU-1",
            "ItemChargeAdjustmentList": [
                {"ChargeType": "Principal", "ChargeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -10.0}}
            ]
        }]
    });
    let adjustment = json!({
        "AdjustmentType": "ReserveDebit",
        "AdjustmentAmount": {"CurrencyCode": "USD", "CurrencyAmount": -3.0},
        "AdjustmentItemList": [{"SellerSKU": "SKU-1", "Meta": {"PostedDate": "2025-01-02T00:00:00Z"}}]
    });
    let payload = json!({
        "RefundEventList": [entry.clone()],
        "AdjustmentEventList": [adjustment],
        "WeirdEventList": [entry]
    });
    let page = flatten_page(&payload, &ctx());

    let expected = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    assert_eq!(page.events.len(), 3);
    for event in &page.events {
        assert_eq!(event.posted_date, expected, "{}", event.event_type);
    }
}

#[test]
fn test_entries_without_amount_are_dropped() {
    let payload = json!({
        "ServiceFeeEventList": [
            {"FeeReason": "Subscription", "FeeList": []},
            {"FeeReason": "Subscription", "FeeList": [
                {"FeeType": "Subscription", "FeeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -39.99}}
            ]}
        ]
    });
    let page = flatten_page(&payload, &ctx());

    assert_eq!(page.dropped, 1);
    assert_eq!(page.events.len(), 1);
}

#[test]
fn test_missing_posted_date_and_currency_use_defaults() {
    let payload = json!({
        "ServiceFeeEventList": [
            {"FeeList": [{"FeeType": "StorageFee", "FeeAmount": {"CurrencyAmount": -4}}]}
        ]
    });
    let page = flatten_page(&payload, &ctx());

    let event = &page.events[0];
    assert_eq!(event.posted_date, ctx().collected_at);
    assert_eq!(event.currency, "USD");
}

#[test]
fn test_identical_entries_on_one_page_get_distinct_keys() {
    let fee = json!({
        "PostedDate": "2025-01-20T00:00:00Z",
        "FeeList": [{"FeeType": "StorageFee", "FeeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -1.5}}]
    });
    let payload = json!({ "ServiceFeeEventList": [fee.clone(), fee] });
    let page = flatten_page(&payload, &ctx());

    assert_eq!(page.events.len(), 2);
    assert_eq!(page.events[0].occurrence_index, 0);
    assert_eq!(page.events[1].occurrence_index, 1);
    assert_ne!(page.events[0].event_key, page.events[1].event_key);
}

#[test]
fn test_same_page_flattened_twice_gives_same_keys() {
    let payload = json!({ "RefundEventList": [refund_entry(), refund_entry()] });

    let first: Vec<String> = flatten_page(&payload, &ctx())
        .events
        .into_iter()
        .map(|e| e.event_key)
        .collect();
    let second: Vec<String> = flatten_page(&payload, &ctx())
        .events
        .into_iter()
        .map(|e| e.event_key)
        .collect();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_non_array_categories_are_ignored() {
    let payload = json!({ "RefundEventList": null, "Unexpected": "x" });
    let page = flatten_page(&payload, &ctx());
    assert!(page.events.is_empty());
    assert_eq!(page.dropped, 0);
}

#[test]
fn test_event_type_strips_list_suffix() {
    assert_eq!(event_type_for("ChargebackEventList"), "ChargebackEvent");
    assert_eq!(event_type_for("Custom"), "Custom");
}
