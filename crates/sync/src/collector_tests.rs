use rust_decimal_macros::dec;
use serde_json::json;

use sellerledger_core::finances::FlattenContext;
use sellerledger_core::sync::SyncWarningKind;
use sellerledger_marketplace::{FinancialEventsQuery, OrdersQuery};

use crate::event_collector::FinancialEventCollector;
use crate::order_collector::{OrderCollector, OrderLimits};
use crate::test_support::{item, order, posted, ScriptedMarketplace, MARKETPLACE};

fn limits() -> OrderLimits {
    OrderLimits {
        max_pages: 10,
        max_orders: 100,
        max_orders_with_items: 100,
        item_fetch_concurrency: 1,
    }
}

fn orders_query() -> OrdersQuery {
    OrdersQuery {
        marketplace_id: MARKETPLACE.to_string(),
        created_after: chrono::Utc::now() - chrono::Duration::days(7),
        created_before: chrono::Utc::now(),
        page_size: 100,
    }
}

fn events_query() -> FinancialEventsQuery {
    FinancialEventsQuery {
        posted_after: chrono::Utc::now() - chrono::Duration::days(7),
        posted_before: chrono::Utc::now(),
        page_size: 100,
    }
}

fn ids(collection: &crate::order_collector::OrderCollection) -> Vec<&str> {
    collection
        .orders
        .iter()
        .map(|o| o.order.order_id.as_str())
        .collect()
}

#[tokio::test]
async fn test_order_limit_stops_pagination() {
    let client = ScriptedMarketplace {
        order_pages: vec![
            vec![order("A", 3), order("B", 2), order("C", 1)],
            vec![order("D", 4)],
            vec![order("E", 5)],
        ],
        ..Default::default()
    };
    let collector = OrderCollector::new(
        &client,
        OrderLimits {
            max_orders: 2,
            ..limits()
        },
    );

    let collection = collector.collect(&orders_query()).await.unwrap();

    assert_eq!(collection.orders.len(), 2);
    assert_eq!(ids(&collection), vec!["B", "A"]);
    assert!(collection.diagnostics.order_limit_hit);
    assert!(!collection.diagnostics.page_limit_hit);
    assert_eq!(collection.diagnostics.pages_fetched, 1);
    assert_eq!(client.call_count("orders"), 1);
    assert!(collection
        .warnings
        .iter()
        .any(|w| w.kind == SyncWarningKind::OrderLimitHit));
}

#[tokio::test]
async fn test_duplicates_across_pages_keep_last_seen() {
    let mut pending = order("A", 5);
    pending.status = "Pending".to_string();
    let client = ScriptedMarketplace {
        order_pages: vec![vec![pending, order("B", 1)], vec![order("A", 5)]],
        ..Default::default()
    };

    let collection = OrderCollector::new(&client, limits())
        .collect(&orders_query())
        .await
        .unwrap();

    assert_eq!(ids(&collection), vec!["B", "A"]);
    assert_eq!(collection.orders[1].order.status, "Shipped");
    assert_eq!(collection.diagnostics.orders_fetched, 2);
    assert_eq!(collection.diagnostics.pages_fetched, 2);
    assert!(!collection.diagnostics.order_limit_hit);
}

#[tokio::test]
async fn test_page_limit_flagged_when_more_pages_remain() {
    let client = ScriptedMarketplace {
        order_pages: vec![vec![order("A", 1)], vec![order("B", 2)], vec![order("C", 3)]],
        ..Default::default()
    };
    let collector = OrderCollector::new(
        &client,
        OrderLimits {
            max_pages: 2,
            ..limits()
        },
    );

    let collection = collector.collect(&orders_query()).await.unwrap();

    assert!(collection.diagnostics.page_limit_hit);
    assert_eq!(collection.diagnostics.pages_fetched, 2);
    assert_eq!(ids(&collection), vec!["A", "B"]);
}

#[tokio::test]
async fn test_failed_item_fetch_keeps_order_header_only() {
    let client = ScriptedMarketplace {
        order_pages: vec![vec![order("A", 1), order("B", 2)]],
        items: [("A".to_string(), vec![item("A", "1", "SKU-1", dec!(10))])]
            .into_iter()
            .collect(),
        failing_items: [("B".to_string(), 503)].into_iter().collect(),
        ..Default::default()
    };

    let collection = OrderCollector::new(&client, limits())
        .collect(&orders_query())
        .await
        .unwrap();

    assert_eq!(collection.orders.len(), 2);
    assert_eq!(collection.orders[0].item_count(), 1);
    assert!(collection.orders[1].items.is_none());
    assert_eq!(collection.diagnostics.orders_with_items, 1);
    assert_eq!(collection.diagnostics.item_fetch_failures, 1);

    let warning = &collection.warnings[0];
    assert_eq!(warning.kind, SyncWarningKind::ItemFetchFailed);
    assert_eq!(warning.order_id.as_deref(), Some("B"));
    assert!(warning.message.contains("503"));
}

#[tokio::test]
async fn test_items_fetched_only_for_most_recent_orders() {
    let client = ScriptedMarketplace {
        order_pages: vec![vec![order("OLD", 30), order("NEW", 1), order("MID", 10)]],
        ..Default::default()
    };
    let collector = OrderCollector::new(
        &client,
        OrderLimits {
            max_orders_with_items: 2,
            item_fetch_concurrency: 3,
            ..limits()
        },
    );

    let collection = collector.collect(&orders_query()).await.unwrap();

    assert_eq!(ids(&collection), vec!["NEW", "MID", "OLD"]);
    assert!(collection.orders[0].items.is_some());
    assert!(collection.orders[1].items.is_some());
    assert!(collection.orders[2].items.is_none());
    assert_eq!(collection.diagnostics.orders_skipped_for_items, 1);
    assert_eq!(client.call_count("items:OLD"), 0);
    assert_eq!(client.call_count("items:"), 2);
}

#[tokio::test]
async fn test_orders_feed_failure_propagates() {
    let client = ScriptedMarketplace {
        orders_status: Some(403),
        ..Default::default()
    };

    let err = OrderCollector::new(&client, limits())
        .collect(&orders_query())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_event_repeats_across_pages_are_dropped() {
    let fee = json!({
        "FeeReason": "Subscription",
        "PostedDate": posted(5),
        "FeeList": [{"FeeType": "Subscription", "FeeAmount": {"CurrencyCode": "USD", "CurrencyAmount": -39.99}}]
    });
    let client = ScriptedMarketplace {
        event_pages: vec![
            json!({"ServiceFeeEventList": [fee.clone(), {"FeeList": []}]}),
            json!({"ServiceFeeEventList": [fee]}),
        ],
        ..Default::default()
    };
    let context = FlattenContext {
        collected_at: chrono::Utc::now(),
        default_currency: "USD".to_string(),
    };

    let collection = FinancialEventCollector::new(&client, 10)
        .collect(&events_query(), &context)
        .await
        .unwrap();

    assert_eq!(collection.events.len(), 1);
    assert_eq!(collection.events[0].amount, dec!(-39.99));
    assert_eq!(collection.diagnostics.pages_fetched, 2);
    assert_eq!(collection.diagnostics.duplicates_dropped, 1);
    assert_eq!(collection.diagnostics.entries_dropped, 1);
    assert_eq!(collection.diagnostics.events_fetched, 1);
}
