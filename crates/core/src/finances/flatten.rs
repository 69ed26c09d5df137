//! Flattening of a category-keyed financial events page into normalized events.

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use super::event_key::{compute_event_key, occurrence_fingerprint};
use super::event_shapes::{
    AdjustmentEvent, EventShape, MoneyAmount, ProductAdsPaymentEvent, ServiceFeeEvent,
    ShipmentEvent,
};
use super::finances_model::FinancialEvent;
use super::walker::{collect_money, find_string};
use crate::utils::time_utils::parse_timestamp;

/// What an extractor pulls out of one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntry {
    pub posted_date: Option<String>,
    pub order_id: Option<String>,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub amounts: Vec<MoneyAmount>,
}

type Extractor = fn(&Value) -> Result<ExtractedEntry, serde_json::Error>;

/// Categories with a typed shape. Anything else goes through [`extract_generic`].
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("ShipmentEventList", extract_typed::<ShipmentEvent>),
    ("RefundEventList", extract_typed::<ShipmentEvent>),
    ("GuaranteeClaimEventList", extract_typed::<ShipmentEvent>),
    ("ChargebackEventList", extract_typed::<ShipmentEvent>),
    ("ServiceFeeEventList", extract_typed::<ServiceFeeEvent>),
    ("ProductAdsPaymentEventList", extract_typed::<ProductAdsPaymentEvent>),
    ("AdjustmentEventList", extract_typed::<AdjustmentEvent>),
];

fn extract_typed<T: DeserializeOwned + EventShape>(
    entry: &Value,
) -> Result<ExtractedEntry, serde_json::Error> {
    let shape = T::deserialize(entry)?;
    let mut amounts = Vec::new();
    shape.collect_amounts(&mut amounts);
    Ok(ExtractedEntry {
        posted_date: shape.posted_date(),
        order_id: shape.order_id(),
        sku: shape.sku(),
        asin: shape.asin(),
        amounts,
    })
}

/// Structural extraction for unmodeled categories.
pub fn extract_generic(entry: &Value) -> ExtractedEntry {
    let mut amounts = Vec::new();
    collect_money(entry, &mut amounts);
    ExtractedEntry {
        posted_date: find_string(entry, "PostedDate"),
        order_id: find_string(entry, "AmazonOrderId"),
        sku: find_string(entry, "SellerSKU"),
        asin: find_string(entry, "ASIN"),
        amounts,
    }
}

/// Extracts one entry of the list `list_name`, falling back to the structural
/// walker when the typed shape does not fit.
pub fn extract_entry(list_name: &str, entry: &Value) -> ExtractedEntry {
    match EXTRACTORS.iter().find(|(name, _)| *name == list_name) {
        Some((_, extractor)) => extractor(entry).unwrap_or_else(|e| {
            debug!("{} entry did not match its typed shape ({}), walking it", list_name, e);
            extract_generic(entry)
        }),
        None => extract_generic(entry),
    }
}

/// Strips the trailing `List` from a category name.
pub fn event_type_for(list_name: &str) -> &str {
    list_name.strip_suffix("List").unwrap_or(list_name)
}

#[derive(Debug, Clone)]
pub struct FlattenContext {
    /// Posted date used when an entry carries none.
    pub collected_at: DateTime<Utc>,
    /// Currency used when an entry carries no currency code.
    pub default_currency: String,
}

#[derive(Debug, Clone, Default)]
pub struct FlattenedPage {
    pub events: Vec<FinancialEvent>,
    /// Entries without any amount.
    pub dropped: usize,
}

/// Flattens one page payload (`{"ShipmentEventList": [...], ...}`).
///
/// The occurrence index of an event is the number of earlier entries on the
/// same page with the same identity tuple.
pub fn flatten_page(payload: &Value, ctx: &FlattenContext) -> FlattenedPage {
    let mut page = FlattenedPage::default();
    let Some(categories) = payload.as_object() else {
        return page;
    };

    let mut seen: HashMap<String, u32> = HashMap::new();

    for (list_name, list) in categories {
        let Some(entries) = list.as_array() else {
            continue;
        };
        let event_type = event_type_for(list_name);

        for entry in entries {
            let extracted = extract_entry(list_name, entry);
            if extracted.amounts.is_empty() {
                page.dropped += 1;
                continue;
            }

            let amount: Decimal = extracted.amounts.iter().map(|m| m.amount).sum();
            let currency = extracted
                .amounts
                .iter()
                .find_map(|m| m.currency.clone())
                .unwrap_or_else(|| ctx.default_currency.clone());
            let posted_date = extracted
                .posted_date
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(ctx.collected_at);

            let fingerprint = occurrence_fingerprint(
                event_type,
                &posted_date,
                extracted.order_id.as_deref(),
                extracted.sku.as_deref(),
                extracted.asin.as_deref(),
                amount,
                &currency,
            );
            let counter = seen.entry(fingerprint).or_insert(0);
            let occurrence_index = *counter;
            *counter += 1;

            let event_key = compute_event_key(
                event_type,
                &posted_date,
                extracted.order_id.as_deref(),
                extracted.sku.as_deref(),
                extracted.asin.as_deref(),
                amount,
                &currency,
                occurrence_index,
            );

            page.events.push(FinancialEvent {
                event_key,
                event_type: event_type.to_string(),
                posted_date,
                upstream_order_id: extracted.order_id,
                order_id: None,
                sku: extracted.sku,
                asin: extracted.asin,
                amount,
                currency,
                occurrence_index,
                marketplace_id: None,
                raw: Some(entry.clone()),
            });
        }
    }

    page
}
