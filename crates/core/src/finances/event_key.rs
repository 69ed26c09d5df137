//! Content-hash keys for financial event deduplication.
//!
//! The financial-events feed has no stable per-line identifier, so events are
//! keyed by a fingerprint of their semantic content. The occurrence index keeps
//! two economically identical lines on the same page apart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::utils::time_utils::format_timestamp;

/// Computes the content-hash key of a financial event.
///
/// The key is a SHA-256 hash over:
/// - event type
/// - posted date (second precision, UTC)
/// - upstream order id
/// - sku
/// - asin
/// - amount (normalized, so `10.50` and `10.5` match)
/// - currency
/// - occurrence index
#[allow(clippy::too_many_arguments)]
pub fn compute_event_key(
    event_type: &str,
    posted_date: &DateTime<Utc>,
    order_id: Option<&str>,
    sku: Option<&str>,
    asin: Option<&str>,
    amount: Decimal,
    currency: &str,
    occurrence_index: u32,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(event_type.as_bytes());
    hasher.update(b"|");
    hasher.update(format_timestamp(posted_date).as_bytes());
    hasher.update(b"|");

    for part in [order_id, sku, asin] {
        if let Some(value) = part {
            hasher.update(value.trim().as_bytes());
        }
        hasher.update(b"|");
    }

    hasher.update(normalize_decimal(amount).as_bytes());
    hasher.update(b"|");
    hasher.update(currency.to_ascii_uppercase().as_bytes());
    hasher.update(b"|");
    hasher.update(occurrence_index.to_string().as_bytes());

    hex::encode(hasher.finalize())
}

/// Identity of an event without its occurrence index. Used to count repeats
/// within a page.
pub fn occurrence_fingerprint(
    event_type: &str,
    posted_date: &DateTime<Utc>,
    order_id: Option<&str>,
    sku: Option<&str>,
    asin: Option<&str>,
    amount: Decimal,
    currency: &str,
) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        event_type,
        format_timestamp(posted_date),
        order_id.unwrap_or_default(),
        sku.unwrap_or_default(),
        asin.unwrap_or_default(),
        normalize_decimal(amount),
        currency.to_ascii_uppercase()
    )
}

/// Normalize decimal to consistent string format
fn normalize_decimal(d: Decimal) -> String {
    d.normalize().to_string()
}
