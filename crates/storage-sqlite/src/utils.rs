//! Utility functions for SQLite storage operations.
//!
//! Chunking for `IN (...)` queries and the text encodings used for decimals,
//! timestamps and dates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use sellerledger_core::utils::time_utils::{format_timestamp, parse_timestamp};

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite limits the number of parameters in a statement (historically 999).
/// 500 leaves room for the other parameters of the query.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

pub fn decimal_to_text(value: Decimal) -> String {
    value.to_string()
}

/// Parses a stored decimal. Unparseable values read as zero.
pub fn text_to_decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or(Decimal::ZERO)
}

pub fn timestamp_to_text(value: &DateTime<Utc>) -> String {
    format_timestamp(value)
}

/// Parses a stored timestamp. Unparseable values read as the Unix epoch.
pub fn text_to_timestamp(value: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or_default()
}

pub fn date_to_text(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn text_to_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Half-open text bounds `[start 00:00, end+1 00:00)` for a UTC date range,
/// comparable against stored timestamps.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (String, String) {
    let lower = format!("{}T00:00:00Z", date_to_text(start));
    let upper = end
        .succ_opt()
        .map(|d| format!("{}T00:00:00Z", date_to_text(d)))
        .unwrap_or_else(|| "9999-12-31T23:59:59Z".to_string());
    (lower, upper)
}

/// Stores a unit enum by its serde name, without JSON quotes.
pub fn enum_to_text<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

pub fn text_to_enum<T: serde::de::DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_str(&format!("\"{}\"", value)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_chunk_for_sqlite_empty() {
        let items: Vec<i32> = vec![];
        assert_eq!(chunk_for_sqlite(&items).count(), 0);
    }

    #[test]
    fn test_day_bounds_cover_whole_days() {
        let (lower, upper) = day_bounds(
            NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        assert_eq!(lower, "2025-01-30T00:00:00Z");
        assert_eq!(upper, "2025-02-01T00:00:00Z");

        let stored = timestamp_to_text(&Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap());
        assert!(stored >= lower && stored < upper);
    }

    #[test]
    fn test_text_roundtrips() {
        assert_eq!(text_to_decimal("12.50"), Decimal::new(1250, 2));
        assert_eq!(text_to_decimal("garbage"), Decimal::ZERO);
        assert_eq!(
            text_to_date("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }
}
