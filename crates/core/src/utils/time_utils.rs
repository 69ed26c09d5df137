use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MIN_LOOKBACK_DAYS, UPSTREAM_SETTLE_MINUTES};

/// Time range a sync run requests from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWindow {
    /// Lower bound (`CreatedAfter` / `PostedAfter`).
    pub start: DateTime<Utc>,
    /// Upper bound (`CreatedBefore` / `PostedBefore`).
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Builds the window "N days back from now", flooring the lookback at one
    /// day and ending a couple of minutes in the past.
    pub fn lookback(now: DateTime<Utc>, lookback_days: u32) -> Self {
        let days = lookback_days.max(MIN_LOOKBACK_DAYS);
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now - Duration::minutes(UPSTREAM_SETTLE_MINUTES),
        }
    }

    /// Every calendar date (UTC) touched by the window, inclusive.
    pub fn dates(&self) -> Vec<NaiveDate> {
        get_days_between(self.start.date_naive(), self.end.date_naive())
    }
}

/// Canonical timestamp text used for storage and hashing.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses an upstream ISO-8601 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lookback_window_bounds() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let window = SyncWindow::lookback(now, 7);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 3, 10, 11, 58, 0).unwrap());
    }

    #[test]
    fn test_lookback_is_floored_at_one_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let window = SyncWindow::lookback(now, 0);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_window_dates_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let window = SyncWindow::lookback(now, 2);
        let dates = window.dates();

        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_get_days_between_reversed_is_empty() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(get_days_between(a, b).is_empty());
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2025-01-15T10:30:00+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2025-01-15T08:30:00Z");
        assert!(parse_timestamp("not a date").is_none());
    }
}
