/// Decimal places kept for refund allocation shares.
pub const ALLOCATION_DECIMAL_PRECISION: u32 = 6;

/// Currency used for financial events that carry no currency code at all.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Order status reported by the marketplace for canceled orders.
pub const ORDER_STATUS_CANCELED: &str = "Canceled";

/// Minimum lookback a sync window may request, in days.
pub const MIN_LOOKBACK_DAYS: u32 = 1;

/// Upper window boundary offset. The marketplace rejects `CreatedBefore` /
/// `PostedBefore` values closer than two minutes to the present, and orders
/// inside that gap may still be mid-write upstream.
pub const UPSTREAM_SETTLE_MINUTES: i64 = 2;
