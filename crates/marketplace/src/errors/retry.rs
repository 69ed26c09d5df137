/// Classification for retry policy.
///
/// Used by the retrying transport to decide whether a failed upstream call is
/// attempted again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - client errors, decoding failures, configuration problems.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Retry after a delay. Used for throttling (429) and transient server
    /// errors (500, 502, 503, 504).
    WithBackoff,
}

/// HTTP statuses the transport retries.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}
