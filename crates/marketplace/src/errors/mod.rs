//! Error types and retry classification for the marketplace crate.
//!
//! This module provides:
//! - [`MarketplaceError`]: The error enum for all upstream operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::{is_retryable_status, RetryClass, RETRYABLE_STATUSES};

use sellerledger_core::errors::Error as CoreError;
use thiserror::Error;

/// Errors that can occur while talking to the marketplace API.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        /// Requests per second from `x-amzn-RateLimit-Limit`, when sent.
        rate_limit_hint: Option<f64>,
        message: String,
    },

    /// A network error occurred while communicating with the API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Credentials or endpoint configuration are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketplaceError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            rate_limit_hint: None,
            message: message.into(),
        }
    }

    /// HTTP status of the failure, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn rate_limit_hint(&self) -> Option<f64> {
        match self {
            Self::Http {
                rate_limit_hint, ..
            } => *rate_limit_hint,
            _ => None,
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// Only 429 and the transient 5xx statuses are retried; everything else,
    /// network failures included, propagates immediately.
    pub fn retry_class(&self) -> RetryClass {
        match self.status() {
            Some(status) if is_retryable_status(status) => RetryClass::WithBackoff,
            _ => RetryClass::Never,
        }
    }
}

impl From<MarketplaceError> for CoreError {
    fn from(err: MarketplaceError) -> Self {
        match err {
            MarketplaceError::Config(msg) => CoreError::InvalidConfigValue(msg),
            other => CoreError::Upstream(other.to_string()),
        }
    }
}
