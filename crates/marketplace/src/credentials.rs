//! Credentials for the Selling Partner API.

use std::env;

use crate::errors::MarketplaceError;

/// Default regional endpoint (North America).
pub const DEFAULT_SP_API_ENDPOINT: &str = "https://sellingpartnerapi-na.amazon.com";

/// Login with Amazon token endpoint.
pub const DEFAULT_LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

#[derive(Clone)]
pub struct MarketplaceCredentials {
    pub marketplace_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub endpoint: String,
    pub token_url: String,
}

impl std::fmt::Debug for MarketplaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceCredentials")
            .field("marketplace_id", &self.marketplace_id)
            .field("client_id", &self.client_id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl MarketplaceCredentials {
    /// Reads `SP_API_*` variables from the process environment.
    pub fn from_env() -> Result<Self, MarketplaceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds credentials from any key lookup. Every required value must be
    /// present and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MarketplaceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, MarketplaceError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MarketplaceError::Config(format!("{} is not set", key)))
        };

        Ok(Self {
            marketplace_id: required("SP_API_MARKETPLACE_ID")?,
            client_id: required("SP_API_CLIENT_ID")?,
            client_secret: required("SP_API_CLIENT_SECRET")?,
            refresh_token: required("SP_API_REFRESH_TOKEN")?,
            endpoint: lookup("SP_API_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SP_API_ENDPOINT.to_string()),
            token_url: lookup("SP_API_TOKEN_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LWA_TOKEN_URL.to_string()),
        })
    }
}
