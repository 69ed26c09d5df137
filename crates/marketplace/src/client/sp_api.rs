//! HTTP client for the Selling Partner API.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;

use sellerledger_core::utils::time_utils::format_timestamp;

use super::wire::{
    Envelope, FinancialEventsPayload, LwaTokenResponse, OrderItemsPayload, OrdersPayload,
};
use super::MarketplaceApiClient;
use crate::credentials::MarketplaceCredentials;
use crate::errors::MarketplaceError;
use crate::models::{
    normalize_token, FinancialEventsPage, FinancialEventsQuery, OrderItemsPage, OrdersPage,
    OrdersQuery,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the per-operation request rate, in requests per second.
pub const RATE_LIMIT_HEADER: &str = "x-amzn-RateLimit-Limit";

const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";

/// Access tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Selling Partner API client.
///
/// Exchanges the refresh token for a short-lived access token on first use and
/// whenever the cached one is about to expire.
#[derive(Debug)]
pub struct SpApiClient {
    client: reqwest::Client,
    credentials: MarketplaceCredentials,
    base_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl SpApiClient {
    pub fn new(credentials: MarketplaceCredentials) -> Result<Self, MarketplaceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MarketplaceError::Config(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: credentials.endpoint.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
        })
    }

    pub fn marketplace_id(&self) -> &str {
        &self.credentials.marketplace_id
    }

    async fn access_token(&self) -> Result<String, MarketplaceError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        debug!("[SpApi] Refreshing access token");
        let response = self
            .client
            .post(&self.credentials.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MarketplaceError::Http {
                status: status.as_u16(),
                rate_limit_hint: None,
                message: format!(
                    "token exchange failed: {}",
                    body.chars().take(200).collect::<String>()
                ),
            });
        }

        let parsed: LwaTokenResponse = serde_json::from_str(&body)
            .map_err(|e| MarketplaceError::Decode(format!("token response: {}", e)))?;
        let token = AccessToken {
            value: parsed.access_token,
            expires_at: now + ChronoDuration::seconds(parsed.expires_in),
        };
        let value = token.value.clone();
        *cached = Some(token);
        info!("[SpApi] Access token refreshed");
        Ok(value)
    }

    async fn headers(&self) -> Result<HeaderMap, MarketplaceError> {
        let token = self.access_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCESS_TOKEN_HEADER,
            HeaderValue::from_str(&token)
                .map_err(|e| MarketplaceError::Config(format!("Invalid access token format: {}", e)))?,
        );
        Ok(headers)
    }

    /// Make a GET request and unwrap the response envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketplaceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[SpApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers().await?)
            .query(query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Parse an HTTP response, keeping the status and rate-limit hint on failure.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MarketplaceError> {
        let status = response.status();
        let rate_limit_hint = response
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok());
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.errors.first().map(|e| e.describe()))
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(MarketplaceError::Http {
                status: status.as_u16(),
                rate_limit_hint,
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| MarketplaceError::Decode(format!("{} - {}", e, body.chars().take(200).collect::<String>())))?;

        if let Some(first) = envelope.errors.first() {
            if envelope.payload.is_none() {
                return Err(MarketplaceError::Decode(first.describe()));
            }
        }
        envelope
            .payload
            .ok_or_else(|| MarketplaceError::Decode("response has no payload".to_string()))
    }
}

#[async_trait]
impl MarketplaceApiClient for SpApiClient {
    async fn get_orders(
        &self,
        query: &OrdersQuery,
        next_token: Option<&str>,
    ) -> Result<OrdersPage, MarketplaceError> {
        let mut params = vec![("MarketplaceIds", query.marketplace_id.clone())];
        match next_token {
            Some(token) => params.push(("NextToken", token.to_string())),
            None => {
                params.push(("CreatedAfter", format_timestamp(&query.created_after)));
                params.push(("CreatedBefore", format_timestamp(&query.created_before)));
                params.push(("MaxResultsPerPage", query.page_size.to_string()));
            }
        }

        let payload: OrdersPayload = self.get("/orders/v0/orders", &params).await?;
        let orders = payload
            .orders
            .into_iter()
            .map(|o| o.into_order(&query.marketplace_id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrdersPage {
            orders,
            next_token: normalize_token(payload.next_token),
        })
    }

    async fn get_order_items(
        &self,
        order_id: &str,
        next_token: Option<&str>,
    ) -> Result<OrderItemsPage, MarketplaceError> {
        let path = format!("/orders/v0/orders/{}/orderItems", order_id);
        let params: Vec<(&str, String)> = next_token
            .map(|t| vec![("NextToken", t.to_string())])
            .unwrap_or_default();

        let payload: OrderItemsPayload = self.get(&path, &params).await?;
        Ok(OrderItemsPage {
            items: payload
                .order_items
                .into_iter()
                .map(|i| i.into_item(order_id))
                .collect(),
            next_token: normalize_token(payload.next_token),
        })
    }

    async fn get_financial_events(
        &self,
        query: &FinancialEventsQuery,
        next_token: Option<&str>,
    ) -> Result<FinancialEventsPage, MarketplaceError> {
        let mut params = vec![("MaxResultsPerPage", query.page_size.to_string())];
        match next_token {
            Some(token) => params.push(("NextToken", token.to_string())),
            None => {
                params.push(("PostedAfter", format_timestamp(&query.posted_after)));
                params.push(("PostedBefore", format_timestamp(&query.posted_before)));
            }
        }

        let payload: FinancialEventsPayload =
            self.get("/finances/v0/financialEvents", &params).await?;
        Ok(FinancialEventsPage {
            payload: payload.financial_events,
            next_token: normalize_token(payload.next_token),
        })
    }
}
