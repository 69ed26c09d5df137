use std::net::SocketAddr;
use std::time::Duration;

use sellerledger_core::errors::{Error, Result};
use sellerledger_marketplace::MarketplaceCredentials;
use sellerledger_sync::SyncConfig;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8088";
const DEFAULT_DB_PATH: &str = "./db/sellerledger.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub credentials: MarketplaceCredentials,
    pub sync: SyncConfig,
}

impl Config {
    /// Loads `.env` if present, then reads `SL_*` settings and `SP_API_*`
    /// credentials from the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = MarketplaceCredentials::from_lookup(&lookup)?;

        let listen_addr = lookup("SL_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::InvalidConfigValue(format!("SL_LISTEN_ADDR: {}", e)))?;
        let db_path = lookup("SL_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let mut sync = SyncConfig {
            default_marketplace_id: Some(credentials.marketplace_id.clone()),
            ..SyncConfig::default()
        };
        if let Some(days) = parse_number::<u32>(&lookup, "SL_LOOKBACK_DAYS")? {
            sync.default_lookback_days = days;
        }
        if let Some(n) = parse_number::<usize>(&lookup, "SL_MAX_ORDERS_WITH_ITEMS")? {
            sync.max_orders_with_items = n;
        }
        if let Some(n) = parse_number::<usize>(&lookup, "SL_ITEM_FETCH_CONCURRENCY")? {
            sync.item_fetch_concurrency = n.max(1);
        }
        // 0 disables the budget
        sync.sync_timeout = parse_number::<u64>(&lookup, "SL_SYNC_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            listen_addr,
            db_path,
            credentials,
            sync,
        })
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::InvalidConfigValue(format!("{}: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("SP_API_MARKETPLACE_ID", "ATVPDKIKX0DER"),
            ("SP_API_CLIENT_ID", "client"),
            ("SP_API_CLIENT_SECRET", "secret"),
            ("SP_API_REFRESH_TOKEN", "token"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    #[test]
    fn test_defaults() {
        let vars = env(&[]);
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.listen_addr.port(), 8088);
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(
            config.sync.default_marketplace_id.as_deref(),
            Some("ATVPDKIKX0DER")
        );
        assert!(config.sync.sync_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let vars = env(&[
            ("SL_LISTEN_ADDR", "127.0.0.1:9000"),
            ("SL_SYNC_TIMEOUT_SECS", "300"),
            ("SL_ITEM_FETCH_CONCURRENCY", "0"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.sync.sync_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.sync.item_fetch_concurrency, 1);
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let mut vars = env(&[]);
        vars.remove("SP_API_REFRESH_TOKEN");
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let vars = env(&[("SL_SYNC_TIMEOUT_SECS", "soon")]);
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(msg) if msg.contains("SL_SYNC_TIMEOUT_SECS")));
    }
}
