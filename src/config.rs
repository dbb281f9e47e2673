use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Feed caching is disabled when unset.
    pub redis_url: Option<String>,
    pub admin_api_key: String,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub ticker_cache_ttl_secs: u64,
    pub ticker_feed_limit: usize,
    pub ticker_manual_limit: i64,
    pub ticker_strict_records: bool,
    /// 0 disables the background reconciliation task.
    pub ticker_reconcile_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("Missing required env var: {}", key))
        };

        let ticker_manual_limit: i64 = or("TICKER_MANUAL_LIMIT", "10").parse()?;
        anyhow::ensure!(
            ticker_manual_limit >= 0,
            "TICKER_MANUAL_LIMIT must be >= 0, got {}",
            ticker_manual_limit
        );

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: get("REDIS_URL"),
            admin_api_key: required("ADMIN_API_KEY")?,
            host: or("HOST", "0.0.0.0"),
            port: or("PORT", "8080").parse()?,
            app_base_url: or("APP_BASE_URL", "http://localhost"),
            ticker_cache_ttl_secs: or("TICKER_CACHE_TTL_SECS", "120").parse()?,
            ticker_feed_limit: or("TICKER_FEED_LIMIT", "20").parse()?,
            ticker_manual_limit,
            ticker_strict_records: or("TICKER_STRICT_RECORDS", "true").parse()?,
            ticker_reconcile_interval_secs: or("TICKER_RECONCILE_INTERVAL_SECS", "3600").parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("ADMIN_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.ticker_cache_ttl_secs, 120);
        assert_eq!(config.ticker_feed_limit, 20);
        assert_eq!(config.ticker_manual_limit, 10);
        assert!(config.ticker_strict_records);
        assert_eq!(config.ticker_reconcile_interval_secs, 3600);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("ADMIN_API_KEY", "secret"),
            ("REDIS_URL", "redis://cache:6379"),
            ("PORT", "9000"),
            ("TICKER_STRICT_RECORDS", "false"),
            ("TICKER_MANUAL_LIMIT", "5"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.port, 9000);
        assert!(!config.ticker_strict_records);
        assert_eq!(config.ticker_manual_limit, 5);
    }

    #[test]
    fn test_missing_required_and_bad_numbers() {
        let err = Config::from_lookup(lookup(&[("ADMIN_API_KEY", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("ADMIN_API_KEY", "secret"),
            ("PORT", "not-a-port"),
        ]));
        assert!(err.is_err());
    }

    #[test]
    fn test_negative_manual_limit_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("ADMIN_API_KEY", "secret"),
            ("TICKER_MANUAL_LIMIT", "-1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TICKER_MANUAL_LIMIT"));
    }
}
