use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anilist_client::{ClientConfig, ANILIST_API_URL, DETAILS_TTL};
use anyhow::{bail, Context, Result};
use notification_service::DEFAULT_FALLBACK_ICON;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    // Catalog API
    pub api_url: String,
    pub rate_limit: usize,            // 90 requests
    pub rate_window_ms: u64,          // per 60 000 ms
    pub throttle_wait_secs: u64,      // fixed wait after a 429
    pub max_throttle_retries: u32,
    pub http_timeout_secs: u64,

    // Storage
    pub database_url: String,

    // Timers. Refresh falls back to settings.updates.frequency when unset.
    pub refresh_interval_minutes: Option<u64>,
    pub notify_interval_minutes: u64,

    // Control surface
    pub bind_addr: SocketAddr,

    // Notifications
    pub discord_webhook_url: Option<String>,
    pub fallback_icon: String,
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has invalid value {raw:?}"))
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            api_url: get_or("ANILIST_API_URL", ANILIST_API_URL),
            rate_limit: parse("ANILIST_RATE_LIMIT", &get_or("ANILIST_RATE_LIMIT", "90"))?,
            rate_window_ms: parse(
                "ANILIST_RATE_WINDOW_MS",
                &get_or("ANILIST_RATE_WINDOW_MS", "60000"),
            )?,
            throttle_wait_secs: parse(
                "ANILIST_THROTTLE_WAIT_SECS",
                &get_or("ANILIST_THROTTLE_WAIT_SECS", "60"),
            )?,
            max_throttle_retries: parse(
                "ANILIST_MAX_THROTTLE_RETRIES",
                &get_or("ANILIST_MAX_THROTTLE_RETRIES", "5"),
            )?,
            http_timeout_secs: parse("HTTP_TIMEOUT_SECS", &get_or("HTTP_TIMEOUT_SECS", "30"))?,

            database_url: get_or("DATABASE_URL", "sqlite:airing.db"),

            refresh_interval_minutes: get("REFRESH_INTERVAL_MINUTES")
                .map(|raw| parse("REFRESH_INTERVAL_MINUTES", &raw))
                .transpose()?,
            notify_interval_minutes: parse(
                "NOTIFY_INTERVAL_MINUTES",
                &get_or("NOTIFY_INTERVAL_MINUTES", "5"),
            )?,

            bind_addr: parse("CONTROL_BIND_ADDR", &get_or("CONTROL_BIND_ADDR", "127.0.0.1:3939"))?,

            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
            fallback_icon: get_or("NOTIFICATION_FALLBACK_ICON", DEFAULT_FALLBACK_ICON),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 {
            bail!("ANILIST_RATE_LIMIT must be at least 1");
        }
        if self.rate_window_ms == 0 {
            bail!("ANILIST_RATE_WINDOW_MS must be positive");
        }
        if self.notify_interval_minutes == 0 {
            bail!("NOTIFY_INTERVAL_MINUTES must be positive");
        }
        if self.refresh_interval_minutes == Some(0) {
            bail!("REFRESH_INTERVAL_MINUTES must be positive");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            max_requests: self.rate_limit,
            window: Duration::from_millis(self.rate_window_ms),
            throttle_wait: Duration::from_secs(self.throttle_wait_secs),
            max_throttle_retries: self.max_throttle_retries,
            details_ttl: DETAILS_TTL,
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}
