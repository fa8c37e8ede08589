//! Server configuration
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file). Only the actor credentials are required; everything else
//! has a default matching a small single-instance deployment.

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.apify.com";

/// Telegram alert destination
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Actor platform base URL (e.g., "https://api.apify.com")
    pub apify_base_url: String,

    /// Actor platform API token
    pub apify_token: String,

    /// Actor started for each lookup
    pub actor_id: String,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,

    /// Pause between two status queries of the same run
    pub poll_interval: Duration,

    /// Total time a run may take before the lookup gives up
    pub max_wait: Duration,

    /// Lifetime of a successful lookup in the cache
    pub cache_ttl: Duration,

    /// Lifetime of a "not found" lookup in the cache
    pub negative_cache_ttl: Duration,

    /// How often expired cache entries are swept
    pub cache_sweep_interval: Duration,

    /// Alerts buffered before new ones are dropped
    pub alert_queue_capacity: usize,

    /// Profile lookups allowed per client IP per minute
    pub scrape_rate_per_minute: u32,

    /// Image proxy requests allowed per client IP per minute
    pub image_rate_per_minute: u32,

    /// Largest image body the proxy relays
    pub image_max_bytes: usize,

    /// CORS origins; a single "*" allows any origin
    pub allowed_origins: Vec<String>,

    /// Alert destination; alerts are only logged when absent
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    /// Creates a configuration with defaults for everything but the credentials
    pub fn new(apify_token: String, actor_id: String) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            apify_base_url: DEFAULT_BASE_URL.to_string(),
            apify_token,
            actor_id,
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(300),
            negative_cache_ttl: Duration::from_secs(3600),
            cache_sweep_interval: Duration::from_secs(60),
            alert_queue_capacity: 64,
            scrape_rate_per_minute: 30,
            image_rate_per_minute: 50,
            image_max_bytes: 10 * 1024 * 1024,
            allowed_origins: vec!["*".to_string()],
            telegram: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - APIFY_TOKEN (required)
    /// - ACTOR_ID (required)
    /// - APIFY_BASE_URL (optional, default: https://api.apify.com)
    /// - LOOKOUT_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 60)
    /// - POLL_INTERVAL_MS (optional, milliseconds, default: 1000)
    /// - MAX_WAIT_TIME (optional, seconds, default: 15)
    /// - CACHE_TTL (optional, seconds, default: 300)
    /// - NEGATIVE_CACHE_TTL (optional, seconds, default: 3600)
    /// - CACHE_SWEEP_INTERVAL (optional, seconds, default: 60)
    /// - ALERT_QUEUE_CAPACITY (optional, default: 64)
    /// - SCRAPE_RATE_PER_MINUTE (optional, default: 30)
    /// - IMAGE_RATE_PER_MINUTE (optional, default: 50)
    /// - IMAGE_MAX_BYTES (optional, default: 10485760)
    /// - ALLOWED_ORIGINS (optional, comma separated, default: *)
    /// - TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID (optional, both or neither)
    pub fn from_env() -> anyhow::Result<Self> {
        let apify_token = std::env::var("APIFY_TOKEN")
            .map_err(|_| anyhow::anyhow!("APIFY_TOKEN environment variable not set"))?;

        let actor_id = std::env::var("ACTOR_ID")
            .map_err(|_| anyhow::anyhow!("ACTOR_ID environment variable not set"))?;

        let defaults = Self::new(apify_token, actor_id);

        let telegram = match (
            std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            std::env::var("TELEGRAM_CHAT_ID").ok(),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, None) => None,
            _ => anyhow::bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together"),
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            bind_addr: std::env::var("LOOKOUT_BIND_ADDR").unwrap_or(defaults.bind_addr),
            apify_base_url: std::env::var("APIFY_BASE_URL").unwrap_or(defaults.apify_base_url),
            request_timeout: env_secs("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            poll_interval: env_parse::<u64>("POLL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_wait: env_secs("MAX_WAIT_TIME").unwrap_or(defaults.max_wait),
            cache_ttl: env_secs("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            negative_cache_ttl: env_secs("NEGATIVE_CACHE_TTL")
                .unwrap_or(defaults.negative_cache_ttl),
            cache_sweep_interval: env_secs("CACHE_SWEEP_INTERVAL")
                .unwrap_or(defaults.cache_sweep_interval),
            alert_queue_capacity: env_parse("ALERT_QUEUE_CAPACITY")
                .unwrap_or(defaults.alert_queue_capacity),
            scrape_rate_per_minute: env_parse("SCRAPE_RATE_PER_MINUTE")
                .unwrap_or(defaults.scrape_rate_per_minute),
            image_rate_per_minute: env_parse("IMAGE_RATE_PER_MINUTE")
                .unwrap_or(defaults.image_rate_per_minute),
            image_max_bytes: env_parse("IMAGE_MAX_BYTES").unwrap_or(defaults.image_max_bytes),
            allowed_origins,
            telegram,
            ..defaults
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.apify_token.is_empty() {
            anyhow::bail!("apify_token cannot be empty");
        }

        if self.actor_id.is_empty() {
            anyhow::bail!("actor_id cannot be empty");
        }

        if !self.apify_base_url.starts_with("http://")
            && !self.apify_base_url.starts_with("https://")
        {
            anyhow::bail!("apify_base_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_wait.is_zero() {
            anyhow::bail!("max_wait must be greater than 0");
        }

        if self.cache_ttl.is_zero() {
            anyhow::bail!("cache_ttl must be greater than 0");
        }

        // Absence of a profile is re-checked less often than its details
        if self.negative_cache_ttl <= self.cache_ttl {
            anyhow::bail!("negative_cache_ttl must be greater than cache_ttl");
        }

        if self.cache_sweep_interval.is_zero() {
            anyhow::bail!("cache_sweep_interval must be greater than 0");
        }

        if self.alert_queue_capacity == 0 {
            anyhow::bail!("alert_queue_capacity must be greater than 0");
        }

        if self.scrape_rate_per_minute == 0 || self.image_rate_per_minute == 0 {
            anyhow::bail!("rate limits must be greater than 0");
        }

        if self.image_max_bytes == 0 {
            anyhow::bail!("image_max_bytes must be greater than 0");
        }

        if self.allowed_origins.is_empty() {
            anyhow::bail!("allowed_origins cannot be empty");
        }

        Ok(())
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
