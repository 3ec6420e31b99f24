//! Configuration module for flock.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{FlockError, Result};

/// Remote feed API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the feed API (scheme + host, no trailing slash).
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
    /// User agent sent with every outbound request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `limit` query value sent to the feed API.
    ///
    /// The caller's own limit is applied after ranking, not here.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
    /// Minimum interval between two requests to the same host, in seconds.
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

fn default_feed_base_url() -> String {
    "http://www.reddit.com".to_string()
}

fn default_user_agent() -> String {
    "flock/0.1 by /u/rblstr".to_string()
}

fn default_fetch_limit() -> u32 {
    100
}

fn default_min_interval() -> u64 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_response_bytes() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl FeedConfig {
    /// Minimum per-host request interval as a `Duration`.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            user_agent: default_user_agent(),
            fetch_limit: default_fetch_limit(),
            min_interval_secs: default_min_interval(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Video metadata API configuration.
///
/// Title lookup is off unless `api_key` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    /// Base URL of the video metadata API.
    #[serde(default = "default_video_base_url")]
    pub base_url: String,
    /// API key sent with every lookup.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum interval between two lookups, in seconds.
    #[serde(default)]
    pub min_interval_secs: u64,
}

fn default_video_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

impl VideoConfig {
    /// Minimum lookup interval as a `Duration`.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: default_video_base_url(),
            api_key: None,
            min_interval_secs: 0,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries before LRU eviction.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Retention for per-feed record lists in seconds (0 = keep until evicted).
    #[serde(default)]
    pub record_ttl_secs: u64,
    /// Retention for the feed-name directory in seconds.
    #[serde(default = "default_directory_ttl")]
    pub directory_ttl_secs: u64,
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_directory_ttl() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

impl CacheConfig {
    /// Record TTL, or `None` when records are kept until evicted.
    pub fn record_ttl(&self) -> Option<Duration> {
        match self.record_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Directory TTL.
    pub fn directory_ttl(&self) -> Duration {
        Duration::from_secs(self.directory_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            record_ttl_secs: 0,
            directory_ttl_secs: default_directory_ttl(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/flock.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for API endpoints (requests per minute per client IP).
    #[serde(default = "default_api_rate_limit")]
    pub api_rate_limit: u32,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    5000
}

fn default_api_rate_limit() -> u32 {
    60
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            api_rate_limit: default_api_rate_limit(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Feed API configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Video metadata API configuration.
    #[serde(default)]
    pub video: VideoConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FlockError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FlockError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FLOCK_FEED_BASE_URL`: feed API base URL
    /// - `FLOCK_VIDEO_API_KEY`: video metadata API key
    /// - `FLOCK_WEB_PORT`: Web API port
    /// - `FLOCK_LOG_LEVEL`: log level
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("FLOCK_FEED_BASE_URL").filter(|v| !v.is_empty()) {
            self.feed.base_url = base_url;
        }
        if let Some(api_key) = lookup("FLOCK_VIDEO_API_KEY").filter(|v| !v.is_empty()) {
            self.video.api_key = Some(api_key);
        }
        if let Some(port) = lookup("FLOCK_WEB_PORT").and_then(|v| v.parse().ok()) {
            self.web.port = port;
        }
        if let Some(level) = lookup("FLOCK_LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.feed.base_url)
            .map_err(|e| FlockError::Config(format!("invalid feed base_url: {e}")))?;
        if self.video.api_key.is_some() {
            url::Url::parse(&self.video.base_url)
                .map_err(|e| FlockError::Config(format!("invalid video base_url: {e}")))?;
        }

        if self.feed.fetch_limit == 0 || self.feed.fetch_limit > 100 {
            return Err(FlockError::Config(format!(
                "feed fetch_limit must be between 1 and 100, got {}",
                self.feed.fetch_limit
            )));
        }
        if self.cache.capacity == 0 {
            return Err(FlockError::Config(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
