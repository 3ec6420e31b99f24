//! Shared application state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::cache::{CacheStore, FeedCache, MemoryCache};
use crate::config::Config;
use crate::directory::FeedDirectory;
use crate::feed::{FeedClient, Fetcher, HttpTransport, ReqwestTransport, VideoClient};
use crate::pipeline::Aggregator;
use crate::rate_limit::{Clock, HostRateLimiter, SystemClock};
use crate::{FlockError, Result};

/// Pipeline services shared by every request.
pub struct AppState {
    pub aggregator: Aggregator,
    pub directory: FeedDirectory,
}

impl AppState {
    /// Create a new application state.
    pub fn new(aggregator: Aggregator, directory: FeedDirectory) -> Self {
        Self {
            aggregator,
            directory,
        }
    }

    /// Wire the production services from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.feed)?);
        Self::with_transport(config, transport, Arc::new(SystemClock))
    }

    /// Wire the services around a given transport and clock.
    ///
    /// The record cache and the feed directory share one store, and every
    /// outbound request goes through one host rate limiter. Video titles are
    /// looked up only when an API key is configured.
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.cache.capacity)
            .ok_or_else(|| FlockError::Config("cache.capacity must be at least 1".to_string()))?;

        let limiter = Arc::new(HostRateLimiter::with_clock(clock.clone()));
        let fetcher = Arc::new(Fetcher::new(transport, limiter));
        let client = Arc::new(FeedClient::new(fetcher.clone(), &config.feed));

        let store: Arc<dyn CacheStore> = Arc::new(MemoryCache::with_clock(capacity, clock));
        let cache = FeedCache::new(store.clone(), client.clone(), config.cache.record_ttl());
        let directory = FeedDirectory::new(store, client, config.cache.directory_ttl());

        let mut aggregator = Aggregator::new(Arc::new(cache));
        if let Some(videos) = VideoClient::new(fetcher, &config.video) {
            aggregator = aggregator.with_videos(Arc::new(videos));
        }

        Ok(Self::new(aggregator, directory))
    }
}
