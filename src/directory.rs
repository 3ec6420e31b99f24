//! Known feed names, for suggestions.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::feed::{decode_listing, FeedClient, FeedResponse};

/// Cache key of the popular feed list.
pub const DIRECTORY_CACHE_KEY: &str = "directory:popular";

/// Popular feed names, cached for a long retention window.
pub struct FeedDirectory {
    store: Arc<dyn CacheStore>,
    client: Arc<FeedClient>,
    ttl: Duration,
}

impl FeedDirectory {
    pub fn new(store: Arc<dyn CacheStore>, client: Arc<FeedClient>, ttl: Duration) -> Self {
        Self { store, client, ttl }
    }

    /// URL of the popular feeds listing.
    pub fn popular_url(&self) -> String {
        format!("{}/subreddits/popular.json?limit=100", self.client.base_url())
    }

    /// Popular feed names, most popular first.
    ///
    /// Failures yield an empty list and are not cached.
    pub async fn popular(&self) -> Vec<String> {
        if let Some(bytes) = self.store.get(DIRECTORY_CACHE_KEY).await {
            match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(names) => {
                    debug!(count = names.len(), "Feed directory served from cache");
                    return names;
                }
                Err(e) => warn!("Ignoring unreadable feed directory cache: {}", e),
            }
        }

        let url = self.popular_url();
        let body = match self
            .client
            .fetcher()
            .fetch(&url, self.client.min_interval())
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, "Feed directory unavailable: {}", e);
                return Vec::new();
            }
        };
        let names = match decode_listing(&body) {
            Ok(response) => feed_names(&response),
            Err(e) => {
                warn!(url = %url, "Unusable feed directory response: {}", e);
                return Vec::new();
            }
        };

        match serde_json::to_vec(&names) {
            Ok(bytes) => self.store.set(DIRECTORY_CACHE_KEY, bytes, Some(self.ttl)).await,
            Err(e) => warn!("Not caching feed directory: {}", e),
        }
        names
    }
}

fn feed_names(response: &FeedResponse) -> Vec<String> {
    response
        .entries
        .iter()
        .filter_map(|entry| entry.get("display_name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
