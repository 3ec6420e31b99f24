//! Feed API client.
//!
//! Builds one combined listing request for a set of feed names and turns the
//! JSON listing into normalized [`Record`]s.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::config::FeedConfig;
use crate::feed::fetcher::Fetcher;
use crate::feed::normalize::{absolute_permalink, decode_entities, normalize_url};
use crate::feed::types::{Record, SortMode, TimeWindow};
use crate::{FlockError, Result};

/// Decoded listing: the `data` object of every child, untouched.
#[derive(Debug, Clone, Default)]
pub struct FeedResponse {
    pub entries: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: Map<String, Value>,
}

/// Decode a listing envelope (`{data:{children:[{data:{..}}]}}`).
///
/// An `{error: ..}` envelope is an error even when the status was 2xx.
pub fn decode_listing(body: &[u8]) -> Result<FeedResponse> {
    let value: Value = serde_json::from_slice(body)?;

    if let Some(error) = value.get("error") {
        return Err(FlockError::Parse(format!("feed API error: {error}")));
    }

    let listing: Listing = serde_json::from_value(value)?;
    Ok(FeedResponse {
        entries: listing.data.children.into_iter().map(|c| c.data).collect(),
    })
}

/// Client for the remote feed API.
pub struct FeedClient {
    fetcher: Arc<Fetcher>,
    base_url: String,
    fetch_limit: u32,
    min_interval: Duration,
}

impl FeedClient {
    /// Create a client from the feed configuration.
    pub fn new(fetcher: Arc<Fetcher>, config: &FeedConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            fetch_limit: config.fetch_limit,
            min_interval: config.min_interval(),
        }
    }

    /// Base URL of the feed API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared fetcher.
    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Minimum per-host interval applied to this client's requests.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// URL of the combined listing for `feed_names`, in the given order.
    pub fn listing_url(&self, feed_names: &[String], sort: SortMode, window: TimeWindow) -> String {
        let path = feed_names
            .iter()
            .map(|name| urlencoding::encode(name).into_owned())
            .collect::<Vec<_>>()
            .join("+");
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("t", window.as_str())
            .append_pair("limit", &self.fetch_limit.to_string())
            .finish();

        format!("{}/r/{}/{}.json?{}", self.base_url, path, sort.as_str(), query)
    }

    /// Fetch the combined listing for `feed_names`.
    ///
    /// Transport errors, non-2xx statuses, undecodable payloads and error
    /// envelopes all yield `None`.
    pub async fn fetch_feed(
        &self,
        feed_names: &[String],
        sort: SortMode,
        window: TimeWindow,
    ) -> Option<FeedResponse> {
        if feed_names.is_empty() {
            return None;
        }
        let url = self.listing_url(feed_names, sort, window);

        let body = match self.fetcher.fetch(&url, self.min_interval).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, "No feed response: {}", e);
                return None;
            }
        };

        match decode_listing(&body) {
            Ok(response) => {
                info!(
                    feeds = feed_names.len(),
                    entries = response.entries.len(),
                    "Fetched {}",
                    url
                );
                Some(response)
            }
            Err(e) => {
                warn!(url = %url, "Unusable feed response: {}", e);
                None
            }
        }
    }

    /// Normalize and project every usable entry of `response`.
    ///
    /// Entries that do not link to a video are dropped silently. The entry's
    /// `subreddit` becomes the record's `feed_name`.
    pub fn parse_response(&self, response: FeedResponse) -> Vec<Record> {
        response
            .entries
            .into_iter()
            .filter_map(|entry| self.parse_entry(entry))
            .collect()
    }

    fn parse_entry(&self, mut entry: Map<String, Value>) -> Option<Record> {
        let url = entry.get("url").and_then(Value::as_str).and_then(normalize_url)?;
        entry.insert("url".to_string(), Value::String(url));

        if let Some(title) = entry.get("title").and_then(Value::as_str) {
            let title = decode_entities(title);
            entry.insert("title".to_string(), Value::String(title));
        }
        if let Some(permalink) = entry.get("permalink").and_then(Value::as_str) {
            let permalink = absolute_permalink(&self.base_url, permalink);
            entry.insert("permalink".to_string(), Value::String(permalink));
        }
        if let Some(feed) = entry.get("subreddit").cloned() {
            entry.insert("feed_name".to_string(), feed);
        }

        match Record::project(&entry) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping entry: {}", e);
                None
            }
        }
    }

    /// Fetch and parse in one step.
    pub async fn fetch_records(
        &self,
        feed_names: &[String],
        sort: SortMode,
        window: TimeWindow,
    ) -> Option<Vec<Record>> {
        let response = self.fetch_feed(feed_names, sort, window).await?;
        Some(self.parse_response(response))
    }
}
