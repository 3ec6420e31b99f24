//! Video title lookup.
//!
//! Asks the video metadata API for the titles of ranked records, batching
//! ids into as few requests as the API allows.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::VideoConfig;
use crate::feed::fetcher::Fetcher;
use crate::feed::normalize::video_id;
use crate::feed::types::Record;
use crate::{FlockError, Result};

/// Most ids the metadata API accepts in one lookup.
pub const MAX_IDS_PER_REQUEST: usize = 50;

#[derive(Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

/// Decode a video list into `id → title`.
pub fn decode_titles(body: &[u8]) -> Result<HashMap<String, String>> {
    let value: Value = serde_json::from_slice(body)?;

    if let Some(error) = value.get("error") {
        return Err(FlockError::Parse(format!("video API error: {error}")));
    }

    let list: VideoList = serde_json::from_value(value)?;
    Ok(list
        .items
        .into_iter()
        .map(|item| (item.id, item.snippet.title))
        .collect())
}

/// Client for the video metadata API.
pub struct VideoClient {
    fetcher: Arc<Fetcher>,
    base_url: String,
    api_key: String,
    min_interval: Duration,
}

impl VideoClient {
    /// Create a client, or `None` when no API key is configured.
    pub fn new(fetcher: Arc<Fetcher>, config: &VideoConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|key| !key.is_empty())?;
        Some(Self {
            fetcher,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            min_interval: config.min_interval(),
        })
    }

    /// URL looking up the snippets of `ids`.
    pub fn videos_url(&self, ids: &[String]) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("part", "snippet")
            .append_pair("id", &ids.join(","))
            .append_pair("key", &self.api_key)
            .finish();
        format!("{}/youtube/v3/videos?{}", self.base_url, query)
    }

    /// Titles of the videos `records` link to, keyed by video id.
    ///
    /// A failed lookup only loses the titles of its own batch.
    pub async fn titles(&self, records: &[Record]) -> HashMap<String, String> {
        let ids: Vec<String> = records.iter().filter_map(|r| video_id(&r.url)).collect();
        let mut titles = HashMap::new();

        for batch in ids.chunks(MAX_IDS_PER_REQUEST) {
            let url = self.videos_url(batch);
            let decoded = match self.fetcher.fetch(&url, self.min_interval).await {
                Ok(body) => decode_titles(&body),
                Err(e) => Err(e),
            };
            match decoded {
                Ok(found) => {
                    debug!(requested = batch.len(), found = found.len(), "Looked up video titles");
                    titles.extend(found);
                }
                Err(e) => warn!(ids = batch.len(), "No video titles: {}", e),
            }
        }
        titles
    }
}
