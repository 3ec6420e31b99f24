//! Feed aggregation pipeline.
//!
//! [`Aggregator::build_playlist`] runs the whole chain for one request:
//! cached/fetched records for every feed name, deduplication, ranking,
//! truncation, video titles and the embed URL.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::FeedCache;
use crate::feed::{Limit, Record, SortMode, TimeWindow, VideoClient};
use crate::playlist::{build_playlist_url, rank, remove_duplicates};

/// Why no playlist could be built.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistError {
    /// The feed API gave no usable answer and nothing was cached.
    #[error("No Reddit response")]
    NoFeedResponse,

    /// The feeds answered but none of their entries link to a video.
    #[error("No links found")]
    NoLinksFound,
}

/// One playlist request, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRequest {
    pub feed_names: Vec<String>,
    pub sort: SortMode,
    pub window: TimeWindow,
    pub limit: Limit,
}

impl PlaylistRequest {
    /// Request for `feed_names` with default sort, window and limit.
    pub fn new(feed_names: Vec<String>) -> Self {
        Self {
            feed_names,
            sort: SortMode::default(),
            window: TimeWindow::default(),
            limit: Limit::default(),
        }
    }
}

/// Ranked records and their embed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub records: Vec<Record>,
    pub url: String,
    /// Titles from the video platform, keyed by video id. Empty when the
    /// lookup is disabled or failed.
    pub video_titles: HashMap<String, String>,
}

/// Merged records plus whether any part of them is missing because a fetch
/// failed.
#[derive(Debug, Clone, Default)]
pub struct Links {
    pub records: Vec<Record>,
    pub fetch_failed: bool,
}

/// Entry point of the pipeline.
pub struct Aggregator {
    cache: Arc<FeedCache>,
    videos: Option<Arc<VideoClient>>,
}

impl Aggregator {
    pub fn new(cache: Arc<FeedCache>) -> Self {
        Self {
            cache,
            videos: None,
        }
    }

    /// Look up video titles for every built playlist.
    pub fn with_videos(mut self, videos: Arc<VideoClient>) -> Self {
        self.videos = Some(videos);
        self
    }

    /// The cache layer in use.
    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Merged, unranked records for `feed_names`, grouped per feed in the
    /// order given.
    pub async fn build_links(
        &self,
        feed_names: &[String],
        sort: SortMode,
        window: TimeWindow,
    ) -> Links {
        let outcome = self.cache.get_or_fetch(feed_names, sort, window).await;
        debug!(
            hits = outcome.hits.len(),
            misses = outcome.misses.len(),
            records = outcome.records.len(),
            "Built links"
        );
        Links {
            records: outcome.records,
            fetch_failed: outcome.fetch_failed,
        }
    }

    /// Build the ranked playlist for `request`.
    ///
    /// Partial results are kept: a failed fetch only matters when nothing at
    /// all could be collected.
    pub async fn build_playlist(
        &self,
        request: &PlaylistRequest,
    ) -> std::result::Result<Playlist, PlaylistError> {
        if request.feed_names.is_empty() {
            return Err(PlaylistError::NoFeedResponse);
        }

        let links = self
            .build_links(&request.feed_names, request.sort, request.window)
            .await;
        if links.records.is_empty() {
            return Err(if links.fetch_failed {
                PlaylistError::NoFeedResponse
            } else {
                PlaylistError::NoLinksFound
            });
        }

        let mut records = remove_duplicates(links.records);
        rank(&mut records, request.sort, request.limit);

        let url = build_playlist_url(&records).map_err(|_| PlaylistError::NoLinksFound)?;
        let video_titles = match &self.videos {
            Some(videos) => videos.titles(&records).await,
            None => HashMap::new(),
        };
        info!(
            feeds = request.feed_names.len(),
            sort = %request.sort,
            window = %request.window,
            records = records.len(),
            titles = video_titles.len(),
            "Built playlist"
        );
        Ok(Playlist {
            records,
            url,
            video_titles,
        })
    }
}
