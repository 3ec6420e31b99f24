//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::{video_id, Record};
use crate::pipeline::Playlist;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// One playlist entry.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: String,
    pub title: String,
    /// Canonical video URL.
    pub url: String,
    pub permalink: String,
    pub subreddit: String,
    pub author: String,
    pub num_comments: u64,
    pub ups: u64,
    pub downs: u64,
    /// Net votes.
    pub score: i64,
    pub created_utc: i64,
    /// `created_utc` as RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Title on the video platform, when it could be looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
}

impl From<Record> for LinkResponse {
    fn from(record: Record) -> Self {
        let score = record.score();
        let created_at =
            DateTime::<Utc>::from_timestamp(record.created_utc, 0).map(|dt| dt.to_rfc3339());
        Self {
            id: record.id,
            title: record.title,
            url: record.url,
            permalink: record.permalink,
            subreddit: record.feed_name,
            author: record.author,
            num_comments: record.num_comments,
            ups: record.ups,
            downs: record.downs,
            score,
            created_utc: record.created_utc,
            created_at,
            video_title: None,
        }
    }
}

/// Response of `GET /api/playlist`.
#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    /// Requested feed names, space separated.
    pub subreddits: String,
    /// Embed URL playing every link in order.
    pub playlist_url: String,
    /// Ranked links.
    pub links: Vec<LinkResponse>,
}

impl PlaylistResponse {
    pub fn new(feed_names: &[String], playlist: Playlist) -> Self {
        let Playlist {
            records,
            url,
            video_titles,
        } = playlist;
        let links = records
            .into_iter()
            .map(|record| {
                let video_title =
                    video_id(&record.url).and_then(|id| video_titles.get(&id).cloned());
                LinkResponse {
                    video_title,
                    ..LinkResponse::from(record)
                }
            })
            .collect();

        Self {
            subreddits: feed_names.join(" "),
            playlist_url: url,
            links,
        }
    }
}
