//! flock - playlists from subreddits
//!
//! Collects the video links posted to one or more subreddits, ranks them and
//! builds a single embeddable playlist URL.

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod feed;
pub mod logging;
pub mod pipeline;
pub mod playlist;
pub mod rate_limit;
pub mod web;

#[cfg(test)]
mod test_support;

pub use cache::{CacheStore, FeedCache, MemoryCache};
pub use config::Config;
pub use directory::FeedDirectory;
pub use error::{FlockError, Result};
pub use feed::{
    FeedClient, Fetcher, HttpTransport, Limit, Record, SortMode, TimeWindow, VideoClient,
};
pub use pipeline::{Aggregator, Playlist, PlaylistError, PlaylistRequest};
pub use rate_limit::{Clock, HostRateLimiter, ManualClock, SystemClock};
