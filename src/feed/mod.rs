//! Feed access for flock.
//!
//! Fetches submission listings from the feed API, keeps the ones linking to
//! videos and reduces each to a whitelisted [`Record`]. Video titles come
//! from a separate metadata API through [`VideoClient`].

pub mod client;
pub mod fetcher;
pub mod normalize;
pub mod types;
pub mod video;

pub use client::{decode_listing, FeedClient, FeedResponse};
pub use fetcher::{Fetcher, HttpTransport, ReqwestTransport};
pub use normalize::{normalize_url, video_id, CANONICAL_WATCH_URL};
pub use types::{parse_feed_names, Limit, Record, SortMode, TimeWindow, MAX_LIMIT, RECORD_FIELDS};
pub use video::{decode_titles, VideoClient, MAX_IDS_PER_REQUEST};
