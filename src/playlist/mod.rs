//! Playlist assembly for flock.
//!
//! Merged records are deduplicated by URL, ranked by the requested
//! [`SortMode`](crate::feed::SortMode), truncated, and turned into one
//! embeddable playlist URL.

pub mod embed;
pub mod rank;

pub use embed::{build_playlist_url, EMBED_BASE_URL};
pub use rank::{hot, rank, remove_duplicates, top, HOT_EPOCH, HOT_DECAY_SECONDS};
