//! Cache for flock.
//!
//! [`CacheStore`] is a plain key/value byte store with optional per-entry
//! TTL. [`FeedCache`] sits on top of it and maps
//! `(feed name, sort, time window)` to normalized record lists.

pub mod codec;
pub mod layer;
pub mod store;

pub use codec::{decode_records, encode_records};
pub use layer::{cache_key, CacheOutcome, FeedCache, KEY_SEPARATOR};
pub use store::{CacheStore, MemoryCache};
