//! Key/value cache stores.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;

use crate::rate_limit::{Clock, SystemClock};

/// Process-wide byte cache.
///
/// Keys are independent: there are no cross-key transactions, and concurrent
/// writers to one key race with last write winning.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value for `key`, if present and not expired.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`. `None` keeps it until evicted or overwritten.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);
}

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-memory LRU store.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a store holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a store whose expiry is measured on `clock`.
    pub fn with_clock(capacity: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => entry.expires_at.is_some_and(|at| at <= now),
        };
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| self.clock.now() + ttl);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key.to_string(), Entry { value, expires_at });
    }
}
