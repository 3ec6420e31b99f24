//! Per-feed record cache with partial-hit merging.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cache::codec::{decode_records, encode_records};
use crate::cache::store::CacheStore;
use crate::feed::{FeedClient, Record, SortMode, TimeWindow};

/// Separator between the parts of a cache key.
pub const KEY_SEPARATOR: char = ':';

/// Cache key for one `(feed name, sort, time window)` tuple.
///
/// Feed names are case-insensitive on the feed API, so the name is lowercased.
pub fn cache_key(feed_name: &str, sort: SortMode, window: TimeWindow) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        feed_name.to_lowercase(),
        sort.as_str(),
        window.as_str(),
        sep = KEY_SEPARATOR
    )
}

/// Result of one [`FeedCache::get_or_fetch`] call.
#[derive(Debug, Clone, Default)]
pub struct CacheOutcome {
    /// Merged records, grouped by feed in the order the names were given.
    pub records: Vec<Record>,
    /// Feed names served from the cache.
    pub hits: Vec<String>,
    /// Feed names that had to be fetched.
    pub misses: Vec<String>,
    /// Whether the combined fetch for the misses failed.
    pub fetch_failed: bool,
}

/// Record cache in front of the feed client.
pub struct FeedCache {
    store: Arc<dyn CacheStore>,
    client: Arc<FeedClient>,
    ttl: Option<Duration>,
}

impl FeedCache {
    /// Create a cache writing entries with `ttl` (`None` = until evicted).
    pub fn new(store: Arc<dyn CacheStore>, client: Arc<FeedClient>, ttl: Option<Duration>) -> Self {
        Self { store, client, ttl }
    }

    /// The feed client used for misses.
    pub fn client(&self) -> &Arc<FeedClient> {
        &self.client
    }

    async fn read(&self, key: &str) -> Option<Vec<Record>> {
        let bytes = self.store.get(key).await?;
        match decode_records(&bytes) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!(key = %key, "Ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    async fn write(&self, key: &str, records: &[Record]) {
        match encode_records(records) {
            Ok(bytes) => self.store.set(key, bytes, self.ttl).await,
            Err(e) => warn!(key = %key, "Not caching records: {}", e),
        }
    }

    /// Records for every name in `feed_names`.
    ///
    /// Cached names are served from the cache. All other names are fetched in
    /// one combined request; its records are split back out per name and each
    /// part is cached under its own key. A failed fetch writes nothing and
    /// contributes no records.
    ///
    /// Aggregate feeds (`all`, multireddits) answer with records attributed
    /// to other feeds. With a single miss every fetched record belongs to it.
    /// With several misses, records matching none of them are returned after
    /// the per-feed groups but are not cached.
    pub async fn get_or_fetch(
        &self,
        feed_names: &[String],
        sort: SortMode,
        window: TimeWindow,
    ) -> CacheOutcome {
        let mut seen = HashSet::new();
        let names: Vec<&String> = feed_names
            .iter()
            .filter(|name| seen.insert(name.to_lowercase()))
            .collect();
        let keys: Vec<String> = names.iter().map(|n| cache_key(n, sort, window)).collect();

        let mut slots: Vec<Option<Vec<Record>>> =
            join_all(keys.iter().map(|key| self.read(key))).await;

        let mut outcome = CacheOutcome::default();
        for (name, slot) in names.iter().zip(&slots) {
            if slot.is_some() {
                outcome.hits.push((*name).clone());
            } else {
                outcome.misses.push((*name).clone());
            }
        }
        debug!(hits = ?outcome.hits, misses = ?outcome.misses, "Cache lookup");

        let mut unattributed = Vec::new();
        if !outcome.misses.is_empty() {
            match self.client.fetch_records(&outcome.misses, sort, window).await {
                Some(fetched) => {
                    let (mut partitions, rest) = partition(fetched, &outcome.misses);
                    if !rest.is_empty() {
                        debug!(
                            count = rest.len(),
                            "Records from feeds outside the request"
                        );
                    }
                    unattributed = rest;
                    for (index, slot) in slots.iter_mut().enumerate() {
                        if slot.is_some() {
                            continue;
                        }
                        let part = partitions.remove(names[index].to_lowercase().as_str());
                        let part = part.unwrap_or_default();
                        self.write(&keys[index], &part).await;
                        *slot = Some(part);
                    }
                }
                None => outcome.fetch_failed = true,
            }
        }

        outcome.records = slots.into_iter().flatten().flatten().collect();
        outcome.records.extend(unattributed);
        outcome
    }
}

/// Split fetched records by attributed feed, keeping fetch order within each
/// part.
///
/// Records matching a requested name are re-attributed to its requested
/// spelling. When only one name was requested, every record lands in its part
/// and foreign records keep their own feed name. Otherwise records matching
/// no requested name are returned separately.
fn partition(
    records: Vec<Record>,
    requested: &[String],
) -> (HashMap<String, Vec<Record>>, Vec<Record>) {
    let mut parts: HashMap<String, Vec<Record>> = requested
        .iter()
        .map(|name| (name.to_lowercase(), Vec::new()))
        .collect();
    let single = match requested {
        [only] => Some(only.to_lowercase()),
        _ => None,
    };
    let mut rest = Vec::new();

    for mut record in records {
        let feed = record.feed_name.to_lowercase();
        let target = match requested.iter().find(|n| n.to_lowercase() == feed) {
            Some(name) => {
                record.feed_name = name.clone();
                Some(feed)
            }
            None => single.clone(),
        };
        match target.and_then(|key| parts.get_mut(&key)) {
            Some(part) => part.push(record),
            None => rest.push(record),
        }
    }
    (parts, rest)
}
