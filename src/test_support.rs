//! In-process stubs shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use url::Url;

use crate::cache::CacheStore;
use crate::feed::HttpTransport;
use crate::{FlockError, Result};

/// Transport answering from a fixed URL → body table; unknown URLs get a 404.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FlockError::Http("status 404 Not Found".to_string()))
    }
}

/// Cache store that records every call and never expires anything.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    pub gets: Mutex<Vec<String>>,
    pub sets: Mutex<Vec<(String, Option<Duration>)>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn set_keys(&self) -> Vec<String> {
        self.sets.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.gets.lock().unwrap().push(key.to_string());
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        self.sets.lock().unwrap().push((key.to_string(), ttl));
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }
}

/// A raw listing entry as the feed API returns it.
pub fn entry(
    id: &str,
    subreddit: &str,
    url: &str,
    ups: u64,
    downs: u64,
    created_utc: i64,
) -> Map<String, Value> {
    match json!({
        "id": id,
        "title": format!("Title {id}"),
        "url": url,
        "permalink": format!("/r/{subreddit}/comments/{id}/"),
        "num_comments": 3,
        "ups": ups,
        "downs": downs,
        "score": ups as i64 - downs as i64,
        "author": "poster",
        "subreddit": subreddit,
        "created_utc": created_utc as f64,
        "domain": "youtube.com",
        "over_18": false
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// A listing envelope around `entries`.
pub fn listing(entries: Vec<Map<String, Value>>) -> String {
    let children: Vec<Value> = entries
        .into_iter()
        .map(|data| json!({ "kind": "t3", "data": data }))
        .collect();
    json!({ "kind": "Listing", "data": { "children": children } }).to_string()
}
