//! Test helpers for integration tests.
//!
//! Provides a local stand-in for the feed API and helpers to point a flock
//! configuration at it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use flock::Config;

/// Bodies served by the fake feed API, and every request it has seen.
#[derive(Default)]
pub struct FeedApiState {
    listings: Mutex<HashMap<String, String>>,
    popular: Mutex<Option<String>>,
    videos: Mutex<Option<String>>,
    requests: Mutex<Vec<String>>,
}

/// Local HTTP server answering like the feed API.
pub struct FakeFeedApi {
    pub addr: SocketAddr,
    state: Arc<FeedApiState>,
}

impl FakeFeedApi {
    /// Bind to an ephemeral port and start serving in the background.
    pub async fn start() -> Self {
        let state = Arc::new(FeedApiState::default());
        let router = Router::new()
            .route("/r/:feeds/:listing", get(listing))
            .route("/subreddits/popular.json", get(popular))
            .route("/youtube/v3/videos", get(videos))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake feed API");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self { addr, state }
    }

    /// Base URL to configure as `feed.base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `body` for the combined listing of `feeds` (`+`-joined) sorted by `sort`.
    pub fn serve_listing(&self, feeds: &str, sort: &str, body: String) {
        self.state
            .listings
            .lock()
            .unwrap()
            .insert(format!("{feeds}/{sort}.json"), body);
    }

    /// Serve `names` as the popular feed directory.
    pub fn serve_popular(&self, names: &[&str]) {
        let children: Vec<Value> = names
            .iter()
            .map(|name| json!({ "kind": "t5", "data": { "display_name": name } }))
            .collect();
        *self.state.popular.lock().unwrap() =
            Some(json!({ "kind": "Listing", "data": { "children": children } }).to_string());
    }

    /// Answer video lookups with `(id, title)` pairs.
    pub fn serve_videos(&self, items: &[(&str, &str)]) {
        let items: Vec<Value> = items
            .iter()
            .map(|(id, title)| json!({ "id": id, "snippet": { "title": title } }))
            .collect();
        *self.state.videos.lock().unwrap() = Some(json!({ "items": items }).to_string());
    }

    /// Paths and queries of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn listing(
    State(state): State<Arc<FeedApiState>>,
    Path((feeds, listing)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("/r/{feeds}/{listing}?{}", query.unwrap_or_default()));

    match state.listings.lock().unwrap().get(&format!("{feeds}/{listing}")) {
        Some(body) => ([("content-type", "application/json")], body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn popular(State(state): State<Arc<FeedApiState>>) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push("/subreddits/popular.json".to_string());

    match state.popular.lock().unwrap().clone() {
        Some(body) => ([("content-type", "application/json")], body).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn videos(State(state): State<Arc<FeedApiState>>, RawQuery(query): RawQuery) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("/youtube/v3/videos?{}", query.unwrap_or_default()));

    match state.videos.lock().unwrap().clone() {
        Some(body) => ([("content-type", "application/json")], body).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

/// A configuration pointed at `api`, without outbound throttling.
pub fn config_for(api: &FakeFeedApi) -> Config {
    let mut config = Config::default();
    config.feed.base_url = api.base_url();
    config.feed.min_interval_secs = 0;
    config.video.base_url = api.base_url();
    config.web.api_rate_limit = 1000;
    config
}

/// One listing entry as the feed API returns it.
pub fn entry(id: &str, subreddit: &str, url: &str, ups: u64, downs: u64, created_utc: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Title {id}"),
        "url": url,
        "permalink": format!("/r/{subreddit}/comments/{id}/"),
        "num_comments": 1,
        "ups": ups,
        "downs": downs,
        "author": "poster",
        "subreddit": subreddit,
        "created_utc": created_utc as f64,
        "thumbnail": "default",
        "over_18": false
    })
}

/// A listing envelope around `entries`.
pub fn listing_body(entries: Vec<Value>) -> String {
    let children: Vec<Value> = entries
        .into_iter()
        .map(|data| json!({ "kind": "t3", "data": data }))
        .collect();
    json!({ "kind": "Listing", "data": { "children": children } }).to_string()
}
