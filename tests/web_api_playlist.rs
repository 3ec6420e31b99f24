//! Web API Playlist Tests
//!
//! Integration tests for the playlist, directory and health endpoints.

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{config_for, entry, listing_body, FakeFeedApi};
use flock::web::router::create_health_router;
use flock::web::{create_router, AppState};
use flock::Config;
use serde_json::Value;

/// Create a test server whose feed API is `api`.
fn create_test_server(api: &FakeFeedApi) -> TestServer {
    create_test_server_with(config_for(api))
}

fn create_test_server_with(config: Config) -> TestServer {
    let state = Arc::new(AppState::from_config(&config).expect("Failed to build app state"));
    let router = create_router(state, &config.web).merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

#[tokio::test]
async fn test_get_playlist() {
    let api = FakeFeedApi::start().await;
    api.serve_listing(
        "futuregarage+futurebeats",
        "top",
        listing_body(vec![
            entry("a", "futuregarage", "http://youtu.be/wRpHf4X7FNM", 12, 2, 1_385_412_345),
            entry("b", "futurebeats", "http://www.youtube.com/watch?v=IlEkvbRmfrA", 30, 0, 1_385_400_000),
        ]),
    );
    let server = create_test_server(&api);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "futuregarage futurebeats")
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let data = &body["data"];
    assert_eq!(data["subreddits"], "futuregarage futurebeats");

    let links = data["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["id"], "b");
    assert_eq!(links[0]["score"], 30);
    assert_eq!(links[0]["subreddit"], "futurebeats");
    assert_eq!(links[1]["url"], "http://www.youtube.com/watch?v=wRpHf4X7FNM");
    assert_eq!(links[1]["title"], "Title a");
    assert!(links[1].get("thumbnail").is_none());
    assert_eq!(links[1]["created_at"], "2013-11-25T20:45:45+00:00");

    assert_eq!(
        data["playlist_url"],
        "http://www.youtube.com/embed/IlEkvbRmfrA?autohide=0&showinfo=1&modestbranding=1&rel=0&enablejsapi=1&version=3&playlist=wRpHf4X7FNM"
    );
}

#[tokio::test]
async fn test_get_playlist_plus_separated_with_options() {
    let api = FakeFeedApi::start().await;
    api.serve_listing(
        "a+b",
        "hot",
        listing_body(vec![
            entry("1", "a", "http://youtu.be/one", 5, 0, 1_400_000_000),
            entry("2", "b", "http://youtu.be/two", 5, 0, 1_400_000_100),
            entry("3", "b", "http://youtu.be/three", 1, 0, 1_300_000_000),
        ]),
    );
    let server = create_test_server(&api);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "a+b")
        .add_query_param("sort", "hot")
        .add_query_param("t", "year")
        .add_query_param("limit", "2")
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let ids: Vec<_> = body["data"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(api.requests(), vec!["/r/a+b/hot.json?t=year&limit=100"]);
}

#[tokio::test]
async fn test_get_playlist_with_video_titles() {
    let api = FakeFeedApi::start().await;
    api.serve_listing(
        "futuregarage",
        "top",
        listing_body(vec![entry("a", "futuregarage", "http://youtu.be/wRpHf4X7FNM", 12, 2, 1)]),
    );
    api.serve_videos(&[("wRpHf4X7FNM", "Sepia - Lost")]);
    let mut config = config_for(&api);
    config.video.api_key = Some("k3y".to_string());
    let server = create_test_server_with(config);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "futuregarage")
        .await;

    response.assert_status_ok();
    let link = &response.json::<Value>()["data"]["links"][0];
    assert_eq!(link["title"], "Title a");
    assert_eq!(link["video_title"], "Sepia - Lost");
}

#[tokio::test]
async fn test_get_playlist_from_aggregate_feed() {
    let api = FakeFeedApi::start().await;
    api.serve_listing(
        "all",
        "top",
        listing_body(vec![
            entry("1", "music", "http://youtu.be/one", 1, 0, 1),
            entry("2", "videos", "http://youtu.be/two", 2, 0, 1),
        ]),
    );
    let server = create_test_server(&api);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "all")
        .await;

    response.assert_status_ok();
    let links = response.json::<Value>()["data"]["links"].clone();
    assert_eq!(links[0]["subreddit"], "videos");
    assert_eq!(links[1]["subreddit"], "music");
}

#[tokio::test]
async fn test_invalid_parameters() {
    let api = FakeFeedApi::start().await;
    let server = create_test_server(&api);

    for (key, value, message) in [
        ("sort", "error", "Invalid sort type: error"),
        ("t", "error", "Invalid time type: error"),
        ("limit", "1000", "Invalid limit: 1000"),
        ("limit", "0", "Invalid limit: 0"),
    ] {
        let response = server
            .get("/api/playlist")
            .add_query_param("subreddits", "futuregarage")
            .add_query_param(key, value)
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], message);
    }

    let response = server.get("/api/playlist").await;
    response.assert_status_bad_request();

    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_no_reddit_response() {
    let api = FakeFeedApi::start().await;
    let server = create_test_server(&api);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "nosuchfeed")
        .await;

    assert_eq!(response.status_code(), 502);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "BAD_GATEWAY");
    assert_eq!(body["error"]["message"], "No Reddit response");
}

#[tokio::test]
async fn test_no_links_found() {
    let api = FakeFeedApi::start().await;
    api.serve_listing(
        "pics",
        "top",
        listing_body(vec![entry("1", "pics", "http://i.imgur.com/2A2IS5z.jpg", 1, 0, 1)]),
    );
    let server = create_test_server(&api);

    let response = server
        .get("/api/playlist")
        .add_query_param("subreddits", "pics")
        .await;

    response.assert_status_not_found();
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "No links found");
}

#[tokio::test]
async fn test_list_subreddits() {
    let api = FakeFeedApi::start().await;
    api.serve_popular(&["music", "futuregarage", "listentothis"]);
    let server = create_test_server(&api);

    for _ in 0..2 {
        let response = server.get("/api/subreddits").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(
            body["data"],
            serde_json::json!(["music", "futuregarage", "listentothis"])
        );
    }

    // Second call is served from the cache.
    assert_eq!(api.requests(), vec!["/subreddits/popular.json"]);
}

#[tokio::test]
async fn test_list_subreddits_unavailable() {
    let api = FakeFeedApi::start().await;
    let server = create_test_server(&api);

    let response = server.get("/api/subreddits").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_rate_limit() {
    let api = FakeFeedApi::start().await;
    let mut config = config_for(&api);
    config.web.api_rate_limit = 1;
    let server = create_test_server_with(config);

    server.get("/api/subreddits").await.assert_status_ok();
    let response = server.get("/api/subreddits").await;
    assert_eq!(response.status_code(), 429);
    assert_eq!(response.json::<Value>()["error"]["code"], "TOO_MANY_REQUESTS");
}

#[tokio::test]
async fn test_health_check() {
    let api = FakeFeedApi::start().await;
    let server = create_test_server(&api);

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}
