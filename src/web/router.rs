//! Router configuration.

use axum::{body::Body, http::Request, middleware, middleware::Next, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{get_playlist, health_check, list_subreddits, AppState};
use super::middleware::{api_rate_limit, create_cors_layer, RateLimitState};
use crate::config::WebConfig;

/// Create the API router with a fresh per-client rate limit.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let rate_limit = Arc::new(RateLimitState::new(config.api_rate_limit));
    create_router_with_rate_limit(app_state, rate_limit, &config.cors_origins)
}

/// Create the API router around an existing rate limit state.
pub fn create_router_with_rate_limit(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let api_routes = Router::new()
        .route("/playlist", get(get_playlist))
        .route("/subreddits", get(list_subreddits))
        .layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            let state = rate_limit.clone();
            api_rate_limit(state, req, next)
        }));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rate_limit::ManualClock;
    use crate::test_support::StubTransport;
    use axum_test::TestServer;

    fn state() -> Arc<AppState> {
        Arc::new(
            AppState::with_transport(
                &Config::default(),
                Arc::new(StubTransport::new()),
                Arc::new(ManualClock::new()),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_health_router() {
        let server = TestServer::new(create_health_router()).unwrap();
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_api_rate_limit_applies() {
        let config = WebConfig {
            api_rate_limit: 2,
            ..WebConfig::default()
        };
        let server = TestServer::new(create_router(state(), &config)).unwrap();

        server.get("/api/subreddits").await.assert_status_ok();
        server.get("/api/subreddits").await.assert_status_ok();
        let response = server.get("/api/subreddits").await;
        assert_eq!(response.status_code(), 429);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = TestServer::new(create_router(state(), &WebConfig::default())).unwrap();
        server.get("/api/nope").await.assert_status_not_found();
    }
}
