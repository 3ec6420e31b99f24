//! Feed directory and health handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::ApiResponse;
use crate::web::handlers::AppState;

/// GET /api/subreddits - Popular feed names for suggestions.
pub async fn list_subreddits(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::new(state.directory.popular().await))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
