//! Playlist handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, PlaylistQuery, PlaylistResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/playlist - Build a ranked playlist for the given feeds.
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<ApiResponse<PlaylistResponse>>, ApiError> {
    let request = query.to_request()?;

    let playlist = state.aggregator.build_playlist(&request).await.map_err(|e| {
        tracing::info!(feeds = ?request.feed_names, "No playlist: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(ApiResponse::new(PlaylistResponse::new(
        &request.feed_names,
        playlist,
    ))))
}
