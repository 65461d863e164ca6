//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::UserId,
    infrastructure::dto::http::{PresenceDto, UnseenCountsDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get online users
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let user_ids = state.get_presence_usecase.execute().await;
    Json(PresenceDto::from_user_ids(user_ids))
}

/// Get unseen message counts of a user, keyed by counterpart
pub async fn get_unseen_counts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UnseenCountsDto>, StatusCode> {
    let user_id = match UserId::new(user_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid user id in path: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.get_unseen_counts_usecase.execute(&user_id).await {
        Ok(counts) => Ok(Json(UnseenCountsDto::new(&user_id, &counts))),
        Err(e) => {
            tracing::error!("Failed to compute unseen counts for '{}': {}", user_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
