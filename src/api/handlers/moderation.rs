// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::routes::error_response;
use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub admin_id: i64,
}

/// Take a post out of circulation (admin only).
pub async fn deactivate_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<ModerationRequest>,
) -> impl IntoResponse {
    match state
        .lifecycle
        .moderate_deactivate(post_id, request.admin_id)
        .await
    {
        Ok(post) => (
            StatusCode::OK,
            Json(serde_json::to_value(&post).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}

/// Undo a moderation deactivation (admin only). Author self-deletes cannot
/// be reactivated through this path.
pub async fn reactivate_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<ModerationRequest>,
) -> impl IntoResponse {
    match state
        .lifecycle
        .moderate_reactivate(post_id, request.admin_id)
        .await
    {
        Ok(post) => (
            StatusCode::OK,
            Json(serde_json::to_value(&post).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}
