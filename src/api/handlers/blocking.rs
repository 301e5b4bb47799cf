// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::routes::error_response;
use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocker_id: i64,
    pub blocked_id: i64,
}

/// Response for block check
#[derive(Debug, Serialize)]
pub struct BlockCheckResponse {
    pub is_blocked: bool,
}

/// Record a block relationship. Feed visibility is symmetric regardless of
/// which side created the block.
pub async fn create_block(
    State(state): State<AppState>,
    Json(request): Json<BlockRequest>,
) -> impl IntoResponse {
    debug!(
        blocker_id = request.blocker_id,
        blocked_id = request.blocked_id,
        "creating block"
    );
    match state
        .store
        .insert_block(request.blocker_id, request.blocked_id)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "status": "blocked" })),
        ),
        Err(e) => error_response(e),
    }
}

/// Remove a block relationship.
pub async fn remove_block(
    State(state): State<AppState>,
    Path((blocker_id, blocked_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    match state.store.remove_block(blocker_id, blocked_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "unblocked" })),
        ),
        Err(e) => error_response(e),
    }
}

/// Check whether either user blocks the other.
pub async fn check_blocked(
    State(state): State<AppState>,
    Path((a, b)): Path<(i64, i64)>,
) -> impl IntoResponse {
    match state.store.is_blocked(a, b).await {
        Ok(is_blocked) => (
            StatusCode::OK,
            Json(serde_json::json!(BlockCheckResponse { is_blocked })),
        ),
        Err(e) => error_response(e),
    }
}
