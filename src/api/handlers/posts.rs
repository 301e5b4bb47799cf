// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::routes::{error_response, PaginationParams};
use crate::api::AppState;
use crate::error::FeedError;
use crate::models::Interaction;
use crate::posts::{PostDraft, PostPatch};

/// Create a post.
pub async fn create_post(
    State(state): State<AppState>,
    Json(draft): Json<PostDraft>,
) -> impl IntoResponse {
    match state.lifecycle.create(draft).await {
        Ok(view) => (
            StatusCode::CREATED,
            Json(serde_json::to_value(&view).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub author_id: i64,
    #[serde(flatten)]
    pub patch: PostPatch,
}

/// Edit a post. Only the author may edit, and only while the post is active.
/// Sending `"image_url": null` removes the image; omitting it keeps it.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> impl IntoResponse {
    match state
        .lifecycle
        .update(post_id, request.author_id, request.patch)
        .await
    {
        Ok(view) => (
            StatusCode::OK,
            Json(serde_json::to_value(&view).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub author_id: i64,
}

/// Author soft-delete.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<AuthorQuery>,
) -> impl IntoResponse {
    match state.lifecycle.delete(post_id, query.author_id).await {
        Ok(post) => (
            StatusCode::OK,
            Json(serde_json::to_value(&post).unwrap_or_default()),
        ),
        Err(e) => error_response(e),
    }
}

/// Fetch a single post with its derived tag structure.
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> impl IntoResponse {
    let post = match state.store.get_post(post_id).await {
        Ok(Some(post)) if post.is_active() => post,
        Ok(_) => return error_response(FeedError::NotFound),
        Err(e) => return error_response(e),
    };

    match state.lifecycle.tags_for(&post).await {
        Ok(tags) => {
            let mut value = serde_json::to_value(&post).unwrap_or_default();
            if let Some(obj) = value.as_object_mut() {
                obj.insert(
                    "tags".to_string(),
                    serde_json::to_value(&tags).unwrap_or_default(),
                );
            }
            (StatusCode::OK, Json(value))
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub kind: String,
}

/// Bump an engagement counter (like/comment/repost).
pub async fn add_interaction(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(request): Json<InteractionRequest>,
) -> impl IntoResponse {
    let Some(interaction) = Interaction::parse(&request.kind) else {
        return error_response(FeedError::validation(format!(
            "unknown interaction '{}', expected like, comment or repost",
            request.kind
        )));
    };

    match state.store.increment_counter(post_id, interaction).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "recorded" })),
        ),
        Err(e) => error_response(e),
    }
}

/// Posts carrying a hashtag, newest first.
pub async fn get_hashtag_posts(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let tag = tag.to_lowercase();
    match state
        .store
        .posts_by_hashtag(&tag, pagination.limit(), pagination.offset())
        .await
    {
        Ok(posts) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "hashtag": tag,
                "items": posts
            })),
        ),
        Err(e) => error_response(e),
    }
}
