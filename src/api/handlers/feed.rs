// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::api::routes::error_response;
use crate::api::AppState;
use crate::feed::engine::DEFAULT_LIMIT;
use crate::feed::SortMode;
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub user_id: i64,
    pub sort: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// Serve one page of a user's feed.
///
/// When neither cursor nor limit is supplied the whole eligible set is
/// returned unpaginated, preserving the legacy full-feed contract for
/// pre-pagination clients.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let sort = match query.sort.as_deref().map(SortMode::parse).transpose() {
        Ok(sort) => sort.unwrap_or(SortMode::Recent),
        Err(e) => return error_response(e),
    };
    metrics::FEED_REQUESTS.with_label_values(&[sort.as_str()]).inc();

    // Legacy full-feed mode: only for un-cursored, un-limited requests.
    if query.cursor.is_none() && query.limit.is_none() && sort == SortMode::Recent {
        return legacy_page(&state, query.user_id).await;
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    debug!(user_id = query.user_id, sort = sort.as_str(), limit, "feed request");

    match state
        .engine
        .get_feed(query.user_id, sort, query.cursor.as_deref(), limit)
        .await
    {
        Ok(page) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "items": page.items,
                "next_cursor": page.next_cursor,
                "has_more": page.has_more
            })),
        ),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct LegacyFeedQuery {
    pub user_id: i64,
}

/// Legacy unpaginated view. Administrators also see deactivated posts,
/// flagged in the payload.
pub async fn get_legacy_feed(
    State(state): State<AppState>,
    Query(query): Query<LegacyFeedQuery>,
) -> impl IntoResponse {
    legacy_page(&state, query.user_id).await
}

async fn legacy_page(
    state: &AppState,
    user_id: i64,
) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    match state.engine.legacy_feed(user_id).await {
        Ok(posts) => {
            let items: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| {
                    let mut value = serde_json::to_value(p).unwrap_or_default();
                    if let Some(obj) = value.as_object_mut() {
                        obj.insert(
                            "deactivated".to_string(),
                            serde_json::Value::Bool(p.deleted_at.is_some()),
                        );
                    }
                    value
                })
                .collect();
            (
                axum::http::StatusCode::OK,
                Json(serde_json::json!({
                    "items": items,
                    "next_cursor": null,
                    "has_more": false
                })),
            )
        }
        Err(e) => error_response(e),
    }
}
