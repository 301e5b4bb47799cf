use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FeedError;

/// Map a feed error onto the HTTP status space.
pub fn error_response(err: FeedError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        FeedError::Validation(_) => StatusCode::BAD_REQUEST,
        FeedError::NotFoundOrUnauthorized | FeedError::NotFound => StatusCode::NOT_FOUND,
        FeedError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        FeedError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
    }
    (
        status,
        Json(serde_json::json!({
            "error": err.to_string()
        })),
    )
}

/// Pagination parameters for offset-based listings (hashtag lookups).
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
