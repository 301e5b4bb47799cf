// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Error taxonomy for the feed engine.
///
/// `NotFoundOrUnauthorized` deliberately conflates "missing" and "not yours"
/// so that edit/delete probes cannot reveal whether a post exists.
/// `PermissionDenied` stays distinct because the caller is expected to show
/// an upgrade prompt rather than a 404.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0}")]
    Validation(String),

    #[error("post not found")]
    NotFoundOrUnauthorized,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

impl FeedError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FeedError::Validation(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        FeedError::PermissionDenied(msg.into())
    }
}

impl From<diesel::result::Error> for FeedError {
    fn from(err: diesel::result::Error) -> Self {
        FeedError::Storage(err.to_string())
    }
}

impl From<deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>> for FeedError {
    fn from(err: deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>) -> Self {
        FeedError::Storage(format!("connection pool error: {}", err))
    }
}
