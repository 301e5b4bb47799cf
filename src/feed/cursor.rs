// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Opaque pagination cursor over the `(created_at, id)` feed sort key.
//!
//! Tokens are URL-safe base64 over a compact JSON payload. Callers must
//! never parse or construct them by hand. Decoding a corrupt or foreign
//! token degrades to "no cursor" (start of feed) instead of surfacing a
//! server fault.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Post;

/// Sort key of the last item of a page. The `id` tie-break keeps the scan
/// stable when several posts share a creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

/// Wire payload. Timestamps travel as microseconds, matching the precision
/// Postgres stores.
#[derive(Debug, Serialize, Deserialize)]
struct CursorToken {
    t: i64,
    id: i64,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: i64) -> Self {
        Cursor { created_at, id }
    }

    pub fn for_post(post: &Post) -> Self {
        Cursor::new(post.created_at, post.id)
    }

    /// Encode to an opaque token.
    pub fn encode(&self) -> String {
        let token = CursorToken {
            t: self.created_at.timestamp_micros(),
            id: self.id,
        };
        // Serializing two integers cannot fail
        let payload = serde_json::to_vec(&token).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(payload)
    }

    /// Decode a token. Any malformed input yields `None`.
    pub fn decode(token: &str) -> Option<Self> {
        let payload = URL_SAFE_NO_PAD.decode(token).ok()?;
        let token: CursorToken = serde_json::from_slice(&payload).ok()?;
        let created_at = DateTime::from_timestamp_micros(token.t)?;
        Some(Cursor {
            created_at,
            id: token.id,
        })
    }

    /// Whether `post` comes strictly after this cursor in
    /// `(created_at DESC, id DESC)` order.
    pub fn bounds(&self, post: &Post) -> bool {
        post.created_at < self.created_at
            || (post.created_at == self.created_at && post.id < self.id)
    }

    /// Whether `post` is the exact item this cursor was taken from.
    pub fn matches(&self, post: &Post) -> bool {
        post.created_at == self.created_at && post.id == self.id
    }
}

/// Align a timestamp to microsecond precision, the precision Postgres keeps.
/// The in-memory store applies this on insert so cursor round-trips compare
/// equal across both stores.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(ts.timestamp_micros()).unwrap_or(ts)
}
