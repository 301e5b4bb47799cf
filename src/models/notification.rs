// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::notifications;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Mention,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Mention => "mention",
        }
    }
}

/// Side-channel event emitted when a post mentions a user. Delivery is
/// best-effort: a failed notification is logged and never fails the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Insert model for the notifications table; the feed engine only writes
/// here, the notification service owns the read side.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
