// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Storage boundary of the feed engine.
//!
//! All durable state lives behind `FeedStore`; the engine and the post
//! lifecycle are injected with a store (and a `Notifier`) instead of
//! reaching for module-level singletons, so tests run against the
//! in-memory implementation.

pub mod memory;
pub mod pg;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FeedError;
use crate::feed::Cursor;
use crate::models::{Interaction, MentionEntry, NewPost, NotificationEvent, Post, User};

pub use memory::{MemoryStore, RecordingNotifier};
pub use pg::{PgNotifier, PgStore};

#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), FeedError>;

    // ── Users (read-only to the feed engine) ──

    async fn get_user(&self, id: i64) -> Result<Option<User>, FeedError>;

    /// Case-insensitive handle lookup, used for mention resolution.
    async fn user_by_handle(&self, handle: &str) -> Result<Option<User>, FeedError>;

    // ── Blocks ──

    /// The symmetric block set of a user: everyone they blocked plus
    /// everyone who blocked them.
    async fn blocked_set(&self, user_id: i64) -> Result<HashSet<i64>, FeedError>;

    async fn insert_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError>;

    async fn remove_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError>;

    /// Whether either user blocks the other.
    async fn is_blocked(&self, a: i64, b: i64) -> Result<bool, FeedError>;

    // ── Posts ──

    async fn insert_post(&self, post: NewPost) -> Result<Post, FeedError>;

    async fn get_post(&self, id: i64) -> Result<Option<Post>, FeedError>;

    /// Apply an edit. `None` fields are left unchanged; `image_url` takes a
    /// double option so `Some(None)` clears the image. `updated_at` is
    /// bumped by the store.
    async fn save_edit(
        &self,
        id: i64,
        body: Option<String>,
        image_url: Option<Option<String>>,
    ) -> Result<Post, FeedError>;

    /// Soft-delete or restore a post.
    async fn set_deleted(
        &self,
        id: i64,
        deleted: bool,
        by_moderator: bool,
    ) -> Result<Post, FeedError>;

    async fn increment_counter(&self, id: i64, interaction: Interaction) -> Result<(), FeedError>;

    // ── Tag indexes ──

    /// Replace both tag indexes of a post wholesale so they exactly mirror
    /// the current tag lists. Runs as one atomic unit in the Postgres store.
    async fn replace_tags(
        &self,
        post_id: i64,
        hashtags: &[String],
        mentions: &[(i64, String)],
    ) -> Result<(), FeedError>;

    async fn mentions_for_post(&self, post_id: i64) -> Result<Vec<MentionEntry>, FeedError>;

    async fn posts_by_hashtag(
        &self,
        tag: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, FeedError>;

    // ── Feed queries ──

    /// One filtered, cursor-bounded page of active posts in
    /// `(created_at DESC, id DESC)` order. `limit` already includes the
    /// engine's look-ahead row.
    async fn recent_page(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Post>, FeedError>;

    /// Every active post the viewer may see, newest first, optionally
    /// bounded to a creation window. Candidate set for in-memory scoring.
    async fn eligible_posts(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, FeedError>;

    /// Administrative view: active and deactivated posts merged back into
    /// `(created_at DESC, id DESC)` order.
    async fn all_posts_admin(&self) -> Result<Vec<Post>, FeedError>;
}

/// Sink for mention notification events. Emission is best-effort: callers
/// log failures and never propagate them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FeedError>;
}
