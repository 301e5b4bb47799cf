// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Post lifecycle: create, edit, soft-delete and moderation, keeping the
//! hashtag/mention indexes exactly in sync with the post body.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::parser::{self, ParsedTags};
use crate::error::FeedError;
use crate::feed::visibility::has_trading_access;
use crate::metrics;
use crate::models::{
    ContentClass, NewPost, NotificationEvent, NotificationKind, Post, PostKind, PostTags,
    ResolvedMention, Role, User,
};
use crate::store::{FeedStore, Notifier};

pub const MAX_BODY_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub author_id: i64,
    pub body: String,
    pub image_url: Option<String>,
    pub message_type: Option<String>,
    pub post_type: Option<String>,
}

/// Edit patch. Absent fields are left unchanged. `image_url` is a double
/// option so an explicit JSON `null` removes the image while an absent
/// field keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A post together with its derived tag structure.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub tags: PostTags,
}

#[derive(Clone)]
pub struct PostLifecycle {
    store: Arc<dyn FeedStore>,
    notifier: Arc<dyn Notifier>,
}

impl PostLifecycle {
    pub fn new(store: Arc<dyn FeedStore>, notifier: Arc<dyn Notifier>) -> Self {
        PostLifecycle { store, notifier }
    }

    /// Create a post: validate, check creation permissions, parse the body,
    /// persist, build both tag indexes and emit mention notifications.
    pub async fn create(&self, draft: PostDraft) -> Result<PostView, FeedError> {
        let author = self
            .store
            .get_user(draft.author_id)
            .await?
            .ok_or(FeedError::NotFoundOrUnauthorized)?;

        let body = validate_body(&draft.body)?;

        let post_kind = match draft.post_type.as_deref() {
            None => PostKind::General,
            Some(s) => PostKind::parse(s)
                .ok_or_else(|| FeedError::validation(format!("unknown post type '{}'", s)))?,
        };
        if post_kind == PostKind::Ad && author.role != Role::Admin {
            return Err(FeedError::permission(
                "only administrators may create announcement posts",
            ));
        }

        let message_type = match draft.message_type.as_deref() {
            None => None,
            Some(s) => {
                let class = ContentClass::from_message_type(s).ok_or_else(|| {
                    FeedError::validation(format!("unknown message type '{}'", s))
                })?;
                if class.is_restricted() && !has_trading_access(&author) {
                    return Err(FeedError::permission(
                        "a premium subscription is required to post trading alerts",
                    ));
                }
                class.as_message_type().map(str::to_string)
            }
        };

        let parsed = parser::parse(&body);
        let mentions = self.resolve_mentions(&parsed.mentions).await?;

        let now = Utc::now();
        let post = self
            .store
            .insert_post(NewPost {
                author_id: author.id,
                body,
                image_url: draft.image_url,
                message_type,
                post_type: post_kind.as_str().to_string(),
                like_count: 0,
                comment_count: 0,
                repost_count: 0,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let index = mention_index(&mentions);
        self.store
            .replace_tags(post.id, &parsed.hashtags, &index)
            .await?;

        self.notify_mentions(&author, &post, &mentions, &[]).await;
        metrics::POSTS_CREATED.inc();
        debug!(post_id = post.id, author_id = author.id, "post created");

        Ok(PostView {
            tags: build_tags(parsed, mentions),
            post,
        })
    }

    /// Edit a post. Fails with `NotFoundOrUnauthorized` unless the post
    /// exists, is active, and `author_id` owns it. A body change re-parses
    /// and replaces both tag indexes; only newly resolved mentions are
    /// notified.
    pub async fn update(
        &self,
        post_id: i64,
        author_id: i64,
        patch: PostPatch,
    ) -> Result<PostView, FeedError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .filter(|p| p.is_active() && p.author_id == author_id)
            .ok_or(FeedError::NotFoundOrUnauthorized)?;
        let author = self
            .store
            .get_user(author_id)
            .await?
            .ok_or(FeedError::NotFoundOrUnauthorized)?;

        let new_body = match patch.body {
            Some(raw) => {
                let body = validate_body(&raw)?;
                if body == post.body {
                    None
                } else {
                    Some(body)
                }
            }
            None => None,
        };
        let body_changed = new_body.is_some();

        let updated = self
            .store
            .save_edit(post_id, new_body, patch.image_url)
            .await?;

        let (parsed, mentions) = if body_changed {
            let parsed = parser::parse(&updated.body);
            let mentions = self.resolve_mentions(&parsed.mentions).await?;
            let previously_notified: Vec<i64> = self
                .store
                .mentions_for_post(post_id)
                .await?
                .into_iter()
                .map(|m| m.user_id)
                .collect();

            let index = mention_index(&mentions);
            self.store
                .replace_tags(post_id, &parsed.hashtags, &index)
                .await?;

            self.notify_mentions(&author, &updated, &mentions, &previously_notified)
                .await;
            (parsed, mentions)
        } else {
            // Tags are unchanged; rebuild the view from the stored state.
            let parsed = parser::parse(&updated.body);
            let mentions = self.stored_mentions(post_id, &parsed).await?;
            (parsed, mentions)
        };

        debug!(post_id, author_id, body_changed, "post updated");
        Ok(PostView {
            tags: build_tags(parsed, mentions),
            post: updated,
        })
    }

    /// Author soft-delete. Same ownership check as `update`.
    pub async fn delete(&self, post_id: i64, author_id: i64) -> Result<Post, FeedError> {
        self.store
            .get_post(post_id)
            .await?
            .filter(|p| p.is_active() && p.author_id == author_id)
            .ok_or(FeedError::NotFoundOrUnauthorized)?;

        let post = self.store.set_deleted(post_id, true, false).await?;
        debug!(post_id, author_id, "post deleted by author");
        Ok(post)
    }

    /// Moderation: take a post out of circulation without destroying it.
    pub async fn moderate_deactivate(
        &self,
        post_id: i64,
        admin_id: i64,
    ) -> Result<Post, FeedError> {
        self.require_admin(admin_id).await?;

        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(FeedError::NotFound)?;
        if !post.is_active() {
            return Err(FeedError::validation("post is already inactive"));
        }

        let post = self.store.set_deleted(post_id, true, true).await?;
        debug!(post_id, admin_id, "post deactivated by moderator");
        Ok(post)
    }

    /// Undo a moderation deactivation. An author's own delete is not
    /// reversible through moderation.
    pub async fn moderate_reactivate(
        &self,
        post_id: i64,
        admin_id: i64,
    ) -> Result<Post, FeedError> {
        self.require_admin(admin_id).await?;

        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(FeedError::NotFound)?;
        if post.is_active() {
            return Err(FeedError::validation("post is already active"));
        }
        if !post.deleted_by_moderator {
            return Err(FeedError::validation(
                "post was removed by its author and cannot be reactivated",
            ));
        }

        let post = self.store.set_deleted(post_id, false, false).await?;
        debug!(post_id, admin_id, "post reactivated by moderator");
        Ok(post)
    }

    /// Derived tag structure for an existing post (read path).
    pub async fn tags_for(&self, post: &Post) -> Result<PostTags, FeedError> {
        let parsed = parser::parse(&post.body);
        let mentions = self.stored_mentions(post.id, &parsed).await?;
        Ok(build_tags(parsed, mentions))
    }

    async fn require_admin(&self, admin_id: i64) -> Result<User, FeedError> {
        let user = self
            .store
            .get_user(admin_id)
            .await?
            .ok_or_else(|| FeedError::permission("moderation requires an administrator"))?;
        if user.role != Role::Admin {
            return Err(FeedError::permission("moderation requires an administrator"));
        }
        Ok(user)
    }

    /// Resolve parsed mention handles against the user directory. Handles
    /// that do not resolve stay in the tag list but get no index row.
    async fn resolve_mentions(
        &self,
        handles: &[String],
    ) -> Result<Vec<ResolvedMention>, FeedError> {
        let mut resolved = Vec::with_capacity(handles.len());
        for handle in handles {
            let user = self.store.user_by_handle(handle).await?;
            resolved.push(ResolvedMention {
                handle: handle.clone(),
                user_id: user.map(|u| u.id),
            });
        }
        Ok(resolved)
    }

    /// Mentions for the read path: mark each parsed handle with its id from
    /// the mention index, leaving unresolved handles bare.
    async fn stored_mentions(
        &self,
        post_id: i64,
        parsed: &ParsedTags,
    ) -> Result<Vec<ResolvedMention>, FeedError> {
        let entries = self.store.mentions_for_post(post_id).await?;
        Ok(parsed
            .mentions
            .iter()
            .map(|handle| ResolvedMention {
                handle: handle.clone(),
                user_id: entries
                    .iter()
                    .find(|e| e.handle.eq_ignore_ascii_case(handle))
                    .map(|e| e.user_id),
            })
            .collect())
    }

    /// Emit one notification per newly resolved mention, skipping
    /// self-mentions and users notified by a previous revision. Failures
    /// are logged and swallowed: a missed notification is not worth
    /// failing the post.
    async fn notify_mentions(
        &self,
        author: &User,
        post: &Post,
        mentions: &[ResolvedMention],
        already_notified: &[i64],
    ) {
        for mention in mentions {
            let Some(user_id) = mention.user_id else {
                continue;
            };
            if user_id == author.id || already_notified.contains(&user_id) {
                continue;
            }

            let event = NotificationEvent {
                user_id,
                kind: NotificationKind::Mention,
                title: "You were mentioned".to_string(),
                message: format!("@{} mentioned you in a post", author.handle),
            };
            match self.notifier.notify(event).await {
                Ok(()) => {
                    metrics::MENTION_NOTIFICATIONS.inc();
                }
                Err(e) => {
                    warn!(
                        post_id = post.id,
                        mentioned_user = user_id,
                        error = %e,
                        "failed to emit mention notification"
                    );
                }
            }
        }
    }
}

fn validate_body(raw: &str) -> Result<String, FeedError> {
    let body = raw.trim();
    if body.is_empty() {
        return Err(FeedError::validation("post body must not be empty"));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(FeedError::validation(format!(
            "post body must be at most {} characters",
            MAX_BODY_CHARS
        )));
    }
    Ok(body.to_string())
}

fn mention_index(mentions: &[ResolvedMention]) -> Vec<(i64, String)> {
    mentions
        .iter()
        .filter_map(|m| m.user_id.map(|id| (id, m.handle.clone())))
        .collect()
}

fn build_tags(parsed: ParsedTags, mentions: Vec<ResolvedMention>) -> PostTags {
    PostTags {
        hashtags: parsed.hashtags,
        mentions,
        tickers: parsed.tickers,
    }
}
