// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! In-memory `FeedStore` used by the engine tests. Mirrors the ordering and
//! filtering semantics of the Postgres store exactly, including microsecond
//! timestamp precision.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FeedError;
use crate::feed::cursor::{truncate_to_micros, Cursor};
use crate::models::{
    Interaction, MentionEntry, NewPost, NotificationEvent, Post, User,
};
use crate::store::{FeedStore, Notifier};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    posts: Vec<Post>,
    next_post_id: i64,
    hashtags: Vec<(i64, String)>,
    mentions: Vec<MentionEntry>,
    next_mention_id: i64,
    blocks: HashSet<(i64, i64)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seed a user. The account service owns users in production; tests
    /// insert them directly.
    pub fn add_user(&self, user: User) {
        let mut inner = self.inner.lock().expect("memory store lock");
        inner.users.insert(user.id, user);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock")
    }
}

fn restricted(post: &Post) -> bool {
    post.content_class().is_restricted()
}

fn feed_order(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn ping(&self) -> Result<(), FeedError> {
        Ok(())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, FeedError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn user_by_handle(&self, handle: &str) -> Result<Option<User>, FeedError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.handle.eq_ignore_ascii_case(handle))
            .cloned())
    }

    async fn blocked_set(&self, user_id: i64) -> Result<HashSet<i64>, FeedError> {
        let inner = self.lock();
        let mut set = HashSet::new();
        for (blocker, blocked) in &inner.blocks {
            if *blocker == user_id {
                set.insert(*blocked);
            }
            if *blocked == user_id {
                set.insert(*blocker);
            }
        }
        Ok(set)
    }

    async fn insert_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError> {
        self.lock().blocks.insert((blocker_id, blocked_id));
        Ok(())
    }

    async fn remove_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError> {
        self.lock().blocks.remove(&(blocker_id, blocked_id));
        Ok(())
    }

    async fn is_blocked(&self, a: i64, b: i64) -> Result<bool, FeedError> {
        let inner = self.lock();
        Ok(inner.blocks.contains(&(a, b)) || inner.blocks.contains(&(b, a)))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, FeedError> {
        let mut inner = self.lock();
        inner.next_post_id += 1;
        let stored = Post {
            id: inner.next_post_id,
            author_id: post.author_id,
            body: post.body,
            image_url: post.image_url,
            message_type: post.message_type,
            post_type: post.post_type,
            like_count: post.like_count,
            comment_count: post.comment_count,
            repost_count: post.repost_count,
            created_at: truncate_to_micros(post.created_at),
            updated_at: truncate_to_micros(post.updated_at),
            deleted_at: None,
            deleted_by_moderator: false,
        };
        inner.posts.push(stored.clone());
        Ok(stored)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, FeedError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save_edit(
        &self,
        id: i64,
        body: Option<String>,
        image_url: Option<Option<String>>,
    ) -> Result<Post, FeedError> {
        let mut inner = self.lock();
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(FeedError::NotFound)?;
        if let Some(body) = body {
            post.body = body;
        }
        if let Some(image_url) = image_url {
            post.image_url = image_url;
        }
        post.updated_at = truncate_to_micros(Utc::now());
        Ok(post.clone())
    }

    async fn set_deleted(
        &self,
        id: i64,
        deleted: bool,
        by_moderator: bool,
    ) -> Result<Post, FeedError> {
        let mut inner = self.lock();
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(FeedError::NotFound)?;
        post.deleted_at = if deleted {
            Some(truncate_to_micros(Utc::now()))
        } else {
            None
        };
        post.deleted_by_moderator = deleted && by_moderator;
        post.updated_at = truncate_to_micros(Utc::now());
        Ok(post.clone())
    }

    async fn increment_counter(&self, id: i64, interaction: Interaction) -> Result<(), FeedError> {
        let mut inner = self.lock();
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(FeedError::NotFound)?;
        match interaction {
            Interaction::Like => post.like_count += 1,
            Interaction::Comment => post.comment_count += 1,
            Interaction::Repost => post.repost_count += 1,
        }
        Ok(())
    }

    async fn replace_tags(
        &self,
        post_id: i64,
        hashtags: &[String],
        mentions: &[(i64, String)],
    ) -> Result<(), FeedError> {
        let mut inner = self.lock();
        inner.hashtags.retain(|(pid, _)| *pid != post_id);
        for tag in hashtags {
            inner.hashtags.push((post_id, tag.clone()));
        }
        inner.mentions.retain(|m| m.post_id != post_id);
        for (user_id, handle) in mentions {
            inner.next_mention_id += 1;
            let entry = MentionEntry {
                id: inner.next_mention_id,
                post_id,
                user_id: *user_id,
                handle: handle.clone(),
            };
            inner.mentions.push(entry);
        }
        Ok(())
    }

    async fn mentions_for_post(&self, post_id: i64) -> Result<Vec<MentionEntry>, FeedError> {
        Ok(self
            .lock()
            .mentions
            .iter()
            .filter(|m| m.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn posts_by_hashtag(
        &self,
        tag: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, FeedError> {
        let inner = self.lock();
        let ids: HashSet<i64> = inner
            .hashtags
            .iter()
            .filter(|(_, t)| t == tag)
            .map(|(pid, _)| *pid)
            .collect();
        let mut posts: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id) && p.is_active())
            .cloned()
            .collect();
        posts.sort_by(feed_order);
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn recent_page(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Post>, FeedError> {
        let inner = self.lock();
        let mut posts: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| {
                p.is_active()
                    && !blocked.contains(&p.author_id)
                    && (include_restricted || !restricted(p))
                    && cursor.map_or(true, |c| c.bounds(p))
            })
            .cloned()
            .collect();
        posts.sort_by(feed_order);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn eligible_posts(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, FeedError> {
        let inner = self.lock();
        let mut posts: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| {
                p.is_active()
                    && !blocked.contains(&p.author_id)
                    && (include_restricted || !restricted(p))
                    && since.map_or(true, |s| p.created_at > s)
            })
            .cloned()
            .collect();
        posts.sort_by(feed_order);
        Ok(posts)
    }

    async fn all_posts_admin(&self) -> Result<Vec<Post>, FeedError> {
        let mut posts = self.lock().posts.clone();
        posts.sort_by(feed_order);
        Ok(posts)
    }
}

/// Notifier that records every event, for asserting on mention delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        RecordingNotifier::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FeedError> {
        self.events.lock().expect("notifier lock").push(event);
        Ok(())
    }
}
