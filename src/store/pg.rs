// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Postgres `FeedStore` backed by diesel-async and the deadpool connection
//! pool from `db.rs`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_function;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::db::{DbConnection, DbPool};
use crate::error::FeedError;
use crate::feed::Cursor;
use crate::models::block_list::NewBlock;
use crate::models::notification::NewNotification;
use crate::models::tag::{NewHashtagEntry, NewMentionEntry};
use crate::models::user::UserRow;
use crate::models::{
    Interaction, MentionEntry, NewPost, NotificationEvent, Post, User,
};
use crate::schema::{blocks, notifications, post_hashtags, post_mentions, posts, users};
use crate::store::{FeedStore, Notifier};

const RESTRICTED_MESSAGE_TYPES: [&str; 2] = ["signal", "trading_alert"];

sql_function! {
    fn lower(handle: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }

    async fn conn(&self) -> Result<DbConnection, FeedError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl FeedStore for PgStore {
    async fn ping(&self) -> Result<(), FeedError> {
        let _conn = self.conn().await?;
        Ok(())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, FeedError> {
        let mut conn = self.conn().await?;
        let row = users::table
            .find(id)
            .first::<UserRow>(&mut conn)
            .await
            .optional()?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_handle(&self, handle: &str) -> Result<Option<User>, FeedError> {
        let mut conn = self.conn().await?;
        // Compare on folded case, not ILIKE: `_` is a legal handle character
        // and would act as a wildcard in a pattern match.
        let row = users::table
            .filter(lower(users::handle).eq(handle.to_lowercase()))
            .first::<UserRow>(&mut conn)
            .await
            .optional()?;
        row.map(User::try_from).transpose()
    }

    async fn blocked_set(&self, user_id: i64) -> Result<HashSet<i64>, FeedError> {
        let mut conn = self.conn().await?;
        let outgoing: Vec<i64> = blocks::table
            .filter(blocks::blocker_id.eq(user_id))
            .select(blocks::blocked_id)
            .load(&mut conn)
            .await?;
        let incoming: Vec<i64> = blocks::table
            .filter(blocks::blocked_id.eq(user_id))
            .select(blocks::blocker_id)
            .load(&mut conn)
            .await?;
        Ok(outgoing.into_iter().chain(incoming).collect())
    }

    async fn insert_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError> {
        let mut conn = self.conn().await?;
        diesel::insert_into(blocks::table)
            .values(&NewBlock {
                blocker_id,
                blocked_id,
                created_at: Utc::now(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove_block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), FeedError> {
        let mut conn = self.conn().await?;
        diesel::delete(
            blocks::table
                .filter(blocks::blocker_id.eq(blocker_id))
                .filter(blocks::blocked_id.eq(blocked_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(())
    }

    async fn is_blocked(&self, a: i64, b: i64) -> Result<bool, FeedError> {
        let mut conn = self.conn().await?;
        let count: i64 = blocks::table
            .filter(
                blocks::blocker_id
                    .eq(a)
                    .and(blocks::blocked_id.eq(b))
                    .or(blocks::blocker_id.eq(b).and(blocks::blocked_id.eq(a))),
            )
            .count()
            .get_result(&mut conn)
            .await?;
        Ok(count > 0)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, FeedError> {
        let mut conn = self.conn().await?;
        let post = diesel::insert_into(posts::table)
            .values(&post)
            .get_result::<Post>(&mut conn)
            .await?;
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, FeedError> {
        let mut conn = self.conn().await?;
        Ok(posts::table
            .find(id)
            .first::<Post>(&mut conn)
            .await
            .optional()?)
    }

    async fn save_edit(
        &self,
        id: i64,
        body: Option<String>,
        image_url: Option<Option<String>>,
    ) -> Result<Post, FeedError> {
        let mut conn = self.conn().await?;
        let now = Utc::now();
        // Build the changeset from the provided fields only; an inner None
        // for the image writes NULL.
        let post = match (body, image_url) {
            (Some(body), Some(image_url)) => {
                diesel::update(posts::table.find(id))
                    .set((
                        posts::body.eq(body),
                        posts::image_url.eq(image_url),
                        posts::updated_at.eq(now),
                    ))
                    .get_result::<Post>(&mut conn)
                    .await?
            }
            (Some(body), None) => {
                diesel::update(posts::table.find(id))
                    .set((posts::body.eq(body), posts::updated_at.eq(now)))
                    .get_result::<Post>(&mut conn)
                    .await?
            }
            (None, Some(image_url)) => {
                diesel::update(posts::table.find(id))
                    .set((
                        posts::image_url.eq(image_url),
                        posts::updated_at.eq(now),
                    ))
                    .get_result::<Post>(&mut conn)
                    .await?
            }
            (None, None) => {
                diesel::update(posts::table.find(id))
                    .set(posts::updated_at.eq(now))
                    .get_result::<Post>(&mut conn)
                    .await?
            }
        };
        Ok(post)
    }

    async fn set_deleted(
        &self,
        id: i64,
        deleted: bool,
        by_moderator: bool,
    ) -> Result<Post, FeedError> {
        let mut conn = self.conn().await?;
        let now = Utc::now();
        let deleted_at = if deleted { Some(now) } else { None };
        let post = diesel::update(posts::table.find(id))
            .set((
                posts::deleted_at.eq(deleted_at),
                posts::deleted_by_moderator.eq(deleted && by_moderator),
                posts::updated_at.eq(now),
            ))
            .get_result::<Post>(&mut conn)
            .await?;
        Ok(post)
    }

    async fn increment_counter(&self, id: i64, interaction: Interaction) -> Result<(), FeedError> {
        let mut conn = self.conn().await?;
        let updated = match interaction {
            Interaction::Like => {
                diesel::update(posts::table.find(id))
                    .set(posts::like_count.eq(posts::like_count + 1))
                    .execute(&mut conn)
                    .await?
            }
            Interaction::Comment => {
                diesel::update(posts::table.find(id))
                    .set(posts::comment_count.eq(posts::comment_count + 1))
                    .execute(&mut conn)
                    .await?
            }
            Interaction::Repost => {
                diesel::update(posts::table.find(id))
                    .set(posts::repost_count.eq(posts::repost_count + 1))
                    .execute(&mut conn)
                    .await?
            }
        };
        if updated == 0 {
            return Err(FeedError::NotFound);
        }
        Ok(())
    }

    async fn replace_tags(
        &self,
        post_id: i64,
        hashtags: &[String],
        mentions: &[(i64, String)],
    ) -> Result<(), FeedError> {
        let mut conn = self.conn().await?;

        let hashtag_rows: Vec<NewHashtagEntry> = hashtags
            .iter()
            .map(|tag| NewHashtagEntry {
                post_id,
                hashtag: tag.clone(),
            })
            .collect();
        let mention_rows: Vec<NewMentionEntry> = mentions
            .iter()
            .map(|(user_id, handle)| NewMentionEntry {
                post_id,
                user_id: *user_id,
                handle: handle.clone(),
            })
            .collect();

        // Delete-then-insert in one transaction so readers never observe a
        // post with a partially replaced index.
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(post_hashtags::table.filter(post_hashtags::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                if !hashtag_rows.is_empty() {
                    diesel::insert_into(post_hashtags::table)
                        .values(&hashtag_rows)
                        .execute(conn)
                        .await?;
                }

                diesel::delete(post_mentions::table.filter(post_mentions::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                if !mention_rows.is_empty() {
                    diesel::insert_into(post_mentions::table)
                        .values(&mention_rows)
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        debug!(post_id, "tag indexes replaced");
        Ok(())
    }

    async fn mentions_for_post(&self, post_id: i64) -> Result<Vec<MentionEntry>, FeedError> {
        let mut conn = self.conn().await?;
        Ok(post_mentions::table
            .filter(post_mentions::post_id.eq(post_id))
            .load::<MentionEntry>(&mut conn)
            .await?)
    }

    async fn posts_by_hashtag(
        &self,
        tag: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, FeedError> {
        let mut conn = self.conn().await?;
        Ok(posts::table
            .inner_join(post_hashtags::table.on(post_hashtags::post_id.eq(posts::id)))
            .filter(post_hashtags::hashtag.eq(tag))
            .filter(posts::deleted_at.is_null())
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(Post::as_select())
            .load::<Post>(&mut conn)
            .await?)
    }

    async fn recent_page(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Post>, FeedError> {
        let mut conn = self.conn().await?;

        let mut query = posts::table
            .filter(posts::deleted_at.is_null())
            .into_boxed();
        if !blocked.is_empty() {
            let blocked: Vec<i64> = blocked.iter().copied().collect();
            query = query.filter(posts::author_id.ne_all(blocked));
        }
        if !include_restricted {
            query = query.filter(
                posts::message_type
                    .is_null()
                    .or(posts::message_type.ne_all(RESTRICTED_MESSAGE_TYPES.to_vec())),
            );
        }
        if let Some(cursor) = cursor {
            query = query.filter(
                posts::created_at.lt(cursor.created_at).or(posts::created_at
                    .eq(cursor.created_at)
                    .and(posts::id.lt(cursor.id))),
            );
        }

        Ok(query
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .load::<Post>(&mut conn)
            .await?)
    }

    async fn eligible_posts(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, FeedError> {
        let mut conn = self.conn().await?;

        let mut query = posts::table
            .filter(posts::deleted_at.is_null())
            .into_boxed();
        if !blocked.is_empty() {
            let blocked: Vec<i64> = blocked.iter().copied().collect();
            query = query.filter(posts::author_id.ne_all(blocked));
        }
        if !include_restricted {
            query = query.filter(
                posts::message_type
                    .is_null()
                    .or(posts::message_type.ne_all(RESTRICTED_MESSAGE_TYPES.to_vec())),
            );
        }
        if let Some(since) = since {
            query = query.filter(posts::created_at.gt(since));
        }

        Ok(query
            .order((posts::created_at.desc(), posts::id.desc()))
            .load::<Post>(&mut conn)
            .await?)
    }

    async fn all_posts_admin(&self) -> Result<Vec<Post>, FeedError> {
        let mut conn = self.conn().await?;
        Ok(posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .load::<Post>(&mut conn)
            .await?)
    }
}

/// Notifier that persists mention events to the notifications table.
pub struct PgNotifier {
    pool: DbPool,
}

impl PgNotifier {
    pub fn new(pool: DbPool) -> Self {
        PgNotifier { pool }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FeedError> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(notifications::table)
            .values(&NewNotification {
                user_id: event.user_id,
                kind: event.kind.as_str().to_string(),
                title: event.title,
                message: event.message,
                created_at: Utc::now(),
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
