// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Feed retrieval: recent, popular and trending modes with stable cursor
//! pagination, plus the legacy unpaginated view.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeedError;
use crate::feed::cursor::Cursor;
use crate::feed::scoring::score_post;
use crate::feed::visibility::{filter_posts, has_trading_access};
use crate::models::{Post, Role, User};
use crate::store::FeedStore;

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_LIMIT: i64 = 20;

/// Trending only considers posts created within this window; popular ranks
/// the whole corpus.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Recent,
    Popular,
    Trending,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Popular => "popular",
            SortMode::Trending => "trending",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FeedError> {
        match s {
            "recent" => Ok(SortMode::Recent),
            "popular" => Ok(SortMode::Popular),
            "trending" => Ok(SortMode::Trending),
            other => Err(FeedError::validation(format!(
                "unknown sort mode '{}', expected recent, popular or trending",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<Post>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct FeedEngine {
    store: Arc<dyn FeedStore>,
}

impl FeedEngine {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        FeedEngine { store }
    }

    /// Serve one page of a user's feed.
    ///
    /// An invalid or tampered cursor token degrades to "start of feed"
    /// rather than surfacing an error.
    pub async fn get_feed(
        &self,
        user_id: i64,
        sort: SortMode,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<FeedPage, FeedError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(FeedError::validation(format!(
                "limit must be between {} and {}",
                MIN_LIMIT, MAX_LIMIT
            )));
        }

        let (user, blocked) = self.viewer(user_id).await?;
        let include_restricted = has_trading_access(&user);
        let cursor = cursor.and_then(Cursor::decode);
        debug!(
            user_id,
            sort = sort.as_str(),
            limit,
            has_cursor = cursor.is_some(),
            "serving feed page"
        );

        match sort {
            SortMode::Recent => {
                let rows = self
                    .store
                    .recent_page(&blocked, include_restricted, cursor, limit + 1)
                    .await?;
                Ok(Self::page(rows, limit))
            }
            SortMode::Popular => {
                self.scored_page(&blocked, include_restricted, None, cursor, limit)
                    .await
            }
            SortMode::Trending => {
                let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);
                self.scored_page(&blocked, include_restricted, Some(since), cursor, limit)
                    .await
            }
        }
    }

    /// Legacy unpaginated view: the entire eligible set in timestamp order.
    /// Administrators additionally see deactivated posts, merged back into
    /// the same order.
    pub async fn legacy_feed(&self, user_id: i64) -> Result<Vec<Post>, FeedError> {
        let (user, blocked) = self.viewer(user_id).await?;

        if user.role == Role::Admin {
            return self.store.all_posts_admin().await;
        }

        let include_restricted = has_trading_access(&user);
        let posts = self
            .store
            .eligible_posts(&blocked, include_restricted, None)
            .await?;
        Ok(filter_posts(posts, &user, &blocked))
    }

    async fn viewer(&self, user_id: i64) -> Result<(User, HashSet<i64>), FeedError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(FeedError::NotFound)?;
        let blocked = self.store.blocked_set(user_id).await?;
        Ok((user, blocked))
    }

    /// Popular/trending retrieval: fetch the full eligible candidate set,
    /// score and sort in memory, then slice from the cursor position.
    ///
    /// O(n) per page; acceptable at community scale. A larger corpus needs
    /// a maintained score index with the same tie-break semantics.
    async fn scored_page(
        &self,
        blocked: &HashSet<i64>,
        include_restricted: bool,
        since: Option<chrono::DateTime<Utc>>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<FeedPage, FeedError> {
        let candidates = self
            .store
            .eligible_posts(blocked, include_restricted, since)
            .await?;

        let now = Utc::now();
        let mut scored: Vec<(f64, Post)> = candidates
            .into_iter()
            .map(|p| (score_post(&p, now), p))
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });

        // Resume from the cursor's exact item; if it vanished (deleted or
        // re-ranked away), fall back to the start.
        let start = cursor
            .and_then(|c| scored.iter().position(|(_, p)| c.matches(p)).map(|i| i + 1))
            .unwrap_or(0);

        let rows: Vec<Post> = scored
            .into_iter()
            .skip(start)
            .take(limit as usize + 1)
            .map(|(_, p)| p)
            .collect();
        Ok(Self::page(rows, limit))
    }

    /// Build a page from a `limit+1` row fetch: the extra row only signals
    /// `has_more` and is never returned.
    fn page(mut rows: Vec<Post>, limit: i64) -> FeedPage {
        let has_more = rows.len() as i64 > limit;
        rows.truncate(limit as usize);
        let next_cursor = if has_more {
            rows.last().map(|p| Cursor::for_post(p).encode())
        } else {
            None
        };
        FeedPage {
            items: rows,
            next_cursor,
            has_more,
        }
    }
}
