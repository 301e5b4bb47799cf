use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{post_hashtags, post_mentions};

/// Hashtag index row. The whole set for a post is replaced on every edit so
/// the index always mirrors the post's current tag list.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_hashtags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewHashtagEntry {
    pub post_id: i64,
    pub hashtag: String,
}

/// Mention index row: only mentions that resolved to a real user get one.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = post_mentions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MentionEntry {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub handle: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_mentions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMentionEntry {
    pub post_id: i64,
    pub user_id: i64,
    pub handle: String,
}
