use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::user::ContentClass;
use crate::schema::posts;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub body: String,
    pub image_url: Option<String>,
    pub message_type: Option<String>,
    pub post_type: String,
    pub like_count: i32,
    pub comment_count: i32,
    pub repost_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_moderator: bool,
}

impl Post {
    /// Classification used by the visibility filter.
    pub fn content_class(&self) -> ContentClass {
        if self.post_type == "ad" {
            return ContentClass::Advertisement;
        }
        self.message_type
            .as_deref()
            .and_then(ContentClass::from_message_type)
            .unwrap_or(ContentClass::General)
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub author_id: i64,
    pub body: String,
    pub image_url: Option<String>,
    pub message_type: Option<String>,
    pub post_type: String,
    pub like_count: i32,
    pub comment_count: i32,
    pub repost_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Engagement counter bumped by the interactions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Like,
    Comment,
    Repost,
}

impl Interaction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(Interaction::Like),
            "comment" => Some(Interaction::Comment),
            "repost" => Some(Interaction::Repost),
            _ => None,
        }
    }
}

/// A mention as it appears in a post's tag structure: the raw handle plus the
/// resolved user id when the handle matched the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMention {
    pub handle: String,
    pub user_id: Option<i64>,
}

/// Derived tag structure of a post: three parallel lists, each ordered by
/// first occurrence in the body and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostTags {
    pub hashtags: Vec<String>,
    pub mentions: Vec<ResolvedMention>,
    pub tickers: Vec<String>,
}
