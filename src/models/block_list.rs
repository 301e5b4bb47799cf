use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::blocks;

/// Directed block relationship row. Visibility is symmetric: if A blocks B,
/// neither sees the other's posts regardless of which direction is queried.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBlock {
    pub blocker_id: i64,
    pub blocked_id: i64,
    pub created_at: DateTime<Utc>,
}
