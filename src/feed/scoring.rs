// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Decaying engagement score for popularity-based ordering.

use chrono::{DateTime, Utc};

use crate::models::Post;

// Comments weigh highest (deepest engagement), reposts next, likes least.
pub const LIKE_WEIGHT: f64 = 3.0;
pub const COMMENT_WEIGHT: f64 = 5.0;
pub const REPOST_WEIGHT: f64 = 4.0;

// Super-linear decay: rank falls faster than engagement can accumulate, so
// old high-engagement posts cannot dominate trending forever.
pub const DECAY_EXPONENT: f64 = 1.3;

/// `(likes*3 + comments*5 + reposts*4) / (1 + hours_since_creation)^1.3`.
///
/// Elapsed time is clamped to non-negative: clock skew must not let a
/// future-dated post score above its no-decay ceiling.
pub fn engagement_score(
    likes: i32,
    comments: i32,
    reposts: i32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let engagement = f64::from(likes) * LIKE_WEIGHT
        + f64::from(comments) * COMMENT_WEIGHT
        + f64::from(reposts) * REPOST_WEIGHT;
    let hours = ((now - created_at).num_milliseconds() as f64 / 3_600_000.0).max(0.0);
    engagement / (1.0 + hours).powf(DECAY_EXPONENT)
}

pub fn score_post(post: &Post, now: DateTime<Utc>) -> f64 {
    engagement_score(
        post.like_count,
        post.comment_count,
        post.repost_count,
        post.created_at,
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn weights_favor_comments_then_reposts_then_likes() {
        let now = Utc::now();
        let likes = engagement_score(1, 0, 0, now, now);
        let comments = engagement_score(0, 1, 0, now, now);
        let reposts = engagement_score(0, 0, 1, now, now);
        assert!(comments > reposts);
        assert!(reposts > likes);
    }

    #[test]
    fn score_decreases_with_age() {
        let now = Utc::now();
        let fresh = engagement_score(10, 5, 2, now, now);
        let hour_old = engagement_score(10, 5, 2, now - Duration::hours(1), now);
        let day_old = engagement_score(10, 5, 2, now - Duration::hours(24), now);
        assert!(fresh > hour_old);
        assert!(hour_old > day_old);
    }

    #[test]
    fn score_increases_with_each_counter() {
        let now = Utc::now();
        let created = now - Duration::hours(3);
        let base = engagement_score(10, 5, 2, created, now);
        assert!(engagement_score(11, 5, 2, created, now) > base);
        assert!(engagement_score(10, 6, 2, created, now) > base);
        assert!(engagement_score(10, 5, 3, created, now) > base);
    }

    #[test]
    fn negative_elapsed_time_is_clamped() {
        let now = Utc::now();
        let future = now + Duration::hours(2);
        let skewed = engagement_score(10, 0, 0, future, now);
        let fresh = engagement_score(10, 0, 0, now, now);
        assert_eq!(skewed, fresh);
    }

    #[test]
    fn zero_engagement_scores_zero() {
        let now = Utc::now();
        assert_eq!(engagement_score(0, 0, 0, now - Duration::hours(5), now), 0.0);
    }
}
