// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! Visibility rules: symmetric blocking and role-based content gating.

use std::collections::HashSet;

use crate::models::{Post, Role, SubscriptionStatus, User};

/// Single access predicate gating trading-alert visibility, trading-alert
/// creation, and course/module access. One gate, three call sites.
pub fn has_trading_access(user: &User) -> bool {
    matches!(user.role, Role::Admin | Role::Premium | Role::Legacy)
        || user.is_beta_user
        || matches!(
            user.subscription_status,
            SubscriptionStatus::Premium | SubscriptionStatus::Trial
        )
}

/// Whether `viewer` may see `post` in a feed. `blocked` is the viewer's
/// symmetric block set (both directions already expanded by the store).
pub fn can_view(post: &Post, viewer: &User, blocked: &HashSet<i64>) -> bool {
    if !post.is_active() {
        return false;
    }
    if blocked.contains(&post.author_id) {
        return false;
    }
    if post.content_class().is_restricted() && !has_trading_access(viewer) {
        return false;
    }
    true
}

/// Filter a candidate set down to what `viewer` may see.
pub fn filter_posts(posts: Vec<Post>, viewer: &User, blocked: &HashSet<i64>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|p| can_view(p, viewer, blocked))
        .collect()
}
