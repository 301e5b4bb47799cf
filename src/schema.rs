// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::table;

table! {
    users (id) {
        id -> Int8,
        handle -> Varchar,
        role -> Varchar,
        subscription_status -> Varchar,
        is_beta_user -> Bool,
        created_at -> Timestamptz,
    }
}

table! {
    posts (id) {
        id -> Int8,
        author_id -> Int8,
        body -> Text,
        image_url -> Nullable<Varchar>,
        message_type -> Nullable<Varchar>,
        post_type -> Varchar,
        like_count -> Int4,
        comment_count -> Int4,
        repost_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
        deleted_by_moderator -> Bool,
    }
}

table! {
    post_hashtags (id) {
        id -> Int8,
        post_id -> Int8,
        hashtag -> Varchar,
    }
}

table! {
    post_mentions (id) {
        id -> Int8,
        post_id -> Int8,
        user_id -> Int8,
        handle -> Varchar,
    }
}

table! {
    blocks (id) {
        id -> Int8,
        blocker_id -> Int8,
        blocked_id -> Int8,
        created_at -> Timestamptz,
    }
}

table! {
    notifications (id) {
        id -> Int8,
        user_id -> Int8,
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        created_at -> Timestamptz,
    }
}

allow_tables_to_appear_in_same_query!(
    users,
    posts,
    post_hashtags,
    post_mentions,
    blocks,
    notifications,
);
