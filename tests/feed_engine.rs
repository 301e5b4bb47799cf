// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

//! End-to-end feed engine tests over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use tradepulse_feed::error::FeedError;
use tradepulse_feed::feed::{FeedEngine, SortMode};
use tradepulse_feed::models::{NewPost, Role, SubscriptionStatus, User};
use tradepulse_feed::posts::{PostDraft, PostLifecycle, PostPatch};
use tradepulse_feed::store::{FeedStore, MemoryStore, RecordingNotifier};

struct Harness {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    engine: FeedEngine,
    lifecycle: PostLifecycle,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = FeedEngine::new(store.clone());
    let lifecycle = PostLifecycle::new(store.clone(), notifier.clone());
    Harness {
        store,
        notifier,
        engine,
        lifecycle,
    }
}

fn user(id: i64, handle: &str, role: Role) -> User {
    User {
        id,
        handle: handle.to_string(),
        role,
        subscription_status: SubscriptionStatus::Free,
        is_beta_user: false,
    }
}

fn premium_user(id: i64, handle: &str) -> User {
    User {
        id,
        handle: handle.to_string(),
        role: Role::Premium,
        subscription_status: SubscriptionStatus::Premium,
        is_beta_user: false,
    }
}

fn new_post(author_id: i64, body: &str, created_at: DateTime<Utc>) -> NewPost {
    NewPost {
        author_id,
        body: body.to_string(),
        image_url: None,
        message_type: None,
        post_type: "general".to_string(),
        like_count: 0,
        comment_count: 0,
        repost_count: 0,
        created_at,
        updated_at: created_at,
    }
}

fn draft(author_id: i64, body: &str) -> PostDraft {
    PostDraft {
        author_id,
        body: body.to_string(),
        image_url: None,
        message_type: None,
        post_type: None,
    }
}

fn ids(posts: &[tradepulse_feed::models::Post]) -> Vec<i64> {
    posts.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn recent_feed_paginates_without_skips_or_repeats() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));
    h.store.add_user(user(2, "author", Role::Free));

    // Five posts in the same second; ids break the tie.
    let ts = DateTime::from_timestamp(1_756_000_000, 0).unwrap();
    for i in 0..5 {
        h.store
            .insert_post(new_post(2, &format!("post {}", i), ts))
            .await
            .unwrap();
    }

    let page1 = h
        .engine
        .get_feed(1, SortMode::Recent, None, 2)
        .await
        .unwrap();
    assert_eq!(ids(&page1.items), vec![5, 4]);
    assert!(page1.has_more);
    let cursor = page1.next_cursor.expect("cursor after a full page");

    let page2 = h
        .engine
        .get_feed(1, SortMode::Recent, Some(&cursor), 2)
        .await
        .unwrap();
    assert_eq!(ids(&page2.items), vec![3, 2]);
    assert!(page2.has_more);
    let cursor = page2.next_cursor.expect("cursor after a full page");

    let page3 = h
        .engine
        .get_feed(1, SortMode::Recent, Some(&cursor), 2)
        .await
        .unwrap();
    assert_eq!(ids(&page3.items), vec![1]);
    assert!(!page3.has_more);
    assert!(page3.next_cursor.is_none());
}

#[tokio::test]
async fn invalid_cursor_degrades_to_start_of_feed() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));
    h.store.add_user(user(2, "author", Role::Free));
    let ts = Utc::now();
    for i in 0..3 {
        h.store
            .insert_post(new_post(2, &format!("post {}", i), ts - Duration::minutes(i)))
            .await
            .unwrap();
    }

    let page = h
        .engine
        .get_feed(1, SortMode::Recent, Some("definitely-not-a-cursor"), 10)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn limit_out_of_range_is_rejected() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));

    let err = h.engine.get_feed(1, SortMode::Recent, None, 0).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));
    let err = h.engine.get_feed(1, SortMode::Recent, None, 101).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));
}

#[tokio::test]
async fn blocking_hides_posts_in_both_directions() {
    let h = harness();
    h.store.add_user(user(1, "alice", Role::Free));
    h.store.add_user(user(2, "bob", Role::Free));
    h.lifecycle.create(draft(1, "from alice")).await.unwrap();
    h.lifecycle.create(draft(2, "from bob")).await.unwrap();

    // Alice blocks Bob; neither sees the other.
    h.store.insert_block(1, 2).await.unwrap();

    let alices = h
        .engine
        .get_feed(1, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert!(alices.items.iter().all(|p| p.author_id != 2));

    let bobs = h
        .engine
        .get_feed(2, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert!(bobs.items.iter().all(|p| p.author_id != 1));
}

#[tokio::test]
async fn restricted_content_is_gated_by_access_level() {
    let h = harness();
    h.store.add_user(user(1, "free_viewer", Role::Free));
    h.store.add_user(premium_user(2, "premium_viewer"));
    h.store.add_user(premium_user(3, "analyst"));

    let mut signal = draft(3, "Entry point on $NVDA");
    signal.message_type = Some("signal".to_string());
    h.lifecycle.create(signal).await.unwrap();
    h.lifecycle.create(draft(3, "general market chat")).await.unwrap();

    let free_feed = h
        .engine
        .get_feed(1, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert!(free_feed.items.iter().all(|p| p.message_type.is_none()));
    assert_eq!(free_feed.items.len(), 1);

    let premium_feed = h
        .engine
        .get_feed(2, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert_eq!(premium_feed.items.len(), 2);
}

#[tokio::test]
async fn popular_ranks_by_engagement_and_paginates_stably() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));
    h.store.add_user(user(2, "author", Role::Free));

    let ts = Utc::now() - Duration::hours(1);
    let mut quiet = new_post(2, "quiet", ts);
    quiet.like_count = 1;
    let mut busy = new_post(2, "busy", ts);
    busy.comment_count = 50;
    let mut middling = new_post(2, "middling", ts);
    middling.repost_count = 5;
    let quiet = h.store.insert_post(quiet).await.unwrap();
    let busy = h.store.insert_post(busy).await.unwrap();
    let middling = h.store.insert_post(middling).await.unwrap();

    let page1 = h
        .engine
        .get_feed(1, SortMode::Popular, None, 2)
        .await
        .unwrap();
    assert_eq!(ids(&page1.items), vec![busy.id, middling.id]);
    assert!(page1.has_more);

    let page2 = h
        .engine
        .get_feed(
            1,
            SortMode::Popular,
            page1.next_cursor.as_deref(),
            2,
        )
        .await
        .unwrap();
    assert_eq!(ids(&page2.items), vec![quiet.id]);
    assert!(!page2.has_more);
}

#[tokio::test]
async fn trending_ignores_posts_outside_the_window() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));
    h.store.add_user(user(2, "author", Role::Free));

    let mut old_hit = new_post(2, "old viral post", Utc::now() - Duration::days(30));
    old_hit.like_count = 10_000;
    let old_hit = h.store.insert_post(old_hit).await.unwrap();
    let mut new_post_row = new_post(2, "fresh post", Utc::now() - Duration::hours(2));
    new_post_row.like_count = 3;
    let fresh = h.store.insert_post(new_post_row).await.unwrap();

    let trending = h
        .engine
        .get_feed(1, SortMode::Trending, None, 10)
        .await
        .unwrap();
    assert_eq!(ids(&trending.items), vec![fresh.id]);

    // Popular still ranks the whole corpus.
    let popular = h
        .engine
        .get_feed(1, SortMode::Popular, None, 10)
        .await
        .unwrap();
    assert_eq!(ids(&popular.items), vec![old_hit.id, fresh.id]);
}

#[tokio::test]
async fn create_parses_tags_and_notifies_mentions() {
    let h = harness();
    h.store.add_user(user(1, "poster", Role::Premium));
    h.store.add_user(user(2, "sarah", Role::Free));

    let view = h
        .lifecycle
        .create(draft(1, "Bullish on $AAPL! #Earnings #Q1 cc @sarah and @ghost"))
        .await
        .unwrap();

    assert_eq!(view.tags.hashtags, vec!["earnings", "q1"]);
    assert_eq!(view.tags.tickers, vec!["AAPL"]);
    assert_eq!(view.tags.mentions.len(), 2);
    assert_eq!(view.tags.mentions[0].handle, "sarah");
    assert_eq!(view.tags.mentions[0].user_id, Some(2));
    // Unresolved mention stays in the tag list without a user id.
    assert_eq!(view.tags.mentions[1].handle, "ghost");
    assert_eq!(view.tags.mentions[1].user_id, None);

    // Exactly one notification: resolved, non-self mention only.
    let events = h.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, 2);
    assert!(events[0].message.contains("@poster"));
}

#[tokio::test]
async fn underscore_handles_resolve_exactly_not_as_wildcards() {
    let h = harness();
    h.store.add_user(user(1, "poster", Role::Free));
    h.store.add_user(user(2, "sarah", Role::Free));

    // "_" is a legal handle character; "@s_rah" must not match "sarah".
    let view = h.lifecycle.create(draft(1, "ping @s_rah")).await.unwrap();
    assert_eq!(view.tags.mentions[0].handle, "s_rah");
    assert_eq!(view.tags.mentions[0].user_id, None);
    assert!(h.notifier.events().is_empty());

    // Once the exact handle exists, it resolves (case-insensitively).
    h.store.add_user(user(3, "s_rah", Role::Free));
    let view = h.lifecycle.create(draft(1, "ping @S_rah")).await.unwrap();
    assert_eq!(view.tags.mentions[0].user_id, Some(3));
    let events = h.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, 3);
}

#[tokio::test]
async fn self_mentions_are_not_notified() {
    let h = harness();
    h.store.add_user(user(1, "navel", Role::Free));

    h.lifecycle
        .create(draft(1, "talking to @navel myself"))
        .await
        .unwrap();
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn edit_replaces_tag_indexes_wholesale() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));
    h.store.add_user(user(2, "friend", Role::Free));

    let view = h
        .lifecycle
        .create(draft(1, "launch day #launch cc @friend"))
        .await
        .unwrap();
    let post_id = view.post.id;

    assert_eq!(
        ids(&h.store.posts_by_hashtag("launch", 10, 0).await.unwrap()),
        vec![post_id]
    );

    // Edit removes every tag; the indexes must be empty, not stale.
    let patch = PostPatch {
        body: Some("launch day went great".to_string()),
        image_url: None,
    };
    let updated = h.lifecycle.update(post_id, 1, patch).await.unwrap();
    assert!(updated.tags.hashtags.is_empty());
    assert!(updated.tags.mentions.is_empty());

    assert!(h
        .store
        .posts_by_hashtag("launch", 10, 0)
        .await
        .unwrap()
        .is_empty());
    assert!(h.store.mentions_for_post(post_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_notifies_only_newly_mentioned_users() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));
    h.store.add_user(user(2, "first", Role::Free));
    h.store.add_user(user(3, "second", Role::Free));

    let view = h
        .lifecycle
        .create(draft(1, "shoutout @first"))
        .await
        .unwrap();
    assert_eq!(h.notifier.events().len(), 1);

    let patch = PostPatch {
        body: Some("shoutout @first and @second".to_string()),
        image_url: None,
    };
    h.lifecycle.update(view.post.id, 1, patch).await.unwrap();

    let events = h.notifier.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].user_id, 3);
}

#[tokio::test]
async fn edit_can_remove_an_image() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));

    let mut with_image = draft(1, "chart attached");
    with_image.image_url = Some("https://cdn.tradepulse.io/chart.png".to_string());
    let view = h.lifecycle.create(with_image).await.unwrap();
    assert!(view.post.image_url.is_some());

    // An absent image field leaves the image alone.
    let patch = PostPatch {
        body: Some("chart attached, see above".to_string()),
        image_url: None,
    };
    let updated = h.lifecycle.update(view.post.id, 1, patch).await.unwrap();
    assert!(updated.post.image_url.is_some());

    // An explicit null clears it.
    let patch = PostPatch {
        body: None,
        image_url: Some(None),
    };
    let updated = h.lifecycle.update(view.post.id, 1, patch).await.unwrap();
    assert!(updated.post.image_url.is_none());
}

#[tokio::test]
async fn update_requires_ownership_and_liveness() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));
    h.store.add_user(user(2, "stranger", Role::Free));

    let view = h.lifecycle.create(draft(1, "my post")).await.unwrap();
    let post_id = view.post.id;

    let patch = PostPatch {
        body: Some("hijacked".to_string()),
        image_url: None,
    };
    let err = h.lifecycle.update(post_id, 2, patch.clone()).await;
    assert!(matches!(err, Err(FeedError::NotFoundOrUnauthorized)));

    let err = h.lifecycle.update(9999, 1, patch.clone()).await;
    assert!(matches!(err, Err(FeedError::NotFoundOrUnauthorized)));

    h.lifecycle.delete(post_id, 1).await.unwrap();
    let err = h.lifecycle.update(post_id, 1, patch).await;
    assert!(matches!(err, Err(FeedError::NotFoundOrUnauthorized)));
}

#[tokio::test]
async fn restricted_creation_requires_access() {
    let h = harness();
    h.store.add_user(user(1, "free_author", Role::Free));

    let mut signal = draft(1, "hot tip on $TSLA");
    signal.message_type = Some("signal".to_string());
    let err = h.lifecycle.create(signal).await;
    assert!(matches!(err, Err(FeedError::PermissionDenied(_))));
}

#[tokio::test]
async fn ad_posts_are_admin_only() {
    let h = harness();
    h.store.add_user(user(1, "regular", Role::Premium));
    h.store.add_user(user(2, "staff", Role::Admin));

    let mut ad = draft(1, "buy my course");
    ad.post_type = Some("ad".to_string());
    let err = h.lifecycle.create(ad).await;
    assert!(matches!(err, Err(FeedError::PermissionDenied(_))));

    let mut ad = draft(2, "platform announcement");
    ad.post_type = Some("ad".to_string());
    assert!(h.lifecycle.create(ad).await.is_ok());
}

#[tokio::test]
async fn body_validation_rejects_empty_and_oversized() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));

    let err = h.lifecycle.create(draft(1, "   ")).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));

    let err = h.lifecycle.create(draft(1, &"x".repeat(5001))).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));

    assert!(h.lifecycle.create(draft(1, &"x".repeat(5000))).await.is_ok());
}

#[tokio::test]
async fn moderation_is_admin_only_and_tracks_origin() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));
    h.store.add_user(user(2, "mod", Role::Admin));
    h.store.add_user(user(3, "viewer", Role::Free));

    let view = h.lifecycle.create(draft(1, "borderline post")).await.unwrap();
    let post_id = view.post.id;

    // Non-admin cannot moderate.
    let err = h.lifecycle.moderate_deactivate(post_id, 1).await;
    assert!(matches!(err, Err(FeedError::PermissionDenied(_))));

    h.lifecycle.moderate_deactivate(post_id, 2).await.unwrap();

    // Hidden from ordinary feeds…
    let feed = h
        .engine
        .get_feed(3, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert!(feed.items.is_empty());

    // …but present in the admin legacy view, flagged deactivated.
    let admin_view = h.engine.legacy_feed(2).await.unwrap();
    assert_eq!(ids(&admin_view), vec![post_id]);
    assert!(admin_view[0].deleted_at.is_some());
    assert!(admin_view[0].deleted_by_moderator);

    // A second deactivation is a validation error.
    let err = h.lifecycle.moderate_deactivate(post_id, 2).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));

    // Reactivation restores visibility.
    h.lifecycle.moderate_reactivate(post_id, 2).await.unwrap();
    let feed = h
        .engine
        .get_feed(3, SortMode::Recent, None, 10)
        .await
        .unwrap();
    assert_eq!(ids(&feed.items), vec![post_id]);
}

#[tokio::test]
async fn author_self_delete_cannot_be_reactivated() {
    let h = harness();
    h.store.add_user(user(1, "author", Role::Free));
    h.store.add_user(user(2, "mod", Role::Admin));

    let view = h.lifecycle.create(draft(1, "regretted post")).await.unwrap();
    h.lifecycle.delete(view.post.id, 1).await.unwrap();

    let err = h.lifecycle.moderate_reactivate(view.post.id, 2).await;
    assert!(matches!(err, Err(FeedError::Validation(_))));
}

#[tokio::test]
async fn moderation_on_missing_post_is_not_found() {
    let h = harness();
    h.store.add_user(user(2, "mod", Role::Admin));

    let err = h.lifecycle.moderate_deactivate(404, 2).await;
    assert!(matches!(err, Err(FeedError::NotFound)));
    let err = h.lifecycle.moderate_reactivate(404, 2).await;
    assert!(matches!(err, Err(FeedError::NotFound)));
}

#[tokio::test]
async fn legacy_feed_for_regular_users_filters_and_orders() {
    let h = harness();
    h.store.add_user(user(1, "viewer", Role::Free));
    h.store.add_user(premium_user(2, "analyst"));

    let mut signal = draft(2, "restricted signal");
    signal.message_type = Some("trading_alert".to_string());
    h.lifecycle.create(signal).await.unwrap();
    let kept = h.lifecycle.create(draft(2, "public note")).await.unwrap();

    let feed = h.engine.legacy_feed(1).await.unwrap();
    assert_eq!(ids(&feed), vec![kept.post.id]);
}
