// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Feed requests served, labelled by sort mode.
pub static FEED_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_requests_total",
        "Number of feed requests served, by sort mode",
        &["sort"]
    )
    .expect("register feed_requests_total")
});

pub static POSTS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("posts_created_total", "Number of posts created")
        .expect("register posts_created_total")
});

pub static MENTION_NOTIFICATIONS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "mention_notifications_total",
        "Number of mention notifications emitted"
    )
    .expect("register mention_notifications_total")
});

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
