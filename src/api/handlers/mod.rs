pub mod blocking;
pub mod feed;
pub mod health;
pub mod metrics;
pub mod moderation;
pub mod posts;
