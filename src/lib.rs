pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod models;
pub mod posts;
pub mod schema;
pub mod store;

#[macro_use]
extern crate diesel;
