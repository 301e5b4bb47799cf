pub mod cursor;
pub mod engine;
pub mod scoring;
pub mod visibility;

pub use cursor::Cursor;
pub use engine::{FeedEngine, FeedPage, SortMode};
