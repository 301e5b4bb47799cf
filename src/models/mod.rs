pub mod block_list;
pub mod notification;
pub mod post;
pub mod tag;
pub mod user;

pub use notification::{NotificationEvent, NotificationKind};
pub use post::{Interaction, NewPost, Post, PostTags, ResolvedMention};
pub use tag::{MentionEntry, NewHashtagEntry, NewMentionEntry};
pub use user::{ContentClass, PostKind, Role, SubscriptionStatus, User};
