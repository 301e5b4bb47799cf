pub mod lifecycle;

pub use lifecycle::{PostDraft, PostLifecycle, PostPatch, PostView};
