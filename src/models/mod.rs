//! Data models for the panel coordination core.
//!
//! These models mirror the GitHub REST shapes the panels consume and the
//! local state the panels own. All models derive Serialize/Deserialize so
//! the host can move them across its IPC boundary unchanged.

pub mod issue;
pub mod reaction;
pub mod task;
pub mod timeline;

// Re-exports for convenient access
pub use issue::{ConversationRef, ConversationTarget, Issue, IssueState, Label, Repository, User};
pub use reaction::{item_key, ItemType, ReactionKind, ReactionSnapshot};
pub use task::{has_task_label, TaskAffordance, TaskCreationState, TaskStatus, TaskType};
pub use timeline::{
    CommentEvent, GitActor, RenderKind, ReviewComment, ReviewEvent, TimelineEvent,
};
