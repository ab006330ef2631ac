//! Coordination event types carried over the panel event bus.
//!
//! Panels never hold references to each other; everything crosses the bus
//! as one of these events. Each event kind has a fixed `"domain:action"`
//! string and a typed payload, so a subscriber for a kind statically knows
//! the payload shape it receives.

use crate::models::issue::{ConversationTarget, Issue, Repository};
use crate::models::reaction::{ItemType, ReactionKind};
use crate::models::task::TaskType;
use crate::models::timeline::{ReviewComment, TimelineEvent};
use serde::{Deserialize, Serialize};

/// The flat event namespace. Subscription is by exact kind; there are no
/// wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    // Inbound to the panels
    IssueSelected,
    IssueDeselected,
    PrSelected,
    MessagesData,
    TaskCreated,
    TaskCreateError,
    RepositoryPreview,
    // Outbound from the panels
    MessagesRequest,
    CreateTask,
    IssueDelete,
    ReactionAdd,
    ReactionRemove,
    CommentCreate,
    PanelFocus,
}

impl EventKind {
    /// The wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssueSelected => "issue:selected",
            Self::IssueDeselected => "issue:deselected",
            Self::PrSelected => "pr:selected",
            Self::MessagesData => "github-messages:data",
            Self::TaskCreated => "issue:task-created",
            Self::TaskCreateError => "issue:create-task:error",
            Self::RepositoryPreview => "repository:preview",
            Self::MessagesRequest => "github-messages:request",
            Self::CreateTask => "issue:create-task",
            Self::IssueDelete => "github-issue:delete",
            Self::ReactionAdd => "github-messages:reaction:add",
            Self::ReactionRemove => "github-messages:reaction:remove",
            Self::CommentCreate => "github-messages:comment:create",
            Self::PanelFocus => "panel:focus",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload for `issue:selected` and `pr:selected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionPayload {
    pub owner: String,
    pub repo: String,
    pub issue: Issue,
}

/// Payload for `github-messages:data`, announcing that the host populated
/// the `github-messages` slice for a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesDataPayload {
    pub owner: String,
    pub repo: String,
    pub number: i64,

    /// Timeline events for the conversation.
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,

    /// Inline review comments, sourced separately.
    #[serde(default)]
    pub review_comments: Vec<ReviewComment>,
}

/// Payload for `issue:task-created`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreatedPayload {
    pub issue_number: i64,
    pub task_id: String,
}

/// Payload for `issue:create-task:error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreateErrorPayload {
    pub issue_number: i64,

    /// Human-readable error from the external collaborator, displayed
    /// verbatim.
    pub error: String,
}

/// Payload for `repository:preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryPreviewPayload {
    pub repository: Repository,
}

/// Payload for `github-messages:request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequestPayload {
    pub owner: String,
    pub repo: String,
    pub number: i64,

    /// Whether the conversation is an issue or a pull request.
    #[serde(rename = "type")]
    pub target: ConversationTarget,
}

/// Payload for `issue:create-task`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskPayload {
    pub issue: Issue,
    pub owner: String,
    pub repo: String,
    pub task_type: TaskType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

/// Payload for `github-issue:delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDeletePayload {
    pub owner: String,
    pub repo: String,
    pub number: i64,
}

/// Payload for `github-messages:reaction:add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddPayload {
    pub owner: String,
    pub repo: String,
    pub target_type: ConversationTarget,
    pub target_number: i64,
    pub item_type: ItemType,
    pub item_id: i64,
    pub reaction_type: ReactionKind,
}

/// Payload for `github-messages:reaction:remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemovePayload {
    pub owner: String,
    pub repo: String,
    pub target_type: ConversationTarget,
    pub target_number: i64,
    pub item_type: ItemType,
    pub item_id: i64,
    pub reaction_type: ReactionKind,

    /// The real, server-assigned reaction id to delete.
    pub reaction_id: i64,
}

/// Payload for `github-messages:comment:create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreatePayload {
    pub owner: String,
    pub repo: String,
    pub target_type: ConversationTarget,
    pub target_number: i64,
    pub body: String,
}

/// Payload for `panel:focus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelFocusPayload {
    pub panel_id: String,
    pub panel_slot: String,
}

/// The discriminated union of every event the panels emit or consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PanelEvent {
    #[serde(rename = "issue:selected")]
    IssueSelected(SelectionPayload),
    #[serde(rename = "issue:deselected")]
    IssueDeselected,
    #[serde(rename = "pr:selected")]
    PrSelected(SelectionPayload),
    #[serde(rename = "github-messages:data")]
    MessagesData(MessagesDataPayload),
    #[serde(rename = "issue:task-created")]
    TaskCreated(TaskCreatedPayload),
    #[serde(rename = "issue:create-task:error")]
    TaskCreateError(TaskCreateErrorPayload),
    #[serde(rename = "repository:preview")]
    RepositoryPreview(RepositoryPreviewPayload),
    #[serde(rename = "github-messages:request")]
    MessagesRequest(MessagesRequestPayload),
    #[serde(rename = "issue:create-task")]
    CreateTask(CreateTaskPayload),
    #[serde(rename = "github-issue:delete")]
    IssueDelete(IssueDeletePayload),
    #[serde(rename = "github-messages:reaction:add")]
    ReactionAdd(ReactionAddPayload),
    #[serde(rename = "github-messages:reaction:remove")]
    ReactionRemove(ReactionRemovePayload),
    #[serde(rename = "github-messages:comment:create")]
    CommentCreate(CommentCreatePayload),
    #[serde(rename = "panel:focus")]
    PanelFocus(PanelFocusPayload),
}

impl PanelEvent {
    /// The kind this payload belongs to; subscriptions match on it.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::IssueSelected(_) => EventKind::IssueSelected,
            Self::IssueDeselected => EventKind::IssueDeselected,
            Self::PrSelected(_) => EventKind::PrSelected,
            Self::MessagesData(_) => EventKind::MessagesData,
            Self::TaskCreated(_) => EventKind::TaskCreated,
            Self::TaskCreateError(_) => EventKind::TaskCreateError,
            Self::RepositoryPreview(_) => EventKind::RepositoryPreview,
            Self::MessagesRequest(_) => EventKind::MessagesRequest,
            Self::CreateTask(_) => EventKind::CreateTask,
            Self::IssueDelete(_) => EventKind::IssueDelete,
            Self::ReactionAdd(_) => EventKind::ReactionAdd,
            Self::ReactionRemove(_) => EventKind::ReactionRemove,
            Self::CommentCreate(_) => EventKind::CommentCreate,
            Self::PanelFocus(_) => EventKind::PanelFocus,
        }
    }
}

/// Envelope delivered to subscribers. Immutable once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    /// Identifier of the emitting component (e.g. `"github-issues-panel"`).
    pub source: String,

    /// Wall-clock emission time in milliseconds, assigned by the emitter.
    /// Carries no ordering guarantee across independent emitters.
    pub timestamp_ms: i64,

    /// Typed payload.
    pub payload: PanelEvent,
}
