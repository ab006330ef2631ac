//! Timeline event models for issue/PR conversations.
//!
//! The GitHub timeline API delivers heterogeneous records discriminated by
//! an `event` string, with the timestamp living under a different field
//! name depending on the kind (`created_at`, `submitted_at`, or the nested
//! commit committer date). The union below normalizes that through a single
//! [`TimelineEvent::effective_timestamp`] method.

use crate::models::issue::{Label, User};
use crate::models::reaction::ReactionSnapshot;
use serde::{Deserialize, Serialize};

/// Author/committer identity on a commit event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitActor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Commit timestamp (ISO-8601).
    #[serde(default)]
    pub date: Option<String>,
}

/// An issue/PR comment delivered as a `commented` timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentEvent {
    #[serde(default)]
    pub id: i64,

    /// Comment body (Markdown).
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user: Option<User>,

    /// Creation timestamp (ISO-8601).
    #[serde(default)]
    pub created_at: Option<String>,

    /// Server-reported reaction counts.
    #[serde(default)]
    pub reactions: Option<ReactionSnapshot>,
}

/// A pull-request review delivered as a `reviewed` timeline event.
///
/// Reviews carry `submitted_at` instead of `created_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewEvent {
    #[serde(default)]
    pub id: i64,

    /// Review verdict: `approved`, `changes_requested`, `commented`, ...
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user: Option<User>,

    /// Submission timestamp (ISO-8601).
    #[serde(default)]
    pub submitted_at: Option<String>,

    /// Server-reported reaction counts on the review body.
    #[serde(default)]
    pub reactions: Option<ReactionSnapshot>,
}

/// A label add/remove timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEvent {
    #[serde(default)]
    pub label: Option<Label>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// An assignment add/remove timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignEvent {
    #[serde(default)]
    pub assignee: Option<User>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// A review request add/remove timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRequestEvent {
    #[serde(default)]
    pub requested_reviewer: Option<User>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// A timeline event that only carries an actor and a timestamp
/// (merged, closed, reopened, head-ref changes, deployed).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleEvent {
    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Old/new title pair on a `renamed` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rename {
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub to: Option<String>,
}

/// A title rename timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameEvent {
    #[serde(default)]
    pub rename: Option<Rename>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// A milestone add/remove timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneEvent {
    #[serde(default)]
    pub milestone: Option<MilestoneRef>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Milestone reference embedded in milestone events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneRef {
    #[serde(default)]
    pub title: Option<String>,
}

/// A cross-reference from another issue/PR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossReferencedEvent {
    /// The referencing issue/commit, kept opaque.
    #[serde(default)]
    pub source: Option<serde_json::Value>,

    #[serde(default)]
    pub actor: Option<User>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// One historical occurrence on an issue or pull request.
///
/// Discriminated by the `event` field as delivered by the GitHub timeline
/// API. Kinds this crate does not recognize deserialize into
/// [`TimelineEvent::Unknown`] and render as nothing; a malformed record
/// must never blank the whole feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    Committed {
        #[serde(default)]
        sha: Option<String>,

        /// Commit message.
        #[serde(default)]
        message: Option<String>,

        #[serde(default)]
        author: Option<GitActor>,

        /// Timestamp source for commit events.
        #[serde(default)]
        committer: Option<GitActor>,
    },
    Commented(CommentEvent),
    Reviewed(ReviewEvent),
    Labeled(LabelEvent),
    Unlabeled(LabelEvent),
    Assigned(AssignEvent),
    Unassigned(AssignEvent),
    ReviewRequested(ReviewRequestEvent),
    ReviewRequestRemoved(ReviewRequestEvent),
    Merged(SimpleEvent),
    Closed(SimpleEvent),
    Reopened(SimpleEvent),
    HeadRefForcePushed(SimpleEvent),
    HeadRefDeleted(SimpleEvent),
    HeadRefRestored(SimpleEvent),
    Deployed(SimpleEvent),
    Renamed(RenameEvent),
    Milestoned(MilestoneEvent),
    Demilestoned(MilestoneEvent),
    #[serde(rename = "cross-referenced")]
    CrossReferenced(CrossReferencedEvent),
    /// Any event kind this crate does not recognize.
    #[serde(other)]
    Unknown,
}

impl TimelineEvent {
    /// The timestamp used for chronological ordering.
    ///
    /// Fallback order is fixed: `created_at`, else `submitted_at`, else the
    /// nested commit committer date, else empty. An empty string compares
    /// before any ISO-8601 string, so records without a usable timestamp
    /// sort first.
    pub fn effective_timestamp(&self) -> &str {
        match self {
            Self::Committed { committer, .. } => committer
                .as_ref()
                .and_then(|c| c.date.as_deref())
                .unwrap_or(""),
            Self::Commented(e) => e.created_at.as_deref().unwrap_or(""),
            Self::Reviewed(e) => e.submitted_at.as_deref().unwrap_or(""),
            Self::Labeled(e) | Self::Unlabeled(e) => e.created_at.as_deref().unwrap_or(""),
            Self::Assigned(e) | Self::Unassigned(e) => e.created_at.as_deref().unwrap_or(""),
            Self::ReviewRequested(e) | Self::ReviewRequestRemoved(e) => {
                e.created_at.as_deref().unwrap_or("")
            }
            Self::Merged(e)
            | Self::Closed(e)
            | Self::Reopened(e)
            | Self::HeadRefForcePushed(e)
            | Self::HeadRefDeleted(e)
            | Self::HeadRefRestored(e)
            | Self::Deployed(e) => e.created_at.as_deref().unwrap_or(""),
            Self::Renamed(e) => e.created_at.as_deref().unwrap_or(""),
            Self::Milestoned(e) | Self::Demilestoned(e) => e.created_at.as_deref().unwrap_or(""),
            Self::CrossReferenced(e) => e.created_at.as_deref().unwrap_or(""),
            Self::Unknown => "",
        }
    }

    /// Whether this kind is summarized in the conversation header instead
    /// of the feed. These kinds never appear in reconciled output.
    pub fn is_metadata_only(&self) -> bool {
        matches!(
            self,
            Self::Labeled(_) | Self::Unlabeled(_) | Self::Assigned(_) | Self::Unassigned(_)
        )
    }
}

/// Renderer family an item dispatches to. `None` means render nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Commit,
    Comment,
    Review,
    ReviewRequest,
    Merge,
    StateChange,
    RefChange,
    Deploy,
    Rename,
    Milestone,
    CrossReference,
    ReviewComment,
}

impl TimelineEvent {
    /// Which renderer family this event dispatches to.
    ///
    /// Unrecognized kinds return `None` and are silently skipped.
    pub fn render_kind(&self) -> Option<RenderKind> {
        match self {
            Self::Committed { .. } => Some(RenderKind::Commit),
            Self::Commented(_) => Some(RenderKind::Comment),
            Self::Reviewed(_) => Some(RenderKind::Review),
            Self::ReviewRequested(_) | Self::ReviewRequestRemoved(_) => {
                Some(RenderKind::ReviewRequest)
            }
            Self::Merged(_) => Some(RenderKind::Merge),
            Self::Closed(_) | Self::Reopened(_) => Some(RenderKind::StateChange),
            Self::HeadRefForcePushed(_) | Self::HeadRefDeleted(_) | Self::HeadRefRestored(_) => {
                Some(RenderKind::RefChange)
            }
            Self::Deployed(_) => Some(RenderKind::Deploy),
            Self::Renamed(_) => Some(RenderKind::Rename),
            Self::Milestoned(_) | Self::Demilestoned(_) => Some(RenderKind::Milestone),
            Self::CrossReferenced(_) => Some(RenderKind::CrossReference),
            // Metadata-only kinds are filtered before dispatch; render
            // nothing if one slips through.
            Self::Labeled(_) | Self::Unlabeled(_) | Self::Assigned(_) | Self::Unassigned(_) => None,
            Self::Unknown => None,
        }
    }
}

/// An inline code-review comment, sourced separately from the timeline
/// but merged into the same chronological feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewComment {
    #[serde(default)]
    pub id: i64,

    /// File the comment is anchored to.
    #[serde(default)]
    pub path: Option<String>,

    /// Line within the file.
    #[serde(default)]
    pub line: Option<i64>,

    /// Diff context around the anchored line.
    #[serde(default)]
    pub diff_hunk: Option<String>,

    /// Comment body (Markdown).
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user: Option<User>,

    /// Creation timestamp (ISO-8601).
    #[serde(default)]
    pub created_at: Option<String>,

    /// Server-reported reaction counts.
    #[serde(default)]
    pub reactions: Option<ReactionSnapshot>,
}

impl ReviewComment {
    /// Review comments always order by `created_at`.
    pub fn effective_timestamp(&self) -> &str {
        self.created_at.as_deref().unwrap_or("")
    }
}
