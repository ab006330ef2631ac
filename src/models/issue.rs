//! Issue and repository models.
//!
//! These mirror the subset of the GitHub REST shapes the panels consume.
//! The GitHub client itself lives in the host; panels only read what the
//! host places into data slices.

use serde::{Deserialize, Serialize};

/// State of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl From<&str> for IssueState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "closed" => Self::Closed,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A GitHub user, as embedded in issues, comments and reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// GitHub login name.
    pub login: String,

    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// An issue label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name (e.g. `bug`, `backlog-task:fix`).
    pub name: String,

    /// Hex color without leading `#`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A GitHub issue or pull request, as listed in the `github-issues` slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Global GitHub ID.
    pub id: i64,

    /// Repository-scoped issue/PR number.
    pub number: i64,

    /// Issue title.
    pub title: String,

    /// Issue body (Markdown).
    #[serde(default)]
    pub body: Option<String>,

    /// Current state: `open` or `closed`.
    pub state: String,

    /// Issue author.
    pub user: User,

    /// Labels currently applied.
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Assigned users.
    #[serde(default)]
    pub assignees: Vec<User>,

    /// Creation timestamp (ISO-8601).
    pub created_at: String,

    /// Last update timestamp (ISO-8601).
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Present (and non-null) when this record is a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// Parse the state string into an enum.
    pub fn state_enum(&self) -> IssueState {
        IssueState::from(self.state.as_str())
    }

    /// Check if this record is a pull request rather than a plain issue.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Check if the issue carries a label with the given name.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

/// A repository, as listed in the repository slices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Global GitHub ID.
    pub id: i64,

    /// Repository name without owner.
    pub name: String,

    /// Owner login.
    pub owner: User,

    /// `owner/name` form.
    #[serde(default)]
    pub full_name: Option<String>,

    /// Repository description.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
}

impl Repository {
    /// The `owner/name` slug, derived when `full_name` is absent.
    pub fn slug(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.owner.login, self.name))
    }
}

/// Identifies one conversation (issue or PR) within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRef {
    /// Repository owner login.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Issue/PR number.
    pub number: i64,

    /// Whether this is an issue or a pull request conversation.
    pub target: ConversationTarget,
}

/// Kind of conversation a messages panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationTarget {
    Issue,
    Pull,
}

impl std::fmt::Display for ConversationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::Pull => write!(f, "pull"),
        }
    }
}
