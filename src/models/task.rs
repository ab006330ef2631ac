//! Backlog-task creation models.

use crate::models::issue::Label;
use serde::{Deserialize, Serialize};

/// Kind of backlog task that can be created from an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Investigate,
    Fix,
}

impl TaskType {
    /// The issue label the external collaborator applies once a task of
    /// this type exists.
    pub fn label_name(&self) -> &'static str {
        match self {
            Self::Investigate => "backlog-task:investigate",
            Self::Fix => "backlog-task:fix",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Investigate => write!(f, "investigate"),
            Self::Fix => write!(f, "fix"),
        }
    }
}

/// Status of an in-memory task-creation attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Per-issue task-creation state. Reset whenever the selection changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreationState {
    /// Current status of the attempt.
    pub status: TaskStatus,

    /// Identifier of the created task (set on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Error message from the external collaborator (set on error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the task entry point offers for the selected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAffordance {
    /// Offer creating a new task.
    Create,

    /// A task already exists; offer viewing it.
    ViewTask,
}

/// Check whether the issue already carries a task label from a prior
/// session.
pub fn has_task_label(labels: &[Label]) -> bool {
    labels.iter().any(|l| {
        l.name == TaskType::Investigate.label_name() || l.name == TaskType::Fix.label_name()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> Label {
        Label {
            name: name.to_string(),
            color: None,
        }
    }

    #[test]
    fn test_task_type_labels() {
        assert_eq!(TaskType::Investigate.label_name(), "backlog-task:investigate");
        assert_eq!(TaskType::Fix.label_name(), "backlog-task:fix");
    }

    #[test]
    fn test_has_task_label() {
        assert!(has_task_label(&[label("bug"), label("backlog-task:fix")]));
        assert!(has_task_label(&[label("backlog-task:investigate")]));
        assert!(!has_task_label(&[label("bug"), label("enhancement")]));
        assert!(!has_task_label(&[]));
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = TaskCreationState::default();
        assert_eq!(state.status, TaskStatus::Idle);
        assert!(state.task_id.is_none());
        assert!(state.error.is_none());
    }
}
