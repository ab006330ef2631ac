//! Task-creation coordinator.
//!
//! A small per-issue state machine driving an asynchronous, host-performed
//! side effect: creating a backlog task from an issue. The actual creation
//! (writing the task, committing, labeling the issue) happens entirely in
//! the external collaborator; this component emits the request and awaits
//! the response events.
//!
//! There is no cancellation. Selecting a different issue discards the
//! in-memory state, and responses are matched against the *current*
//! selection by issue number; a late response for a previous issue is
//! dropped, never applied.

use crate::error::PanelError;
use crate::models::issue::Issue;
use crate::models::task::{has_task_label, TaskAffordance, TaskCreationState, TaskStatus, TaskType};
use crate::models::Label;
use crate::services::event_bus::{EventBus, Subscription};
use crate::services::panel_events::{BusEvent, CreateTaskPayload, EventKind, PanelEvent};
use std::sync::{Arc, Mutex};

/// Per-selection task-creation state machine.
///
/// States: `Idle -> Loading -> {Success, Error}`; `Error -> Idle` via
/// [`TaskCoordinator::retry`]; any selection change resets to `Idle`.
#[derive(Debug, Default)]
pub struct TaskCoordinator {
    selected_issue: Option<i64>,
    state: TaskCreationState,
}

impl TaskCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TaskCreationState {
        &self.state
    }

    pub fn selected_issue(&self) -> Option<i64> {
        self.selected_issue
    }

    /// Track a selection change. Selecting a different issue (or clearing
    /// the selection) unconditionally resets to `Idle`, discarding an
    /// in-flight `Loading` — the outstanding external call is not
    /// cancelled, its response will simply no longer match.
    pub fn select_issue(&mut self, number: Option<i64>) {
        if self.selected_issue != number {
            self.selected_issue = number;
            self.state = TaskCreationState::default();
        }
    }

    /// Submit a task-creation request for the selected issue.
    ///
    /// Emits `issue:create-task`; the response arrives later as
    /// `issue:task-created` or `issue:create-task:error`.
    pub fn submit(
        &mut self,
        bus: &EventBus,
        source: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        issue: &Issue,
        task_type: TaskType,
        additional_instructions: Option<String>,
    ) -> Result<(), PanelError> {
        if self.selected_issue != Some(issue.number) {
            return Err(PanelError::invalid_input(format!(
                "issue #{} is not the current selection",
                issue.number
            )));
        }
        if self.state.status != TaskStatus::Idle {
            return Err(PanelError::invalid_input(
                "a task-creation attempt is already in progress",
            ));
        }

        self.state = TaskCreationState {
            status: TaskStatus::Loading,
            task_id: None,
            error: None,
        };
        bus.emit(
            source,
            PanelEvent::CreateTask(CreateTaskPayload {
                issue: issue.clone(),
                owner: owner.into(),
                repo: repo.into(),
                task_type,
                additional_instructions,
            }),
        );
        Ok(())
    }

    /// Apply a success response. Dropped when the issue number no longer
    /// matches the current selection or no attempt is in flight.
    pub fn on_task_created(&mut self, issue_number: i64, task_id: String) {
        if self.selected_issue != Some(issue_number) || self.state.status != TaskStatus::Loading {
            log::debug!(
                "dropping stale task-created response for issue #{}",
                issue_number
            );
            return;
        }
        self.state = TaskCreationState {
            status: TaskStatus::Success,
            task_id: Some(task_id),
            error: None,
        };
    }

    /// Apply a failure response, storing the collaborator's error string
    /// verbatim. Dropped when stale. Recoverable via [`Self::retry`].
    pub fn on_task_error(&mut self, issue_number: i64, error: String) {
        if self.selected_issue != Some(issue_number) || self.state.status != TaskStatus::Loading {
            log::debug!(
                "dropping stale task-creation error for issue #{}",
                issue_number
            );
            return;
        }
        self.state = TaskCreationState {
            status: TaskStatus::Error,
            task_id: None,
            error: Some(error),
        };
    }

    /// Re-enable the creation entry point after a failure. Does not
    /// resubmit.
    pub fn retry(&mut self) {
        if self.state.status == TaskStatus::Error {
            self.state = TaskCreationState::default();
        }
    }

    /// What the task entry point should offer.
    ///
    /// Two independent signals: the in-memory state machine, and a task
    /// label left on the issue by a prior session. The label switches the
    /// affordance to "view task" even while the state machine is `Idle`.
    pub fn affordance(&self, labels: &[Label]) -> TaskAffordance {
        if self.state.status == TaskStatus::Success || has_task_label(labels) {
            TaskAffordance::ViewTask
        } else {
            TaskAffordance::Create
        }
    }

    /// Route a bus event into the state machine.
    pub fn handle_event(&mut self, event: &BusEvent) {
        match &event.payload {
            PanelEvent::TaskCreated(payload) => {
                self.on_task_created(payload.issue_number, payload.task_id.clone());
            }
            PanelEvent::TaskCreateError(payload) => {
                self.on_task_error(payload.issue_number, payload.error.clone());
            }
            _ => {}
        }
    }
}

/// Subscribe a shared coordinator to the task response events. The
/// returned subscriptions must be kept for as long as the coordinator
/// should receive responses.
pub fn attach(coordinator: Arc<Mutex<TaskCoordinator>>, bus: &EventBus) -> Vec<Subscription> {
    let created = {
        let coordinator = coordinator.clone();
        bus.on(EventKind::TaskCreated, move |event| {
            coordinator
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .handle_event(event);
            Ok(())
        })
    };
    let failed = {
        let coordinator = coordinator.clone();
        bus.on(EventKind::TaskCreateError, move |event| {
            coordinator
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .handle_event(event);
            Ok(())
        })
    };
    vec![created, failed]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::User;
    use crate::services::panel_events::{TaskCreateErrorPayload, TaskCreatedPayload};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_issue(number: i64, labels: &[&str]) -> Issue {
        Issue {
            id: number,
            number,
            title: format!("Issue {}", number),
            body: None,
            state: "open".to_string(),
            user: User {
                login: "octocat".to_string(),
                avatar_url: None,
            },
            labels: labels
                .iter()
                .map(|n| Label {
                    name: n.to_string(),
                    color: None,
                })
                .collect(),
            assignees: vec![],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: None,
            pull_request: None,
        }
    }

    fn submit(coordinator: &mut TaskCoordinator, bus: &EventBus, issue: &Issue) {
        coordinator
            .submit(
                bus,
                "test",
                "acme",
                "panels",
                issue,
                TaskType::Fix,
                None,
            )
            .unwrap();
    }

    #[test]
    fn test_submit_emits_create_task_and_enters_loading() {
        let bus = EventBus::new();
        let emitted = Arc::new(AtomicUsize::new(0));
        let emitted_clone = emitted.clone();
        let _sub = bus.on(EventKind::CreateTask, move |event| {
            match &event.payload {
                PanelEvent::CreateTask(payload) => {
                    assert_eq!(payload.issue.number, 1);
                    assert_eq!(payload.task_type, TaskType::Fix);
                }
                other => panic!("unexpected payload: {:?}", other),
            }
            emitted_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        submit(&mut coordinator, &bus, &make_issue(1, &[]));

        assert_eq!(coordinator.state().status, TaskStatus::Loading);
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_success_stores_task_id() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        submit(&mut coordinator, &bus, &make_issue(1, &[]));

        coordinator.on_task_created(1, "task-123".to_string());
        assert_eq!(coordinator.state().status, TaskStatus::Success);
        assert_eq!(coordinator.state().task_id.as_deref(), Some("task-123"));
    }

    #[test]
    fn test_error_then_retry_returns_to_idle() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        submit(&mut coordinator, &bus, &make_issue(1, &[]));

        coordinator.on_task_error(1, "backlog commit failed".to_string());
        assert_eq!(coordinator.state().status, TaskStatus::Error);
        assert_eq!(
            coordinator.state().error.as_deref(),
            Some("backlog commit failed")
        );

        coordinator.retry();
        assert_eq!(coordinator.state().status, TaskStatus::Idle);
        assert!(coordinator.state().error.is_none());
    }

    #[test]
    fn test_retry_is_noop_outside_error() {
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        coordinator.retry();
        assert_eq!(coordinator.state().status, TaskStatus::Idle);
    }

    #[test]
    fn test_selection_change_resets_any_state() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        submit(&mut coordinator, &bus, &make_issue(1, &[]));
        assert_eq!(coordinator.state().status, TaskStatus::Loading);

        // Discards the in-flight attempt outright.
        coordinator.select_issue(Some(2));
        assert_eq!(coordinator.state().status, TaskStatus::Idle);
        assert!(coordinator.state().task_id.is_none());
        assert!(coordinator.state().error.is_none());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        submit(&mut coordinator, &bus, &make_issue(1, &[]));

        coordinator.select_issue(Some(2));
        coordinator.on_task_created(1, "task-123".to_string());
        assert_eq!(coordinator.state().status, TaskStatus::Idle);
        assert!(coordinator.state().task_id.is_none());

        coordinator.on_task_error(1, "late failure".to_string());
        assert_eq!(coordinator.state().status, TaskStatus::Idle);
        assert!(coordinator.state().error.is_none());
    }

    #[test]
    fn test_submit_rejected_while_loading() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        let issue = make_issue(1, &[]);
        submit(&mut coordinator, &bus, &issue);

        let again = coordinator.submit(&bus, "test", "acme", "panels", &issue, TaskType::Fix, None);
        assert!(again.is_err());
    }

    #[test]
    fn test_submit_rejected_for_non_selected_issue() {
        let bus = EventBus::new();
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        let result = coordinator.submit(
            &bus,
            "test",
            "acme",
            "panels",
            &make_issue(2, &[]),
            TaskType::Investigate,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_label_switches_affordance_while_idle() {
        let mut coordinator = TaskCoordinator::new();
        coordinator.select_issue(Some(1));
        assert_eq!(coordinator.state().status, TaskStatus::Idle);

        let labeled = make_issue(1, &["backlog-task:investigate"]);
        assert_eq!(coordinator.affordance(&labeled.labels), TaskAffordance::ViewTask);

        let unlabeled = make_issue(1, &["bug"]);
        assert_eq!(coordinator.affordance(&unlabeled.labels), TaskAffordance::Create);
    }

    #[test]
    fn test_attach_routes_response_events() {
        let bus = EventBus::new();
        let coordinator = Arc::new(Mutex::new(TaskCoordinator::new()));
        let _subs = attach(coordinator.clone(), &bus);

        {
            let mut guard = coordinator.lock().unwrap();
            guard.select_issue(Some(7));
            submit(&mut guard, &bus, &make_issue(7, &[]));
        }

        bus.emit(
            "host",
            PanelEvent::TaskCreated(TaskCreatedPayload {
                issue_number: 7,
                task_id: "task-7".to_string(),
            }),
        );
        assert_eq!(
            coordinator.lock().unwrap().state().status,
            TaskStatus::Success
        );

        // A duplicate response after the attempt settled is dropped; the
        // machine only accepts responses while loading.
        bus.emit(
            "host",
            PanelEvent::TaskCreateError(TaskCreateErrorPayload {
                issue_number: 7,
                error: "duplicate".to_string(),
            }),
        );
        assert_eq!(
            coordinator.lock().unwrap().state().status,
            TaskStatus::Success
        );
    }
}
