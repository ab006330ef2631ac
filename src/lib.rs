//! Coordination core for GitHub issue/PR display panels.
//!
//! Panels render GitHub repository, issue and pull-request data inside a
//! host panel runtime. This crate is the non-visual core they share: the
//! typed event bus panels coordinate over, the read-only data slices the
//! host populates, the timeline reconciler that merges heterogeneous
//! event records into one chronological feed, the optimistic reaction
//! overlay, and the task-creation state machine.
//!
//! Rendering, routing, storage mechanics and the GitHub client itself
//! live in the host; this crate only specifies their boundary.

pub mod error;
pub mod models;
pub mod services;

pub use error::PanelError;
pub use services::event_bus::EventBus;
pub use services::messages_panel::MessagesPanel;
pub use services::panel_events::{BusEvent, EventKind, PanelEvent};
pub use services::slices::{SliceReader, SliceStore};
pub use services::task_coordinator::TaskCoordinator;
