//! Coordination services for the panels.
//!
//! This module contains the event bus, the data-slice read layer, the
//! timeline reconciler and the local-state stores the conversation
//! panels are built from. Services are independent of any concrete
//! rendering or host runtime.

pub mod event_bus;
pub mod hidden_store;
pub mod messages_panel;
pub mod panel_events;
pub mod reaction_overlay;
pub mod reconciler;
pub mod slices;
pub mod task_coordinator;

pub use event_bus::{EventBus, Subscription};
pub use hidden_store::{
    HiddenMessages, HiddenStorePort, JsonFileHiddenStore, MemoryHiddenStore, HIDDEN_STORAGE_KEY,
};
pub use messages_panel::MessagesPanel;
pub use panel_events::{BusEvent, EventKind, PanelEvent};
pub use reaction_overlay::{OverlayEntry, ReactionOverlayStore, ToggleAction};
pub use reconciler::{filter_visible, merge_timeline, reconcile, MergedItem, MergedTimelineItem};
pub use slices::{DataSlice, SliceReader, SliceScope, SliceStore};
pub use task_coordinator::TaskCoordinator;
