//! Conversation (messages) panel controller.
//!
//! Owns the local state of one conversation view: current selection,
//! hidden-message set, show-hidden toggle and the optimistic reaction
//! overlay. Everything else is read per render from the
//! `github-messages` slice and merged through the reconciler, so the
//! panel never caches derived feed state.
//!
//! The panel talks to the rest of the system exclusively over the event
//! bus: selection panels announce `issue:selected` / `pr:selected`, the
//! panel answers with `github-messages:request`, and the host populates
//! the slice. Its subscriptions unsubscribe when the panel is dropped.

use crate::error::PanelError;
use crate::models::issue::{ConversationRef, ConversationTarget};
use crate::models::reaction::{ItemType, ReactionKind, ReactionSnapshot};
use crate::services::event_bus::{EventBus, Subscription};
use crate::services::hidden_store::{HiddenMessages, HiddenStorePort};
use crate::services::panel_events::{
    CommentCreatePayload, EventKind, IssueDeletePayload, MessagesDataPayload,
    MessagesRequestPayload, PanelEvent, PanelFocusPayload, ReactionAddPayload,
    ReactionRemovePayload,
};
use crate::services::reaction_overlay::{ReactionOverlayStore, ToggleAction};
use crate::services::reconciler::{reconcile, MergedTimelineItem};
use crate::services::slices::{names, DataSlice, SliceReader};
use std::sync::{Arc, Mutex, MutexGuard};

struct PanelState {
    selection: Option<ConversationRef>,
    repo_context: Option<(String, String)>,
    /// Conversation last announced via `github-messages:data`.
    announced_data: Option<(String, String, i64)>,
    show_hidden: bool,
    hidden: HiddenMessages,
    overlay: ReactionOverlayStore,
}

/// The messages panel. Dropping it tears down its bus subscriptions.
pub struct MessagesPanel {
    id: String,
    bus: EventBus,
    slices: SliceReader,
    state: Arc<Mutex<PanelState>>,
    _subscriptions: Vec<Subscription>,
}

impl MessagesPanel {
    /// Create the panel and attach it to the bus.
    pub fn new(
        id: impl Into<String>,
        bus: EventBus,
        slices: SliceReader,
        hidden_port: Arc<dyn HiddenStorePort>,
    ) -> Result<Self, PanelError> {
        let id = id.into();
        let state = Arc::new(Mutex::new(PanelState {
            selection: None,
            repo_context: None,
            announced_data: None,
            show_hidden: false,
            hidden: HiddenMessages::load(hidden_port)?,
            overlay: ReactionOverlayStore::new(),
        }));

        let mut subscriptions = Vec::new();

        for (kind, target) in [
            (EventKind::IssueSelected, ConversationTarget::Issue),
            (EventKind::PrSelected, ConversationTarget::Pull),
        ] {
            let state = state.clone();
            let bus_clone = bus.clone();
            let id_clone = id.clone();
            subscriptions.push(bus.on(kind, move |event| {
                let payload = match &event.payload {
                    PanelEvent::IssueSelected(p) | PanelEvent::PrSelected(p) => p,
                    _ => return Ok(()),
                };
                let selection = ConversationRef {
                    owner: payload.owner.clone(),
                    repo: payload.repo.clone(),
                    number: payload.issue.number,
                    target,
                };
                {
                    let mut state = lock(&state);
                    state.selection = Some(selection.clone());
                }
                // Emit outside the state lock; handlers may re-enter.
                bus_clone.emit(
                    &id_clone,
                    PanelEvent::MessagesRequest(MessagesRequestPayload {
                        owner: selection.owner,
                        repo: selection.repo,
                        number: selection.number,
                        target,
                    }),
                );
                Ok(())
            }));
        }

        {
            let state = state.clone();
            subscriptions.push(bus.on(EventKind::IssueDeselected, move |_| {
                lock(&state).selection = None;
                Ok(())
            }));
        }

        {
            let state = state.clone();
            subscriptions.push(bus.on(EventKind::MessagesData, move |event| {
                if let PanelEvent::MessagesData(payload) = &event.payload {
                    lock(&state).announced_data =
                        Some((payload.owner.clone(), payload.repo.clone(), payload.number));
                }
                Ok(())
            }));
        }

        {
            let state = state.clone();
            subscriptions.push(bus.on(EventKind::RepositoryPreview, move |event| {
                if let PanelEvent::RepositoryPreview(payload) = &event.payload {
                    lock(&state).repo_context = Some((
                        payload.repository.owner.login.clone(),
                        payload.repository.name.clone(),
                    ));
                }
                Ok(())
            }));
        }

        Ok(Self {
            id,
            bus,
            slices,
            state,
            _subscriptions: subscriptions,
        })
    }

    /// The currently shown conversation, if any.
    pub fn selection(&self) -> Option<ConversationRef> {
        lock(&self.state).selection.clone()
    }

    /// Repository last announced via `repository:preview`.
    pub fn repo_context(&self) -> Option<(String, String)> {
        lock(&self.state).repo_context.clone()
    }

    pub fn show_hidden(&self) -> bool {
        lock(&self.state).show_hidden
    }

    pub fn set_show_hidden(&self, show: bool) {
        lock(&self.state).show_hidden = show;
    }

    /// Whether the host has announced `github-messages:data` for the
    /// currently selected conversation. Distinguishes "still fetching"
    /// from "slice holds a stale conversation" without reading the slice.
    pub fn data_announced(&self) -> bool {
        let state = lock(&self.state);
        match (&state.selection, &state.announced_data) {
            (Some(selection), Some((owner, repo, number))) => {
                selection.owner == *owner && selection.repo == *repo && selection.number == *number
            }
            _ => false,
        }
    }

    /// The raw slice, for loading/error display.
    pub fn messages_slice(&self) -> Option<DataSlice<MessagesDataPayload>> {
        self.slices.get_slice(names::GITHUB_MESSAGES)
    }

    /// Re-run the host fetch for the conversation data. User-initiated;
    /// errors land on the slice.
    pub async fn refresh_messages(&self) -> Result<(), PanelError> {
        self.slices.refresh(names::GITHUB_MESSAGES).await
    }

    /// The exact list of items to render, recomputed from the current
    /// slice and local state.
    ///
    /// Empty while nothing is selected, while the slice is absent, and
    /// while the slice still holds a different conversation's data.
    pub fn visible_items(&self) -> Vec<MergedTimelineItem> {
        let state = lock(&self.state);
        let Some(selection) = &state.selection else {
            return Vec::new();
        };
        let Some(slice) = self
            .slices
            .get_slice::<MessagesDataPayload>(names::GITHUB_MESSAGES)
        else {
            return Vec::new();
        };
        let Some(data) = slice.data else {
            return Vec::new();
        };
        if data.number != selection.number
            || data.owner != selection.owner
            || data.repo != selection.repo
        {
            return Vec::new();
        }

        reconcile(
            &data.timeline,
            &data.review_comments,
            state.hidden.keys(),
            state.show_hidden,
        )
    }

    /// Whether an item key is currently hidden.
    pub fn is_hidden(&self, item_type: ItemType, item_id: i64) -> bool {
        let key = crate::models::reaction::item_key(item_type, item_id);
        lock(&self.state).hidden.contains(&key)
    }

    /// Hide one item. Persisted through the port.
    pub fn hide_item(&self, item_type: ItemType, item_id: i64) -> Result<(), PanelError> {
        let key = crate::models::reaction::item_key(item_type, item_id);
        lock(&self.state).hidden.add(key)
    }

    /// Unhide one item. Persisted through the port.
    pub fn unhide_item(&self, item_type: ItemType, item_id: i64) -> Result<(), PanelError> {
        let key = crate::models::reaction::item_key(item_type, item_id);
        lock(&self.state).hidden.remove(&key)
    }

    /// Reaction counts to display for an item: the session overlay when
    /// the viewer has toggled this item, otherwise the server counts.
    pub fn reactions_for(&self, item_type: ItemType, item_id: i64) -> ReactionSnapshot {
        let server = self.server_reactions(item_type, item_id);
        lock(&self.state)
            .overlay
            .display(item_type, item_id, server.as_ref())
    }

    /// The viewer's reaction id for one kind, if they have reacted this
    /// session. Negative until the server assigns a real id.
    pub fn viewer_reaction(
        &self,
        item_type: ItemType,
        item_id: i64,
        kind: ReactionKind,
    ) -> Option<i64> {
        lock(&self.state).overlay.viewer_reaction(item_type, item_id, kind)
    }

    /// Toggle a reaction optimistically and emit the coordination event
    /// for the host to perform the real API call.
    ///
    /// Adding also hides the item (declutter after acknowledging); the
    /// hide is persisted. Removing never unhides.
    pub fn toggle_reaction(
        &self,
        item_type: ItemType,
        item_id: i64,
        kind: ReactionKind,
        current_reaction_id: Option<i64>,
    ) -> Result<(), PanelError> {
        let selection = self
            .selection()
            .ok_or_else(|| PanelError::invalid_input("no conversation selected"))?;
        let server = self.server_reactions(item_type, item_id);

        let action = {
            let mut state = lock(&self.state);
            let action = state.overlay.toggle(
                item_type,
                item_id,
                kind,
                current_reaction_id,
                server.as_ref(),
            );
            if let ToggleAction::Added { hide_key } = &action {
                // The overlay mutation and the hide persist together or
                // not at all; a half-applied add would show a reaction
                // the host was never asked to create.
                if let Err(err) = state.hidden.add(hide_key.clone()) {
                    state.overlay.retract(item_type, item_id, kind);
                    return Err(err);
                }
            }
            action
        };

        match action {
            ToggleAction::Added { .. } => {
                self.bus.emit(
                    &self.id,
                    PanelEvent::ReactionAdd(ReactionAddPayload {
                        owner: selection.owner,
                        repo: selection.repo,
                        target_type: selection.target,
                        target_number: selection.number,
                        item_type,
                        item_id,
                        reaction_type: kind,
                    }),
                );
            }
            ToggleAction::Removed { reaction_id } => {
                self.bus.emit(
                    &self.id,
                    PanelEvent::ReactionRemove(ReactionRemovePayload {
                        owner: selection.owner,
                        repo: selection.repo,
                        target_type: selection.target,
                        target_number: selection.number,
                        item_type,
                        item_id,
                        reaction_type: kind,
                        reaction_id,
                    }),
                );
            }
        }
        Ok(())
    }

    /// Emit a comment-creation request for the current conversation.
    pub fn create_comment(&self, body: impl Into<String>) -> Result<(), PanelError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(PanelError::invalid_input_field("comment body is empty", "body"));
        }
        let selection = self
            .selection()
            .ok_or_else(|| PanelError::invalid_input("no conversation selected"))?;

        self.bus.emit(
            &self.id,
            PanelEvent::CommentCreate(CommentCreatePayload {
                owner: selection.owner,
                repo: selection.repo,
                target_type: selection.target,
                target_number: selection.number,
                body,
            }),
        );
        Ok(())
    }

    /// Request deletion of the selected issue, then announce the
    /// deselection so every panel clears its state.
    pub fn delete_selected_issue(&self) -> Result<(), PanelError> {
        let selection = self
            .selection()
            .ok_or_else(|| PanelError::invalid_input("no conversation selected"))?;
        if selection.target != ConversationTarget::Issue {
            return Err(PanelError::invalid_input("only issues can be deleted"));
        }

        self.bus.emit(
            &self.id,
            PanelEvent::IssueDelete(IssueDeletePayload {
                owner: selection.owner,
                repo: selection.repo,
                number: selection.number,
            }),
        );
        self.bus.emit(&self.id, PanelEvent::IssueDeselected);
        Ok(())
    }

    /// Ask the host layout to focus a panel slot.
    pub fn request_focus(&self, panel_slot: impl Into<String>) {
        self.bus.emit(
            &self.id,
            PanelEvent::PanelFocus(PanelFocusPayload {
                panel_id: self.id.clone(),
                panel_slot: panel_slot.into(),
            }),
        );
    }

    /// Server-reported reactions for an item, looked up from the current
    /// slice data.
    fn server_reactions(&self, item_type: ItemType, item_id: i64) -> Option<ReactionSnapshot> {
        let data = self
            .slices
            .get_slice::<MessagesDataPayload>(names::GITHUB_MESSAGES)?
            .data?;
        let merged = crate::services::reconciler::merge_timeline(&data.timeline, &data.review_comments);
        merged.iter().find_map(|item| {
            let (t, id, reactions) = item.reaction_target()?;
            if t == item_type && id == item_id {
                reactions.cloned()
            } else {
                None
            }
        })
    }
}

fn lock(state: &Arc<Mutex<PanelState>>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
