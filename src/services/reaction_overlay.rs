//! Optimistic reaction overlay.
//!
//! Gives instantaneous feedback when the user toggles a reaction, before
//! the host's round-trip to the real API completes or even starts. Once
//! an overlay entry exists for an item key it fully shadows the
//! server-reported counts for that key — the server field is never
//! consulted again for the rest of the panel session. That trades
//! eventual consistency (another session's reactions will not show up
//! here) for render simplicity, deliberately.

use crate::models::reaction::{item_key, ItemType, ReactionKind, ReactionSnapshot};
use std::collections::{BTreeMap, HashMap};

/// Overlay state for one item key.
#[derive(Debug, Clone, Default)]
pub struct OverlayEntry {
    /// Current optimistic counts.
    pub counts: ReactionSnapshot,

    /// The viewer's own reactions, keyed by kind. Values are pending
    /// sentinel ids (unique negatives) until the server assigns one.
    pub viewer_reactions: BTreeMap<ReactionKind, i64>,
}

/// Side effect the caller must perform after a toggle: emit the matching
/// coordination event, and on add also hide the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    /// Emit `github-messages:reaction:add`; the item key is auto-hidden.
    Added { hide_key: String },

    /// Emit `github-messages:reaction:remove` with this real reaction id.
    Removed { reaction_id: i64 },
}

/// Per-session optimistic reaction state, keyed by
/// `"{item_type}-{item_id}"`. Not persisted.
#[derive(Debug, Default)]
pub struct ReactionOverlayStore {
    entries: HashMap<String, OverlayEntry>,
    next_pending_id: i64,
}

impl ReactionOverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts to display for an item: the overlay when present,
    /// otherwise the server-reported snapshot.
    pub fn display(
        &self,
        item_type: ItemType,
        item_id: i64,
        server: Option<&ReactionSnapshot>,
    ) -> ReactionSnapshot {
        let key = item_key(item_type, item_id);
        match self.entries.get(&key) {
            Some(entry) => entry.counts.clone(),
            None => server.cloned().unwrap_or_default(),
        }
    }

    /// The viewer's reaction id for one kind, if they have reacted.
    /// Negative while the server has not yet assigned a real id.
    pub fn viewer_reaction(&self, item_type: ItemType, item_id: i64, kind: ReactionKind) -> Option<i64> {
        let key = item_key(item_type, item_id);
        self.entries
            .get(&key)
            .and_then(|entry| entry.viewer_reactions.get(&kind).copied())
    }

    /// Toggle a reaction optimistically.
    ///
    /// With `current_reaction_id` present the viewer is removing an
    /// existing reaction; otherwise they are adding one. The entry is
    /// created lazily on first toggle, seeded from `server`; afterwards
    /// `server` is ignored for this key.
    pub fn toggle(
        &mut self,
        item_type: ItemType,
        item_id: i64,
        kind: ReactionKind,
        current_reaction_id: Option<i64>,
        server: Option<&ReactionSnapshot>,
    ) -> ToggleAction {
        let key = item_key(item_type, item_id);
        let entry = self.entries.entry(key.clone()).or_insert_with(|| OverlayEntry {
            counts: server.cloned().unwrap_or_default(),
            viewer_reactions: BTreeMap::new(),
        });

        match current_reaction_id {
            Some(reaction_id) => {
                entry.counts.decrement(kind);
                entry.viewer_reactions.remove(&kind);
                ToggleAction::Removed { reaction_id }
            }
            None => {
                entry.counts.increment(kind);
                self.next_pending_id -= 1;
                entry.viewer_reactions.insert(kind, self.next_pending_id);
                ToggleAction::Added { hide_key: key }
            }
        }
    }

    /// Undo an optimistic add whose required side effect failed, before
    /// any coordination event was emitted. Restores the counts and drops
    /// the viewer's pending entry; a no-op if the viewer has no pending
    /// reaction of this kind.
    pub fn retract(&mut self, item_type: ItemType, item_id: i64, kind: ReactionKind) {
        let key = item_key(item_type, item_id);
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.viewer_reactions.remove(&kind).is_some() {
                entry.counts.decrement(kind);
            }
        }
    }
}
