//! Reaction models and overlay keys.

use serde::{Deserialize, Serialize};

/// The reaction kinds GitHub supports on comments and reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "+1")]
    ThumbsUp,
    #[serde(rename = "-1")]
    ThumbsDown,
    #[serde(rename = "laugh")]
    Laugh,
    #[serde(rename = "confused")]
    Confused,
    #[serde(rename = "heart")]
    Heart,
    #[serde(rename = "hooray")]
    Hooray,
    #[serde(rename = "rocket")]
    Rocket,
    #[serde(rename = "eyes")]
    Eyes,
}

impl ReactionKind {
    /// All kinds, in GitHub's display order.
    pub const ALL: [ReactionKind; 8] = [
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::Laugh,
        Self::Confused,
        Self::Heart,
        Self::Hooray,
        Self::Rocket,
        Self::Eyes,
    ];

    /// The GitHub API content string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "+1",
            Self::ThumbsDown => "-1",
            Self::Laugh => "laugh",
            Self::Confused => "confused",
            Self::Heart => "heart",
            Self::Hooray => "hooray",
            Self::Rocket => "rocket",
            Self::Eyes => "eyes",
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of item a reaction or hidden-message key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Comment,
    Review,
    ReviewComment,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comment => write!(f, "comment"),
            Self::Review => write!(f, "review"),
            Self::ReviewComment => write!(f, "review_comment"),
        }
    }
}

/// Build the `"{item_type}-{item_id}"` key used by both the reaction
/// overlay and the hidden-message set.
pub fn item_key(item_type: ItemType, item_id: i64) -> String {
    format!("{}-{}", item_type, item_id)
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Per-kind reaction counts plus the total.
///
/// Matches the server-reported `reactions` object field-for-field (extra
/// fields like `url` are ignored) and doubles as the optimistic overlay
/// shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSnapshot {
    /// Total reaction count across all kinds.
    #[serde(default)]
    pub total_count: u32,

    #[serde(default, rename = "+1", skip_serializing_if = "is_zero")]
    pub thumbs_up: u32,

    #[serde(default, rename = "-1", skip_serializing_if = "is_zero")]
    pub thumbs_down: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub laugh: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub confused: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub heart: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub hooray: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub rocket: u32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub eyes: u32,
}

impl ReactionSnapshot {
    fn slot(&self, kind: ReactionKind) -> &u32 {
        match kind {
            ReactionKind::ThumbsUp => &self.thumbs_up,
            ReactionKind::ThumbsDown => &self.thumbs_down,
            ReactionKind::Laugh => &self.laugh,
            ReactionKind::Confused => &self.confused,
            ReactionKind::Heart => &self.heart,
            ReactionKind::Hooray => &self.hooray,
            ReactionKind::Rocket => &self.rocket,
            ReactionKind::Eyes => &self.eyes,
        }
    }

    fn slot_mut(&mut self, kind: ReactionKind) -> &mut u32 {
        match kind {
            ReactionKind::ThumbsUp => &mut self.thumbs_up,
            ReactionKind::ThumbsDown => &mut self.thumbs_down,
            ReactionKind::Laugh => &mut self.laugh,
            ReactionKind::Confused => &mut self.confused,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Hooray => &mut self.hooray,
            ReactionKind::Rocket => &mut self.rocket,
            ReactionKind::Eyes => &mut self.eyes,
        }
    }

    /// Count for one kind.
    pub fn count(&self, kind: ReactionKind) -> u32 {
        *self.slot(kind)
    }

    /// Increment one kind and the total.
    pub fn increment(&mut self, kind: ReactionKind) {
        *self.slot_mut(kind) += 1;
        self.total_count += 1;
    }

    /// Decrement one kind and the total, both floored at zero.
    pub fn decrement(&mut self, kind: ReactionKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_sub(1);
        self.total_count = self.total_count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_format() {
        assert_eq!(item_key(ItemType::Comment, 42), "comment-42");
        assert_eq!(item_key(ItemType::Review, 7), "review-7");
        assert_eq!(item_key(ItemType::ReviewComment, 9), "review_comment-9");
    }

    #[test]
    fn test_increment_and_count() {
        let mut snapshot = ReactionSnapshot::default();
        snapshot.increment(ReactionKind::Heart);
        snapshot.increment(ReactionKind::Heart);
        snapshot.increment(ReactionKind::Rocket);
        assert_eq!(snapshot.count(ReactionKind::Heart), 2);
        assert_eq!(snapshot.count(ReactionKind::Rocket), 1);
        assert_eq!(snapshot.total_count, 3);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let mut snapshot = ReactionSnapshot::default();
        snapshot.decrement(ReactionKind::Heart);
        snapshot.decrement(ReactionKind::Heart);
        assert_eq!(snapshot.count(ReactionKind::Heart), 0);
        assert_eq!(snapshot.total_count, 0);
    }

    #[test]
    fn test_serde_kind_names() {
        let json = serde_json::to_string(&ReactionKind::ThumbsUp).unwrap();
        assert_eq!(json, "\"+1\"");
        let kind: ReactionKind = serde_json::from_str("\"heart\"").unwrap();
        assert_eq!(kind, ReactionKind::Heart);
    }

    #[test]
    fn test_snapshot_deserializes_server_shape() {
        let snapshot: ReactionSnapshot = serde_json::from_str(
            r#"{"url":"https://api.github.com/...","total_count":5,"heart":4,"+1":1}"#,
        )
        .unwrap();
        assert_eq!(snapshot.total_count, 5);
        assert_eq!(snapshot.count(ReactionKind::Heart), 4);
        assert_eq!(snapshot.count(ReactionKind::ThumbsUp), 1);
    }
}
