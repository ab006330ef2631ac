//! Timeline reconciliation: merge heterogeneous event records and inline
//! review comments into one chronological, filterable feed.
//!
//! All functions here are pure; the messages panel recomputes the feed on
//! every render from the current slice plus local state.

use crate::models::reaction::{item_key, ItemType, ReactionSnapshot};
use crate::models::timeline::{RenderKind, ReviewComment, TimelineEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One entry of the merged feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergedItem {
    Event(TimelineEvent),
    ReviewComment(ReviewComment),
}

/// A feed entry together with its normalized ordering timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedTimelineItem {
    /// Normalized timestamp used for ordering. Empty when the source
    /// record carried none; empty sorts before any ISO-8601 string.
    pub effective_timestamp: String,

    #[serde(flatten)]
    pub item: MergedItem,
}

impl MergedTimelineItem {
    /// The hidden-set key, for the item kinds the hidden filter applies
    /// to (comments and review comments only).
    pub fn hidden_key(&self) -> Option<String> {
        match &self.item {
            MergedItem::Event(TimelineEvent::Commented(c)) => {
                Some(item_key(ItemType::Comment, c.id))
            }
            MergedItem::ReviewComment(c) => Some(item_key(ItemType::ReviewComment, c.id)),
            MergedItem::Event(_) => None,
        }
    }

    /// The reactable target behind this item, with the server-reported
    /// reaction counts if any.
    pub fn reaction_target(&self) -> Option<(ItemType, i64, Option<&ReactionSnapshot>)> {
        match &self.item {
            MergedItem::Event(TimelineEvent::Commented(c)) => {
                Some((ItemType::Comment, c.id, c.reactions.as_ref()))
            }
            MergedItem::Event(TimelineEvent::Reviewed(r)) => {
                Some((ItemType::Review, r.id, r.reactions.as_ref()))
            }
            MergedItem::ReviewComment(c) => {
                Some((ItemType::ReviewComment, c.id, c.reactions.as_ref()))
            }
            MergedItem::Event(_) => None,
        }
    }

    /// Renderer family dispatch. `None` renders nothing.
    pub fn render_kind(&self) -> Option<RenderKind> {
        match &self.item {
            MergedItem::Event(event) => event.render_kind(),
            MergedItem::ReviewComment(_) => Some(RenderKind::ReviewComment),
        }
    }
}

/// Merge timeline events and review comments into one sequence ordered by
/// effective timestamp ascending.
///
/// The sort is stable and timeline items are placed before review
/// comments prior to sorting, so at equal timestamps timeline events
/// precede review comments and relative input order is preserved within
/// each group.
pub fn merge_timeline(
    timeline: &[TimelineEvent],
    review_comments: &[ReviewComment],
) -> Vec<MergedTimelineItem> {
    let mut items: Vec<MergedTimelineItem> = Vec::with_capacity(timeline.len() + review_comments.len());

    for event in timeline {
        items.push(MergedTimelineItem {
            effective_timestamp: event.effective_timestamp().to_string(),
            item: MergedItem::Event(event.clone()),
        });
    }
    for comment in review_comments {
        items.push(MergedTimelineItem {
            effective_timestamp: comment.effective_timestamp().to_string(),
            item: MergedItem::ReviewComment(comment.clone()),
        });
    }

    // ISO-8601 strings order lexicographically; Vec::sort_by is stable.
    items.sort_by(|a, b| a.effective_timestamp.cmp(&b.effective_timestamp));
    items
}

/// Apply the display filters to a merged sequence, in fixed order:
///
/// 1. Label and assignment events are dropped unconditionally; they are
///    summarized in the conversation header, never shown in the feed,
///    regardless of `show_hidden`.
/// 2. Comments and review comments whose key is in `hidden` are dropped
///    unless `show_hidden` is set.
pub fn filter_visible(
    items: Vec<MergedTimelineItem>,
    hidden: &BTreeSet<String>,
    show_hidden: bool,
) -> Vec<MergedTimelineItem> {
    items
        .into_iter()
        .filter(|item| {
            if let MergedItem::Event(event) = &item.item {
                if event.is_metadata_only() {
                    return false;
                }
            }
            if !show_hidden {
                if let Some(key) = item.hidden_key() {
                    if hidden.contains(&key) {
                        return false;
                    }
                }
            }
            true
        })
        .collect()
}

/// Produce the exact list of items to render for a conversation.
///
/// Merges, filters, then drops records no renderer recognizes — a
/// malformed or unknown event is skipped silently rather than failing the
/// whole feed.
pub fn reconcile(
    timeline: &[TimelineEvent],
    review_comments: &[ReviewComment],
    hidden: &BTreeSet<String>,
    show_hidden: bool,
) -> Vec<MergedTimelineItem> {
    let merged = merge_timeline(timeline, review_comments);
    filter_visible(merged, hidden, show_hidden)
        .into_iter()
        .filter(|item| item.render_kind().is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeline::{
        AssignEvent, CommentEvent, GitActor, LabelEvent, ReviewEvent, SimpleEvent,
    };

    fn commented(id: i64, created_at: &str) -> TimelineEvent {
        TimelineEvent::Commented(CommentEvent {
            id,
            created_at: Some(created_at.to_string()),
            ..Default::default()
        })
    }

    fn committed(date: &str) -> TimelineEvent {
        TimelineEvent::Committed {
            sha: None,
            message: None,
            author: None,
            committer: Some(GitActor {
                date: Some(date.to_string()),
                ..Default::default()
            }),
        }
    }

    fn review_comment(id: i64, created_at: &str) -> ReviewComment {
        ReviewComment {
            id,
            created_at: Some(created_at.to_string()),
            ..Default::default()
        }
    }

    fn hidden(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_merge_orders_by_effective_timestamp() {
        // Spec'd concrete scenario: commit, then review comment between
        // commit and comment.
        let timeline = vec![
            committed("2024-01-01T00:00:00Z"),
            commented(1, "2024-01-02T00:00:00Z"),
        ];
        let comments = vec![review_comment(2, "2024-01-01T12:00:00Z")];

        let out = reconcile(&timeline, &comments, &BTreeSet::new(), false);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].render_kind(), Some(RenderKind::Commit));
        assert_eq!(out[1].render_kind(), Some(RenderKind::ReviewComment));
        assert_eq!(out[2].render_kind(), Some(RenderKind::Comment));
    }

    #[test]
    fn test_equal_timestamps_timeline_before_review_comments() {
        let ts = "2024-03-01T00:00:00Z";
        let timeline = vec![commented(1, ts), commented(2, ts)];
        let comments = vec![review_comment(3, ts), review_comment(4, ts)];

        let out = merge_timeline(&timeline, &comments);
        let ids: Vec<i64> = out
            .iter()
            .map(|item| match &item.item {
                MergedItem::Event(TimelineEvent::Commented(c)) => c.id,
                MergedItem::ReviewComment(c) => c.id,
                other => panic!("unexpected item: {:?}", other),
            })
            .collect();
        // Stable: timeline group first, input order preserved inside each.
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_timestamp_sorts_first() {
        let timeline = vec![
            commented(1, "2024-01-01T00:00:00Z"),
            TimelineEvent::Commented(CommentEvent {
                id: 2,
                ..Default::default()
            }),
        ];
        let out = merge_timeline(&timeline, &[]);
        assert_eq!(out[0].effective_timestamp, "");
        assert_eq!(out[1].effective_timestamp, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_label_and_assign_events_never_shown() {
        let timeline = vec![
            TimelineEvent::Labeled(LabelEvent {
                created_at: Some("2024-01-01T00:00:00Z".to_string()),
                ..Default::default()
            }),
            TimelineEvent::Unlabeled(LabelEvent::default()),
            TimelineEvent::Assigned(AssignEvent::default()),
            TimelineEvent::Unassigned(AssignEvent::default()),
            commented(1, "2024-01-02T00:00:00Z"),
        ];

        // Hard rule: excluded regardless of the hidden toggle.
        for show_hidden in [false, true] {
            let out = reconcile(&timeline, &[], &BTreeSet::new(), show_hidden);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].render_kind(), Some(RenderKind::Comment));
        }
    }

    #[test]
    fn test_hidden_filter_applies_to_comments_only() {
        let timeline = vec![
            commented(1, "2024-01-01T00:00:00Z"),
            TimelineEvent::Merged(SimpleEvent {
                created_at: Some("2024-01-02T00:00:00Z".to_string()),
                ..Default::default()
            }),
        ];
        let comments = vec![review_comment(2, "2024-01-03T00:00:00Z")];
        let hidden = hidden(&["comment-1", "review_comment-2", "merged-999"]);

        let out = reconcile(&timeline, &comments, &hidden, false);
        // Merge event survives; both hidden comment kinds are dropped.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].render_kind(), Some(RenderKind::Merge));
    }

    #[test]
    fn test_show_hidden_toggle_round_trip() {
        let timeline = vec![commented(1, "2024-01-01T00:00:00Z")];
        let comments = vec![review_comment(2, "2024-01-02T00:00:00Z")];
        let hidden = hidden(&["comment-1"]);

        let visible = reconcile(&timeline, &comments, &hidden, false);
        assert_eq!(visible.len(), 1);

        let all = reconcile(&timeline, &comments, &hidden, true);
        assert_eq!(all.len(), 2);

        // Toggling back off restores exactly the original filtered set.
        let again = reconcile(&timeline, &comments, &hidden, false);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].hidden_key(), visible[0].hidden_key());
    }

    #[test]
    fn test_unknown_events_silently_skipped() {
        let timeline: Vec<TimelineEvent> = vec![
            serde_json::from_str(r#"{"event":"locked","created_at":"2024-01-01T00:00:00Z"}"#)
                .unwrap(),
            commented(1, "2024-01-02T00:00:00Z"),
        ];
        let out = reconcile(&timeline, &[], &BTreeSet::new(), false);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_reviews_order_by_submitted_at() {
        let timeline = vec![
            TimelineEvent::Reviewed(ReviewEvent {
                id: 1,
                submitted_at: Some("2024-01-03T00:00:00Z".to_string()),
                ..Default::default()
            }),
            commented(2, "2024-01-01T00:00:00Z"),
        ];
        let out = merge_timeline(&timeline, &[]);
        assert_eq!(out[0].effective_timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(out[1].effective_timestamp, "2024-01-03T00:00:00Z");
    }

    #[test]
    fn test_reaction_targets() {
        let item = MergedTimelineItem {
            effective_timestamp: String::new(),
            item: MergedItem::Event(commented(42, "2024-01-01T00:00:00Z")),
        };
        let (item_type, id, reactions) = item.reaction_target().unwrap();
        assert_eq!(item_type, ItemType::Comment);
        assert_eq!(id, 42);
        assert!(reactions.is_none());

        let merge = MergedTimelineItem {
            effective_timestamp: String::new(),
            item: MergedItem::Event(TimelineEvent::Merged(SimpleEvent::default())),
        };
        assert!(merge.reaction_target().is_none());
    }
}
