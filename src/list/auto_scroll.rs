//! Stick-to-bottom versus anchor-preserving scroll decisions.

use crate::message::Message;

/// Default distance from the bottom that still counts as "at the bottom".
pub const DEFAULT_BOTTOM_THRESHOLD: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAnchor {
    AtBottom,
    ScrolledUp,
}

/// How the message array changed since the previous sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// First messages arrived in an empty list
    Initial,
    /// The new last message was written by the current user
    OwnSend,
    /// The new last message came from someone else
    Incoming,
    /// Older history was inserted at the top
    HistoryPrepend { inserted: usize },
    /// Edits, reactions, deletions; both ends unchanged
    InPlace,
    /// The list became empty
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    ScrollToBottom,
    /// Shift the scroll position by the growth of the content height
    PreserveAnchor { previous_total: f32 },
    Keep,
}

/// Identity of a message array: enough to classify the next change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    len: usize,
    first: Option<String>,
    last: Option<String>,
}

impl ListSnapshot {
    pub fn of(messages: &[Message]) -> Self {
        Self {
            len: messages.len(),
            first: messages.first().map(|m| m.id.clone()),
            last: messages.last().map(|m| m.id.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoScrollController {
    anchor: ScrollAnchor,
    current_user: String,
    bottom_threshold: f32,
    snapshot: ListSnapshot,
}

impl AutoScrollController {
    pub fn new(current_user: impl Into<String>, bottom_threshold: f32) -> Self {
        Self {
            anchor: ScrollAnchor::AtBottom,
            current_user: current_user.into(),
            bottom_threshold: bottom_threshold.max(0.0),
            snapshot: ListSnapshot::default(),
        }
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    /// Classify `messages` against the last recorded snapshot.
    pub fn classify(&self, messages: &[Message]) -> Mutation {
        let prev = &self.snapshot;
        let (Some(first), Some(last)) = (messages.first(), messages.last()) else {
            return if prev.len == 0 {
                Mutation::InPlace
            } else {
                Mutation::Cleared
            };
        };
        if prev.len == 0 {
            return Mutation::Initial;
        }

        if prev.last.as_deref() == Some(last.id.as_str()) {
            if prev.first.as_deref() != Some(first.id.as_str()) && messages.len() > prev.len {
                let old_first = messages
                    .iter()
                    .position(|m| Some(m.id.as_str()) == prev.first.as_deref());
                if let Some(inserted) = old_first.filter(|&n| n > 0) {
                    return Mutation::HistoryPrepend { inserted };
                }
            }
            return Mutation::InPlace;
        }

        // A new last id is an append even when the head was trimmed in the
        // same change; only a shrink that lost the old last row is a deletion
        let old_last_kept = prev
            .last
            .as_deref()
            .is_some_and(|id| messages.iter().rev().any(|m| m.id == id));
        if messages.len() < prev.len && !old_last_kept {
            return Mutation::InPlace;
        }
        if last.author == self.current_user {
            Mutation::OwnSend
        } else {
            Mutation::Incoming
        }
    }

    pub fn record(&mut self, messages: &[Message]) {
        self.snapshot = ListSnapshot::of(messages);
    }

    /// Update the anchor from a user-driven scroll.
    pub fn on_scroll(&mut self, scroll_top: f32, viewport_height: f32, content_height: f32) {
        let distance = content_height - viewport_height - scroll_top;
        self.anchor = if distance <= self.bottom_threshold {
            ScrollAnchor::AtBottom
        } else {
            ScrollAnchor::ScrolledUp
        };
    }

    /// Decide how to scroll after `mutation`. `previous_total` is the content
    /// height measured before the mutation was laid out.
    pub fn on_mutation(&mut self, mutation: Mutation, previous_total: f32) -> ScrollCommand {
        match (self.anchor, mutation) {
            (_, Mutation::Initial) => {
                self.anchor = ScrollAnchor::AtBottom;
                ScrollCommand::ScrollToBottom
            }
            (_, Mutation::Cleared) => {
                self.anchor = ScrollAnchor::AtBottom;
                ScrollCommand::Keep
            }
            (ScrollAnchor::AtBottom, _) => ScrollCommand::ScrollToBottom,
            (ScrollAnchor::ScrolledUp, Mutation::OwnSend) => {
                self.anchor = ScrollAnchor::AtBottom;
                ScrollCommand::ScrollToBottom
            }
            (ScrollAnchor::ScrolledUp, Mutation::HistoryPrepend { .. }) => {
                ScrollCommand::PreserveAnchor { previous_total }
            }
            (ScrollAnchor::ScrolledUp, Mutation::Incoming | Mutation::InPlace) => {
                ScrollCommand::Keep
            }
        }
    }
}
