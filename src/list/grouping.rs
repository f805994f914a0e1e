//! Run-length grouping of consecutive messages by author.
//!
//! Consecutive messages from one author merge visually while each gap stays
//! within [`GROUP_GAP_MILLIS`]: the timestamp is shown on the first row of a
//! run and the avatar on the last.

use chrono::TimeDelta;

use crate::message::Message;

/// Maximum gap between two messages of one run. A gap of exactly this size
/// keeps the run together.
pub const GROUP_GAP_MILLIS: i64 = 60_000;

/// Per-row display flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowFlags {
    pub show_avatar: bool,
    pub show_timestamp: bool,
}

/// True when `later` cannot continue the run that `earlier` belongs to.
fn breaks_run(earlier: &Message, later: &Message) -> bool {
    later.author != earlier.author
        || later.created_at - earlier.created_at > TimeDelta::milliseconds(GROUP_GAP_MILLIS)
}

/// Derive display flags from a message and its neighbours.
pub fn row_flags(message: &Message, prev: Option<&Message>, next: Option<&Message>) -> RowFlags {
    RowFlags {
        show_avatar: next.is_none_or(|next| breaks_run(message, next)),
        show_timestamp: prev.is_none_or(|prev| breaks_run(prev, message)),
    }
}

/// [`row_flags`] for the message at `index`, using slice neighbours.
///
/// Out-of-range indices yield default (all false) flags.
pub fn flags_at(messages: &[Message], index: usize) -> RowFlags {
    let Some(message) = messages.get(index) else {
        return RowFlags::default();
    };
    let prev = index.checked_sub(1).and_then(|i| messages.get(i));
    let next = messages.get(index + 1);
    row_flags(message, prev, next)
}
