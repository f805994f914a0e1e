//! Virtualized message panel: only rows near the viewport are laid out.
//! Features: run grouping with avatars, reactions, replies, load-older on scroll.

mod format;
mod render;
mod row;

use crate::ui::theme::ChatTheme;

// Re-export public API
pub use render::render_message_list;

/// Something the user did on the message panel that the app must handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    React { message_id: String, emoji: String },
    Reply { message_id: String },
    Edit { message_id: String },
    Delete { message_id: String },
    /// Bring a loaded message into view (reply quote clicked)
    ShowMessage { message_id: String },
    /// Retry button on the error banner
    RetryHistory,
    /// The top of the list came into view
    LoadOlder,
}

/// Per-frame inputs shared by all rows.
pub struct RowContext<'a> {
    pub user_id: &'a str,
    pub display_name: &'a str,
    pub theme: &'a ChatTheme,
}
