use crate::message::{ConversationSummary, Message, Page};

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Request the conversation list
    ListConversations,
    /// Load a page of history older than `before` (newest page when `None`)
    FetchHistory {
        conversation: String,
        before: Option<String>,
        limit: usize,
        /// Mount generation of the list that asked
        generation: u64,
    },
    /// Send a message; `local_id` identifies the optimistic copy
    SendMessage {
        conversation: String,
        local_id: String,
        body: String,
        reply_to: Option<String>,
    },
    EditMessage {
        conversation: String,
        message_id: String,
        body: String,
    },
    DeleteMessage {
        conversation: String,
        message_id: String,
    },
    /// Add or remove the current user's reaction
    ToggleReaction {
        conversation: String,
        message_id: String,
        emoji: String,
    },
    /// Stop the backend thread
    Shutdown,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// Conversation list
    Conversations(Vec<ConversationSummary>),
    /// A history page arrived
    HistoryLoaded {
        conversation: String,
        generation: u64,
        page: Page,
    },
    /// A history request failed
    HistoryFailed {
        conversation: String,
        generation: u64,
        reason: String,
    },
    /// The store accepted an optimistic message
    MessageSent {
        conversation: String,
        local_id: String,
        message: Message,
    },
    /// The store rejected an optimistic message
    SendFailed {
        conversation: String,
        local_id: String,
        reason: String,
    },
    /// A message from someone else
    MessageReceived {
        conversation: String,
        message: Message,
    },
    /// A message was edited or its reactions changed
    MessageUpdated {
        conversation: String,
        message: Message,
    },
    MessageDeleted {
        conversation: String,
        message_id: String,
    },
    /// Store error not tied to a pending message
    Error(String),
}
