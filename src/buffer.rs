use crate::message::{Message, Page};

/// Maximum messages to keep in a buffer before trimming
const MAX_BUFFER_MESSAGES: usize = 5000;
/// Number of oldest messages to remove when trimming
const BUFFER_TRIM_COUNT: usize = 1000;

/// History loading state of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// Messages of one conversation, ascending by creation time.
///
/// Every mutation bumps `revision` so the mounted list knows when to re-sync.
#[derive(Default, Clone, Debug)]
pub struct ConversationBuffer {
    pub title: String,
    pub participants: Vec<String>,
    pub messages: Vec<Message>,
    /// Older history exists in the store
    pub has_more: bool,
    pub load: LoadState,
    /// Number of unread messages
    pub unread_count: usize,
    /// Whether an unread message mentions the current user
    pub has_mention: bool,
    revision: u64,
}

impl ConversationBuffer {
    pub fn new(title: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            title: title.into(),
            participants,
            has_more: true,
            ..Default::default()
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    pub fn oldest_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }

    fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    /// Insert an older page at the top. Ids already present are skipped.
    pub fn prepend_page(&mut self, page: Page) {
        let mut older: Vec<Message> = page
            .messages
            .into_iter()
            .filter(|m| !self.contains(&m.id))
            .collect();
        older.sort_by_key(|m| m.created_at);
        older.append(&mut self.messages);
        self.messages = older;
        self.has_more = page.has_more;
        self.load = LoadState::Idle;
        self.touch();
    }

    /// Add a message at its sorted position (normally the end).
    ///
    /// Returns `false` for duplicates.
    pub fn push(&mut self, msg: Message, is_active: bool, is_mention: bool) -> bool {
        if self.contains(&msg.id) {
            return false;
        }
        let at = self
            .messages
            .partition_point(|m| m.created_at <= msg.created_at);
        self.messages.insert(at, msg);
        if !is_active {
            self.unread_count += 1;
            if is_mention {
                self.has_mention = true;
            }
        }
        // Trim old messages if buffer gets too large
        if self.messages.len() > MAX_BUFFER_MESSAGES {
            self.messages.drain(0..BUFFER_TRIM_COUNT);
            self.has_more = true;
        }
        self.touch();
        true
    }

    /// Swap an optimistic message for the stored one.
    pub fn confirm(&mut self, local_id: &str, stored: Message) -> bool {
        if let Some(slot) = self.messages.iter_mut().find(|m| m.id == local_id) {
            *slot = stored;
            self.touch();
            return true;
        }
        // Confirmation raced ahead of the optimistic insert or the row was trimmed
        self.push(stored, true, false)
    }

    /// Flag an optimistic message the store rejected.
    pub fn mark_failed(&mut self, local_id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == local_id) {
            Some(slot) => {
                slot.pending = false;
                slot.failed = true;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Replace a message in place (edits, reactions).
    pub fn replace(&mut self, msg: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == msg.id) {
            Some(slot) => {
                *slot = msg;
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        let removed = self.messages.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn clear_unread(&mut self) {
        self.unread_count = 0;
        self.has_mention = false;
    }

    /// Forget loaded history; the next mount fetches the newest page again.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.has_more = true;
        self.load = LoadState::Idle;
        self.touch();
    }
}
