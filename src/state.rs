//! Core application state, separated from UI logic.
//!
//! `ClientState` holds the conversation buffers, the mounted message list and
//! its generation, toasts and the error banner. UI components receive it as a
//! parameter rather than owning it.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;

use crate::buffer::{ConversationBuffer, LoadState};
use crate::config::Settings;
use crate::list::{ListOptions, MessageList};
use crate::message::{ConversationSummary, Message};
use crate::protocol::BackendAction;
use crate::transcript::Transcript;

/// Core application state for the chat client.
pub struct ClientState {
    pub user_id: String,
    pub display_name: String,

    /// Message buffers keyed by conversation id.
    pub buffers: HashMap<String, ConversationBuffer>,

    /// Conversation ids in sidebar order.
    pub conversation_order: Vec<String>,

    /// Conversation currently on screen.
    pub active: Option<String>,

    /// List state of the active conversation; rebuilt on every mount.
    pub list: Option<MessageList>,

    /// Bumped on every mount. History results tagged with another value
    /// belong to a list that is gone.
    pub generation: u64,

    pub list_options: ListOptions,
    pub bottom_threshold: f32,
    pub page_size: usize,

    /// Status toast messages with creation time (auto-expire).
    pub status_messages: Vec<(String, Instant)>,

    /// Inline error shown above the list, with a retry button.
    pub banner: Option<String>,

    /// Transcript writer, when enabled.
    pub transcript: Option<Transcript>,

    local_seq: u64,
}

impl ClientState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            user_id: settings.user_id.clone(),
            display_name: settings.display_name.clone(),
            buffers: HashMap::new(),
            conversation_order: Vec::new(),
            active: None,
            list: None,
            generation: 0,
            list_options: settings.list_options(),
            bottom_threshold: settings.bottom_threshold,
            page_size: settings.page_size,
            status_messages: Vec::new(),
            banner: None,
            transcript: None,
            local_seq: 0,
        }
    }

    /// Add new conversations and refresh titles of known ones.
    pub fn upsert_conversations(&mut self, summaries: Vec<ConversationSummary>) {
        for summary in summaries {
            match self.buffers.get_mut(&summary.id) {
                Some(buffer) => {
                    buffer.title = summary.title;
                    buffer.participants = summary.participants;
                }
                None => {
                    self.conversation_order.push(summary.id.clone());
                    self.buffers.insert(
                        summary.id,
                        ConversationBuffer::new(summary.title, summary.participants),
                    );
                }
            }
        }
    }

    pub fn active_buffer(&self) -> Option<&ConversationBuffer> {
        self.buffers.get(self.active.as_deref()?)
    }

    pub fn active_buffer_mut(&mut self) -> Option<&mut ConversationBuffer> {
        let id = self.active.as_deref()?;
        self.buffers.get_mut(id)
    }

    /// Mount `id`'s list, replacing the previous one. Returns the initial
    /// history request when the buffer has nothing loaded yet.
    pub fn open_conversation(&mut self, id: &str) -> Option<BackendAction> {
        if !self.buffers.contains_key(id) {
            log::debug!("open of unknown conversation {id}");
            return None;
        }
        self.unmount();
        self.generation += 1;
        self.active = Some(id.to_string());
        self.list = Some(MessageList::new(
            self.user_id.clone(),
            self.list_options,
            self.bottom_threshold,
        ));
        log::debug!("mounted {id} at generation {}", self.generation);

        let buffer = self.buffers.get_mut(id)?;
        buffer.clear_unread();
        // An in-flight request from an earlier mount will be discarded
        if buffer.load != LoadState::Idle {
            buffer.load = LoadState::Idle;
        }
        if buffer.messages.is_empty() && buffer.has_more {
            return self.request_history();
        }
        None
    }

    /// Drop the mounted list. Pending history results become stale.
    pub fn unmount(&mut self) {
        if self.list.take().is_some() {
            self.generation += 1;
        }
        self.banner = None;
    }

    /// Request the page before the oldest loaded message of the active
    /// conversation, if one is due.
    pub fn request_history(&mut self) -> Option<BackendAction> {
        let conversation = self.active.clone()?;
        let generation = self.generation;
        let limit = self.page_size;
        let buffer = self.buffers.get_mut(&conversation)?;
        if !buffer.has_more || buffer.is_loading() {
            return None;
        }
        buffer.load = LoadState::Loading;
        Some(BackendAction::FetchHistory {
            before: buffer.oldest_id().map(str::to_string),
            conversation,
            limit,
            generation,
        })
    }

    /// Manual retry after a failed history load.
    pub fn retry_history(&mut self) -> Option<BackendAction> {
        let (has_more, is_loading) = {
            let buffer = self.active_buffer()?;
            (buffer.has_more, buffer.is_loading())
        };
        self.banner = None;
        if let Some(buffer) = self.active_buffer_mut() {
            if matches!(buffer.load, LoadState::Failed(_)) {
                buffer.load = LoadState::Idle;
            }
        }
        let due = match self.list.as_mut() {
            Some(list) => list.retry_load(has_more, is_loading),
            None => has_more && !is_loading,
        };
        if due {
            self.request_history()
        } else {
            None
        }
    }

    /// Insert an optimistic message into the active conversation and build
    /// the send action for it.
    pub fn send_message(&mut self, body: String, reply_to: Option<String>) -> Option<BackendAction> {
        let conversation = self.active.clone()?;
        self.local_seq += 1;
        let local_id = format!("local-{}", self.local_seq);

        let buffer = self.buffers.get_mut(&conversation)?;
        // Never sort before already displayed messages
        let now = Utc::now();
        let created_at = buffer
            .messages
            .last()
            .map(|m| m.created_at.max(now))
            .unwrap_or(now);
        let optimistic = Message::new(local_id.clone(), self.user_id.clone(), body.clone(), created_at)
            .replying_to(reply_to.clone())
            .pending();
        buffer.push(optimistic, true, false);

        Some(BackendAction::SendMessage {
            conversation,
            local_id,
            body,
            reply_to,
        })
    }

    /// Neighbor of the active conversation in sidebar order, wrapping around.
    pub fn adjacent_conversation(&self, forward: bool) -> Option<String> {
        let len = self.conversation_order.len();
        if len == 0 {
            return None;
        }
        let current = self
            .active
            .as_deref()
            .and_then(|id| self.conversation_order.iter().position(|c| c == id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.conversation_order.get(next).cloned()
    }

    /// Unread messages across all conversations.
    pub fn total_unread(&self) -> usize {
        self.buffers.values().map(|b| b.unread_count).sum()
    }

    pub fn toast(&mut self, text: impl Into<String>) {
        self.status_messages.push((text.into(), Instant::now()));
    }

    /// Purge status messages older than the given duration.
    pub fn purge_old_status_messages(&mut self, max_age_secs: u64) {
        self.status_messages
            .retain(|(_, created)| created.elapsed().as_secs() < max_age_secs);
    }
}
