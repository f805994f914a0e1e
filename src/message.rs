//! Message model shared by the store, the backend and the list core.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator used to pick a row renderer variant.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    /// Conversation events (member joined, title changed, ...)
    System,
    /// A message whose main content is one or more attachments
    Attachment,
}

/// Users who reacted with one emoji.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub users: BTreeSet<String>,
}

impl Reaction {
    pub fn count(&self) -> usize {
        self.users.len()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// A single chat message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Locally originated and not yet confirmed by the store
    #[serde(default)]
    pub pending: bool,
    /// The store rejected a locally originated message
    #[serde(default)]
    pub failed: bool,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            body: body.into(),
            created_at,
            edited_at: None,
            reactions: Vec::new(),
            attachments: Vec::new(),
            kind: MessageKind::Text,
            reply_to: None,
            pending: false,
            failed: false,
        }
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self.kind = MessageKind::Attachment;
        self
    }

    pub fn replying_to(mut self, id: Option<String>) -> Self {
        self.reply_to = id;
        self
    }

    pub fn pending(mut self) -> Self {
        self.pending = true;
        self
    }

    /// Toggle `user`'s reaction with `emoji`. Empty reactions are dropped.
    pub fn toggle_reaction(&mut self, emoji: &str, user: &str) {
        match self.reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(reaction) => {
                if !reaction.users.remove(user) {
                    reaction.users.insert(user.to_string());
                }
            }
            None => self.reactions.push(Reaction {
                emoji: emoji.to_string(),
                users: BTreeSet::from([user.to_string()]),
            }),
        }
        self.reactions.retain(|r| !r.users.is_empty());
    }
}

/// Sidebar entry for a conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub participants: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// One page of history, ascending by creation time.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Page {
    pub messages: Vec<Message>,
    /// Older messages exist before the first one of this page
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_toggle_reaction() {
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        let mut msg = Message::new("m1", "alice", "hi", ts);

        msg.toggle_reaction("👍", "bob");
        msg.toggle_reaction("👍", "carol");
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].count(), 2);

        msg.toggle_reaction("👍", "bob");
        assert_eq!(msg.reactions[0].count(), 1);

        // Last user removing their reaction drops the entry
        msg.toggle_reaction("👍", "carol");
        assert!(msg.reactions.is_empty());
    }

    #[test]
    fn test_deserialize_minimal_message() {
        let json = r#"{"id":"m1","author":"alice","body":"hello","created_at":"2024-05-01T12:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.reactions.is_empty());
        assert!(!msg.pending);
    }
}
