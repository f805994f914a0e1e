//! Row view-models: one variant per message kind, each a pure function of the
//! message and its neighbours.

use chrono::Local;

use super::grouping::{flags_at, RowFlags};
use crate::message::{Message, MessageKind};

/// Parts shared by every row variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCommon {
    pub id: String,
    pub author: String,
    pub flags: RowFlags,
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    pub edited: bool,
    pub pending: bool,
    pub failed: bool,
    pub is_own: bool,
    /// `(emoji, count, reacted by current user)`
    pub reactions: Vec<(String, usize, bool)>,
    /// Id of the replied-to message
    pub reply_to: Option<String>,
    /// Author and first line of the replied-to message, when it is loaded
    pub reply_preview: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowModel {
    Text {
        common: RowCommon,
        body: String,
        mentions_me: bool,
    },
    System {
        common: RowCommon,
        text: String,
    },
    Attachment {
        common: RowCommon,
        caption: String,
        /// `(name, human readable size)`
        files: Vec<(String, String)>,
    },
}

impl RowModel {
    pub fn common(&self) -> &RowCommon {
        match self {
            RowModel::Text { common, .. }
            | RowModel::System { common, .. }
            | RowModel::Attachment { common, .. } => common,
        }
    }
}

const REPLY_PREVIEW_CHARS: usize = 60;

/// Build the view-model for `messages[index]`.
pub fn build_row(
    messages: &[Message],
    index: usize,
    current_user: &str,
    display_name: &str,
) -> Option<RowModel> {
    let message = messages.get(index)?;
    let common = RowCommon {
        id: message.id.clone(),
        author: message.author.clone(),
        flags: flags_at(messages, index),
        time: message
            .created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string(),
        edited: message.edited_at.is_some(),
        pending: message.pending,
        failed: message.failed,
        is_own: message.author == current_user,
        reactions: message
            .reactions
            .iter()
            .map(|r| (r.emoji.clone(), r.count(), r.users.contains(current_user)))
            .collect(),
        reply_to: message.reply_to.clone(),
        reply_preview: message.reply_to.as_deref().and_then(|target| {
            // Replies usually point at recent history; scan backwards
            messages[..index]
                .iter()
                .rev()
                .find(|m| m.id == target)
                .map(|m| (m.author.clone(), preview_line(&m.body)))
        }),
    };

    Some(match message.kind {
        MessageKind::Text => RowModel::Text {
            mentions_me: !common.is_own
                && (contains_mention(&message.body, display_name)
                    || contains_mention(&message.body, current_user)),
            body: message.body.clone(),
            common,
        },
        MessageKind::System => RowModel::System {
            text: message.body.clone(),
            common,
        },
        MessageKind::Attachment => RowModel::Attachment {
            caption: message.body.clone(),
            files: message
                .attachments
                .iter()
                .map(|a| (a.name.clone(), format_size(a.size_bytes)))
                .collect(),
            common,
        },
    })
}

fn preview_line(body: &str) -> String {
    let first = body.lines().next().unwrap_or_default();
    if first.chars().count() > REPLY_PREVIEW_CHARS {
        let cut: String = first.chars().take(REPLY_PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Whole-word, case-insensitive match of `name` in `text`. `@name` counts.
pub(crate) fn contains_mention(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    let name = name.to_lowercase();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    text.match_indices(&name).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = text[..start].chars().next_back().is_none_or(|c| !is_word(c));
        let after_ok = text[end..].chars().next().is_none_or(|c| !is_word(c));
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, author: &str, secs: i64, body: &str) -> Message {
        Message::new(id, author, body, Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    #[test]
    fn test_build_row_variants() {
        let messages = vec![
            msg("1", "alice", 0, "hello @me"),
            msg("2", "system", 1, "bob joined").with_kind(MessageKind::System),
            msg("3", "bob", 2, "see file").with_attachment(Attachment {
                name: "report.pdf".into(),
                mime_type: "application/pdf".into(),
                size_bytes: 2048,
            }),
        ];

        match build_row(&messages, 0, "me", "Me").unwrap() {
            RowModel::Text { mentions_me, body, .. } => {
                assert!(mentions_me);
                assert_eq!(body, "hello @me");
            }
            other => panic!("unexpected row {other:?}"),
        }
        assert!(matches!(
            build_row(&messages, 1, "me", "Me"),
            Some(RowModel::System { .. })
        ));
        match build_row(&messages, 2, "me", "Me").unwrap() {
            RowModel::Attachment { files, .. } => {
                assert_eq!(files, vec![("report.pdf".to_string(), "2.0 KB".to_string())]);
            }
            other => panic!("unexpected row {other:?}"),
        }
        assert!(build_row(&messages, 3, "me", "Me").is_none());
    }

    #[test]
    fn test_reply_preview_and_reactions() {
        let mut reply = msg("2", "me", 5, "agreed").replying_to(Some("1".into()));
        reply.toggle_reaction("👍", "alice");
        reply.toggle_reaction("👍", "me");
        let messages = vec![msg("1", "alice", 0, "shall we ship it?\nsecond line"), reply];

        let row = build_row(&messages, 1, "me", "Me").unwrap();
        let common = row.common();
        assert!(common.is_own);
        assert_eq!(
            common.reply_preview,
            Some(("alice".to_string(), "shall we ship it?".to_string()))
        );
        assert_eq!(common.reactions, vec![("👍".to_string(), 2, true)]);
    }

    #[test]
    fn test_own_messages_never_mention() {
        let messages = vec![msg("1", "me", 0, "talking about me")];
        match build_row(&messages, 0, "me", "Me").unwrap() {
            RowModel::Text { mentions_me, .. } => assert!(!mentions_me),
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[test]
    fn test_contains_mention() {
        assert!(contains_mention("hey alice, lunch?", "alice"));
        assert!(contains_mention("@Alice ping", "alice"));
        assert!(contains_mention("alice", "ALICE"));
        assert!(!contains_mention("malice aforethought", "alice"));
        assert!(!contains_mention("alicebot says hi", "alice"));
        assert!(!contains_mention("anything", ""));
        assert!(!contains_mention("", "alice"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
