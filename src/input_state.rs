//! Composer state: the text being written, reply / edit mode and input history.
//!
//! Kept apart from the widget code so the key handling rules can be tested
//! without an egui context.

use crate::validation::{sanitize_message, validate_message};

/// What Enter does with the composer text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposerMode {
    #[default]
    Compose,
    /// Reply to a message; `preview` is shown above the input
    Reply {
        message_id: String,
        author: String,
        preview: String,
    },
    /// Replace the body of one of the user's messages
    Edit { message_id: String },
}

/// A validated composer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Send {
        body: String,
        reply_to: Option<String>,
    },
    Edit {
        message_id: String,
        body: String,
    },
}

#[derive(Default, Debug)]
pub struct InputState {
    /// Current message being composed
    pub message_input: String,

    pub mode: ComposerMode,

    /// Sent messages, oldest first (for up/down arrow navigation)
    pub history: Vec<String>,

    /// Current position in history (None = not navigating)
    pub history_pos: Option<usize>,

    /// Saved input when entering history mode
    pub history_saved_input: Option<String>,

    /// Validation error shown under the input
    pub error: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<String>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn start_reply(&mut self, message_id: &str, author: &str, body: &str) {
        let preview: String = body.lines().next().unwrap_or_default().chars().take(80).collect();
        self.mode = ComposerMode::Reply {
            message_id: message_id.to_string(),
            author: author.to_string(),
            preview,
        };
    }

    /// Load an existing message into the composer for editing.
    pub fn start_edit(&mut self, message_id: &str, body: &str) {
        self.mode = ComposerMode::Edit {
            message_id: message_id.to_string(),
        };
        self.message_input = body.to_string();
        self.reset_history_navigation();
    }

    /// Esc: leave reply / edit mode, or clear the text in compose mode.
    pub fn cancel(&mut self) {
        match self.mode {
            ComposerMode::Compose => self.message_input.clear(),
            ComposerMode::Edit { .. } => {
                self.message_input.clear();
                self.mode = ComposerMode::Compose;
            }
            ComposerMode::Reply { .. } => self.mode = ComposerMode::Compose,
        }
        self.reset_history_navigation();
        self.error = None;
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        match self.history_pos {
            None => {
                // store current text to restore if user navigates back
                self.history_saved_input = Some(self.message_input.clone());
                self.history_pos = Some(self.history.len() - 1);
            }
            Some(pos) if pos > 0 => self.history_pos = Some(pos - 1),
            Some(_) => {}
        }
        if let Some(entry) = self.history_pos.and_then(|pos| self.history.get(pos)) {
            self.message_input = entry.clone();
        }
    }

    pub fn history_down(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.message_input = self.history[pos + 1].clone();
        } else {
            // Exit history navigation
            self.history_pos = None;
            self.message_input = self.history_saved_input.take().unwrap_or_default();
        }
    }

    fn reset_history_navigation(&mut self) {
        self.history_pos = None;
        self.history_saved_input = None;
    }

    /// Validate the text and turn it into a submission. On success the
    /// composer returns to compose mode with an empty input.
    pub fn submit(&mut self) -> Option<Submission> {
        let body = sanitize_message(&self.message_input);
        if let Err(e) = validate_message(&body) {
            // Enter on an empty composer is not an error worth showing
            self.error = (!self.message_input.trim().is_empty()).then_some(e);
            return None;
        }

        let submission = match std::mem::take(&mut self.mode) {
            ComposerMode::Compose => Submission::Send {
                body: body.clone(),
                reply_to: None,
            },
            ComposerMode::Reply { message_id, .. } => Submission::Send {
                body: body.clone(),
                reply_to: Some(message_id),
            },
            ComposerMode::Edit { message_id } => Submission::Edit {
                message_id,
                body: body.clone(),
            },
        };
        if matches!(submission, Submission::Send { .. }) {
            self.history.push(body);
        }
        self.message_input.clear();
        self.reset_history_navigation();
        self.error = None;
        Some(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_compose_and_reply() {
        let mut input = InputState::new();
        input.message_input = "  hello \r\n".into();
        assert_eq!(
            input.submit(),
            Some(Submission::Send { body: "hello".into(), reply_to: None })
        );
        assert!(input.message_input.is_empty());
        assert_eq!(input.history, vec!["hello"]);

        input.start_reply("m7", "bob", "original\nsecond line");
        assert!(matches!(&input.mode, ComposerMode::Reply { preview, .. } if preview == "original"));
        input.message_input = "answer".into();
        assert_eq!(
            input.submit(),
            Some(Submission::Send { body: "answer".into(), reply_to: Some("m7".into()) })
        );
        assert_eq!(input.mode, ComposerMode::Compose);
    }

    #[test]
    fn test_edit_mode_round() {
        let mut input = InputState::new();
        input.start_edit("m1", "old text");
        assert_eq!(input.message_input, "old text");
        input.message_input = "new text".into();
        assert_eq!(
            input.submit(),
            Some(Submission::Edit { message_id: "m1".into(), body: "new text".into() })
        );
        // Edits are not added to the history
        assert!(input.history.is_empty());

        input.start_edit("m2", "keep");
        input.cancel();
        assert_eq!(input.mode, ComposerMode::Compose);
        assert!(input.message_input.is_empty());
    }

    #[test]
    fn test_invalid_submission_sets_error() {
        let mut input = InputState::new();
        assert!(input.submit().is_none());
        assert!(input.error.is_none());

        input.message_input = "x".repeat(crate::validation::MAX_MESSAGE_CHARS + 1);
        assert!(input.submit().is_none());
        assert!(input.error.is_some());
        // Text is kept so the user can fix it
        assert!(!input.message_input.is_empty());
    }

    #[test]
    fn test_history_navigation() {
        let mut input = InputState::with_history(vec!["one".into(), "two".into()]);
        input.message_input = "draft".into();

        input.history_up();
        assert_eq!(input.message_input, "two");
        input.history_up();
        assert_eq!(input.message_input, "one");
        input.history_up();
        assert_eq!(input.message_input, "one");

        input.history_down();
        assert_eq!(input.message_input, "two");
        input.history_down();
        assert_eq!(input.message_input, "draft");
        assert!(input.history_pos.is_none());
    }
}
