//! Error types for the list core and the message store.

use thiserror::Error;

/// A row reported a height the layout cannot use.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("row measurement without a message id")]
    EmptyId,
    #[error("invalid height {height} for row {id}")]
    InvalidHeight { id: String, height: f32 },
}

/// Failures reported by a [`crate::backend::MessageStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown conversation {0}")]
    UnknownConversation(String),
    #[error("unknown message {0}")]
    UnknownMessage(String),
    #[error("only the author can change message {0}")]
    NotAuthor(String),
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}
