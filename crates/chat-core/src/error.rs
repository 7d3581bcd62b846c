//! Error types for the chat directory.
//!
//! Every fault is scoped to the single call that produced it. The
//! directory itself never ends up in a broken state because one
//! request was bad.

use thiserror::Error;

/// A per-call fault returned by [`Directory`](crate::Directory) operations.
///
/// Carries the offending username so callers can report it without
/// extra context. `Clone + PartialEq` so faults can be shipped back to
/// clients as ordinary responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The registration input is empty or otherwise malformed.
    #[error("invalid username: {0:?}")]
    InvalidUser(String),

    /// The named user is not currently online.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Somebody is already online under this name.
    #[error("username already registered: {0}")]
    AlreadyRegistered(String),

    /// The named sender tried to send more than
    /// [`MAX_MESSAGE_LEN`](crate::MAX_MESSAGE_LEN) bytes of text.
    #[error("message from {0} is too long")]
    MessageTooLong(String),
}

impl DirectoryError {
    /// The username the fault refers to.
    pub fn username(&self) -> &str {
        match self {
            DirectoryError::InvalidUser(name)
            | DirectoryError::UnknownUser(name)
            | DirectoryError::AlreadyRegistered(name)
            | DirectoryError::MessageTooLong(name) => name,
        }
    }
}
