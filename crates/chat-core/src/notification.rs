//! Notifications: the text lines delivered into a mailbox.
//!
//! From the directory's point of view a notification is an opaque,
//! immutable line. It is kept structured here so the wire codec can
//! ship it without re-parsing, and so tests can match on the kind.
//! [`Display`](std::fmt::Display) renders the exact line a user sees.

use std::fmt;

/// Longest message text, in bytes, that tell and broadcast accept.
///
/// Every field of a queued notification is either a valid username or
/// at most this much text, so a full drain batch always fits one wire
/// frame.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// One queued event in a user's mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `"<user> has joined."`
    Joined { user: String },

    /// `"<user> has logged out."`
    LoggedOut { user: String },

    /// Directed message: `"<sender> tells you <text>"`.
    Told { sender: String, text: String },

    /// Broadcast message: `"<sender> says <text>"`.
    Said { sender: String, text: String },

    /// Delivery failure for a directed message:
    /// `"<target> does not exist"`.
    NoSuchUser { target: String },

    /// Free-form server text.
    System(String),
}

impl Notification {
    pub fn joined(user: impl Into<String>) -> Self {
        Notification::Joined { user: user.into() }
    }

    pub fn logged_out(user: impl Into<String>) -> Self {
        Notification::LoggedOut { user: user.into() }
    }

    pub fn told(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Notification::Told {
            sender: sender.into(),
            text: text.into(),
        }
    }

    pub fn said(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Notification::Said {
            sender: sender.into(),
            text: text.into(),
        }
    }

    pub fn no_such_user(target: impl Into<String>) -> Self {
        Notification::NoSuchUser {
            target: target.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Notification::System(text.into())
    }

    /// True for messages addressed to a single user.
    pub fn is_directed(&self) -> bool {
        matches!(self, Notification::Told { .. })
    }

    /// True for messages fanned out to everybody online.
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Notification::Said { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Joined { user } => write!(f, "{} has joined.", user),
            Notification::LoggedOut { user } => write!(f, "{} has logged out.", user),
            Notification::Told { sender, text } => write!(f, "{} tells you {}", sender, text),
            Notification::Said { sender, text } => write!(f, "{} says {}", sender, text),
            Notification::NoSuchUser { target } => write!(f, "{} does not exist", target),
            Notification::System(text) => f.write_str(text),
        }
    }
}
