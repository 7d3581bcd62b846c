//! Message types used by the chat directory.
//!
//! These are **transport-agnostic** logical messages:
//! - [`Request`]: what the directory consumes.
//! - [`Response`]: what the directory answers with.
//!
//! Binary / text encoders live in the `chat-protocol` crate;
//! this module is purely logical.

use crate::error::DirectoryError;
use crate::notification::Notification;

/// A single call into the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Bring a user online.
    Register { username: String },

    /// Read and clear the oldest batch in the caller's mailbox.
    Drain { username: String },

    /// Snapshot of who is online, in registration order.
    ListOnline,

    /// Directed message to one user.
    Tell(Tell),

    /// Message to everybody online, sender included.
    Broadcast(Broadcast),

    /// Take a user offline. Idempotent.
    Logout { username: String },

    /// Ask the hosting process to stop. Carries no directory state.
    Shutdown,
}

/// Directed message request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tell {
    pub sender: String,
    pub target: String,
    pub text: String,
}

/// Broadcast message request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub sender: String,
    pub text: String,
}

/// Answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Successful registration.
    Welcome(Welcome),

    /// Mailbox contents, oldest first. May be empty.
    Notifications(Vec<Notification>),

    /// Usernames in registration order.
    Roster(Vec<String>),

    /// Plain acknowledgement.
    Ack,

    /// The call failed; the directory is unaffected.
    Fault(DirectoryError),
}

/// Greeting plus roster snapshot handed to a freshly registered user.
///
/// The roster is taken after the new user was added, so it always
/// contains that user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    pub greeting: String,
    pub roster: Vec<String>,
}

impl Request {
    /// Short name of the operation, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Register { .. } => "register",
            Request::Drain { .. } => "drain",
            Request::ListOnline => "list",
            Request::Tell(_) => "tell",
            Request::Broadcast(_) => "broadcast",
            Request::Logout { .. } => "logout",
            Request::Shutdown => "shutdown",
        }
    }
}

impl Response {
    /// Convenience: lift a `Result` into a response, mapping `Err` to `Fault`.
    pub fn from_result<T>(result: Result<T, DirectoryError>, ok: impl FnOnce(T) -> Response) -> Self {
        match result {
            Ok(value) => ok(value),
            Err(err) => Response::Fault(err),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault(_))
    }
}

impl From<Tell> for Request {
    fn from(tell: Tell) -> Self {
        Request::Tell(tell)
    }
}

impl From<Broadcast> for Request {
    fn from(broadcast: Broadcast) -> Self {
        Request::Broadcast(broadcast)
    }
}
