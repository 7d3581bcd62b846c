//! The chat directory: who is online, and what is waiting for them.
//!
//! The directory owns the roster of online users and one [`Mailbox`]
//! per user. Both live in a single [`IndexMap`] keyed by username:
//! - iteration order is registration order, which is the roster order;
//! - a user is online iff it has an entry, so the roster and the
//!   mailbox mapping cannot drift apart.
//!
//! Everything here is synchronous and single-threaded. Callers that
//! share a directory across tasks are expected to serialize access
//! (the server runs it inside one actor task).
//!
//! Delivery failures on directed messages are *delivered*, not raised:
//! telling a user who is not online drops a "does not exist" notice in
//! the sender's own mailbox.
//!
//! Size limits are checked before anything is queued. Message text is
//! capped at [`MAX_MESSAGE_LEN`] and every name that ends up inside a
//! notification is a valid username, so a mailbox never holds something
//! a client cannot be sent.

use indexmap::IndexMap;

use crate::error::DirectoryError;
use crate::mailbox::{Mailbox, MAX_DRAIN_BATCH};
use crate::messages::{Broadcast, Request, Response, Tell, Welcome};
use crate::notification::{Notification, MAX_MESSAGE_LEN};
use crate::username::validate_username;

/// First line of every welcome.
pub const GREETING: &str = "Welcome to chatroom v1.0!";

/// Registry of online users and their mailboxes.
#[derive(Debug, Default)]
pub struct Directory {
    /// Username -> mailbox, in registration order.
    users: IndexMap<String, Mailbox>,
}

impl Directory {
    /// Create a new, empty directory.
    pub fn new() -> Self {
        Directory::default()
    }

    /// Process a single request and return its response.
    ///
    /// `Shutdown` is acknowledged without touching any state; acting on
    /// it is the host's business.
    pub fn process_request(&mut self, request: Request) -> Response {
        match request {
            Request::Register { username } => {
                Response::from_result(self.register(&username), Response::Welcome)
            }
            Request::Drain { username } => {
                Response::from_result(self.drain(&username), Response::Notifications)
            }
            Request::ListOnline => Response::Roster(self.list_online()),
            Request::Tell(Tell {
                sender,
                target,
                text,
            }) => Response::from_result(self.tell(&sender, &target, &text), |_| Response::Ack),
            Request::Broadcast(Broadcast { sender, text }) => {
                Response::from_result(self.broadcast(&sender, &text), |_| Response::Ack)
            }
            Request::Logout { username } => {
                self.logout(&username);
                Response::Ack
            }
            Request::Shutdown => Response::Ack,
        }
    }

    /// Bring `username` online.
    ///
    /// Every user already online gets a join notice; the new user does
    /// not get one about itself. The returned roster includes the new
    /// user.
    ///
    /// A name that is already online is rejected with
    /// [`DirectoryError::AlreadyRegistered`] and the existing session is
    /// left alone.
    pub fn register(&mut self, username: &str) -> Result<Welcome, DirectoryError> {
        validate_username(username)?;

        if self.users.contains_key(username) {
            return Err(DirectoryError::AlreadyRegistered(username.to_string()));
        }

        for mailbox in self.users.values_mut() {
            mailbox.deliver(Notification::joined(username));
        }
        self.users.insert(username.to_string(), Mailbox::new());

        Ok(Welcome {
            greeting: GREETING.to_string(),
            roster: self.list_online(),
        })
    }

    /// Return and clear the oldest notifications queued for `username`.
    ///
    /// At most [`MAX_DRAIN_BATCH`] come back per call; a full batch means
    /// more may be waiting.
    pub fn drain(&mut self, username: &str) -> Result<Vec<Notification>, DirectoryError> {
        self.users
            .get_mut(username)
            .map(|mailbox| mailbox.drain(MAX_DRAIN_BATCH))
            .ok_or_else(|| DirectoryError::UnknownUser(username.to_string()))
    }

    /// Usernames currently online, in registration order.
    pub fn list_online(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    /// Send `text` from `sender` to `target`.
    ///
    /// The sender must be online and the text no longer than
    /// [`MAX_MESSAGE_LEN`]. A target that is not a valid username is
    /// rejected outright. A valid target that is not online gets the
    /// sender a "does not exist" notice instead, and nobody else is
    /// touched.
    pub fn tell(&mut self, sender: &str, target: &str, text: &str) -> Result<(), DirectoryError> {
        if !self.users.contains_key(sender) {
            return Err(DirectoryError::UnknownUser(sender.to_string()));
        }
        check_message_len(sender, text)?;
        validate_username(target)?;

        let (recipient, notification) = if self.users.contains_key(target) {
            (target, Notification::told(sender, text))
        } else {
            (sender, Notification::no_such_user(target))
        };

        if let Some(mailbox) = self.users.get_mut(recipient) {
            mailbox.deliver(notification);
        }
        Ok(())
    }

    /// Deliver `text` from `sender` to every online user, sender included.
    ///
    /// The sender need not be online, but must be a valid username.
    /// Returns the number of mailboxes written.
    pub fn broadcast(&mut self, sender: &str, text: &str) -> Result<usize, DirectoryError> {
        validate_username(sender)?;
        check_message_len(sender, text)?;

        let notification = Notification::said(sender, text);
        for mailbox in self.users.values_mut() {
            mailbox.deliver(notification.clone());
        }
        Ok(self.users.len())
    }

    /// Take `username` offline and tell everybody left.
    ///
    /// Logging out a user who is not online is a no-op. Returns whether
    /// the user was actually removed.
    pub fn logout(&mut self, username: &str) -> bool {
        if self.users.shift_remove(username).is_none() {
            return false;
        }

        for mailbox in self.users.values_mut() {
            mailbox.deliver(Notification::logged_out(username));
        }
        true
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn is_online(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Number of users online.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Number of notifications waiting for `username`, if online.
    pub fn pending(&self, username: &str) -> Option<usize> {
        self.users.get(username).map(Mailbox::len)
    }
}

fn check_message_len(sender: &str, text: &str) -> Result<(), DirectoryError> {
    if text.len() > MAX_MESSAGE_LEN {
        return Err(DirectoryError::MessageTooLong(sender.to_string()));
    }
    Ok(())
}
