//! chat-core
//!
//! Pure chat directory logic:
//! - usernames and their validation rules
//! - notifications (the lines that land in a mailbox)
//! - messages (request/response types)
//! - the directory state machine (roster + mailboxes)

pub mod error;
pub mod username;
pub mod notification;
pub mod mailbox;
pub mod messages;
pub mod directory;

pub use error::DirectoryError;
pub use username::{validate_username, MAX_USERNAME_LEN};
pub use notification::{Notification, MAX_MESSAGE_LEN};
pub use mailbox::{Mailbox, MAX_DRAIN_BATCH};

pub use messages::{
    Broadcast,
    Request,
    Response,
    Tell,
    Welcome,
};

pub use directory::{Directory, GREETING};
