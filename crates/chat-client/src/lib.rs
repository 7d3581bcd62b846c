//! chat-client
//!
//! Terminal client for the chat server:
//! - [`config`]   : flag-derived settings and host/port resolution
//! - [`commands`] : free-text command parsing
//! - [`network`]  : framed request/response connection
//! - [`session`]  : typed calls for one logged-in user, plus the poller

pub mod config;
pub mod commands;
pub mod network;
pub mod session;

pub use commands::{parse_command, Command};
pub use config::{resolve_address, ClientConfig};
pub use network::ChatConnection;
pub use session::{run_poller, PollEnd, Session, SessionError};
