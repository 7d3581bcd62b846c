//! chat-server
//!
//! Multi-client async TCP server for the chat directory.

pub mod config;
pub mod error;
pub mod types;
pub mod directory_task;
pub mod server;

// internal, not re-exported
mod connection;

pub use config::Config;
pub use directory_task::{spawn_directory, DirectoryHandle};
pub use error::ServerError;
pub use server::Server;
