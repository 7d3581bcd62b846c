//! Shared types for the chat TCP server.
//!
//! This module defines:
//! - `ClientId`: a lightweight handle for connected clients
//! - channel aliases between connections and the directory task
//! - `DirectoryRequest`: messages flowing from connections to the directory

use chat_core::{Request, Response};
use tokio::sync::{mpsc, oneshot, watch};

/// Identifier for a connected client.
///
/// Opaque; unique over the lifetime of the process. Only used for logs,
/// the directory itself keys everything by username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One call flowing from a connection task into the directory task.
#[derive(Debug)]
pub struct DirectoryRequest {
    pub client_id: ClientId,
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// Channel from connections → directory task.
pub type DirectoryTx = mpsc::UnboundedSender<DirectoryRequest>;
pub type DirectoryRx = mpsc::UnboundedReceiver<DirectoryRequest>;

/// Shutdown flag, flipped to `true` once by the directory task.
pub type ShutdownTx = watch::Sender<bool>;
pub type ShutdownRx = watch::Receiver<bool>;
