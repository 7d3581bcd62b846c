//! Server error types.

use chat_core::DirectoryError;
use chat_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The directory task has stopped and can no longer take requests.
    #[error("directory task is no longer running")]
    DirectoryClosed,

    /// The directory answered with a per-call fault.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The directory answered with the wrong kind of response.
    #[error("unexpected {0} response from directory")]
    UnexpectedResponse(&'static str),

    /// A peer sent bytes we could not decode.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// The directory fault behind this error, if that is what it is.
    pub fn as_directory_error(&self) -> Option<&DirectoryError> {
        match self {
            ServerError::Directory(err) => Some(err),
            _ => None,
        }
    }
}
