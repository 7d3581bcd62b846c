// crates/chat-client/src/session.rs

//! Typed calls for one logged-in user, and the mailbox poller.
//!
//! The interactive loop and the poller share one connection behind a
//! mutex, so each request/response pair goes over the wire intact.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{
    Broadcast, DirectoryError, Notification, Request, Response, Tell, Welcome, MAX_DRAIN_BATCH,
};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::network::ChatConnection;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The server answered with a directory fault.
    #[error("server refused the request: {0}")]
    Fault(#[from] DirectoryError),

    #[error("unexpected response to {0}")]
    Unexpected(&'static str),

    /// Transport failure; the session is unusable.
    #[error(transparent)]
    Connection(#[from] anyhow::Error),
}

/// A user's view of the server.
#[derive(Clone)]
pub struct Session {
    username: String,
    conn: Arc<Mutex<ChatConnection>>,
}

impl Session {
    pub fn new(username: &str, conn: ChatConnection) -> Self {
        Self {
            username: username.to_string(),
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    async fn call(&self, request: Request) -> Result<Response, SessionError> {
        let mut conn = self.conn.lock().await;
        match conn.call(&request).await? {
            Response::Fault(err) => Err(SessionError::Fault(err)),
            response => Ok(response),
        }
    }

    async fn expect_ack(&self, request: Request, op: &'static str) -> Result<(), SessionError> {
        match self.call(request).await? {
            Response::Ack => Ok(()),
            _ => Err(SessionError::Unexpected(op)),
        }
    }

    pub async fn register(&self) -> Result<Welcome, SessionError> {
        let request = Request::Register {
            username: self.username.clone(),
        };
        match self.call(request).await? {
            Response::Welcome(welcome) => Ok(welcome),
            _ => Err(SessionError::Unexpected("register")),
        }
    }

    pub async fn drain(&self) -> Result<Vec<Notification>, SessionError> {
        let request = Request::Drain {
            username: self.username.clone(),
        };
        match self.call(request).await? {
            Response::Notifications(notifications) => Ok(notifications),
            _ => Err(SessionError::Unexpected("drain")),
        }
    }

    pub async fn list(&self) -> Result<Vec<String>, SessionError> {
        match self.call(Request::ListOnline).await? {
            Response::Roster(roster) => Ok(roster),
            _ => Err(SessionError::Unexpected("list")),
        }
    }

    pub async fn tell(&self, target: &str, text: &str) -> Result<(), SessionError> {
        let request = Request::Tell(Tell {
            sender: self.username.clone(),
            target: target.to_string(),
            text: text.to_string(),
        });
        self.expect_ack(request, "tell").await
    }

    pub async fn say(&self, text: &str) -> Result<(), SessionError> {
        let request = Request::Broadcast(Broadcast {
            sender: self.username.clone(),
            text: text.to_string(),
        });
        self.expect_ack(request, "say").await
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        let request = Request::Logout {
            username: self.username.clone(),
        };
        self.expect_ack(request, "logout").await
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.expect_ack(Request::Shutdown, "shutdown").await
    }
}

/// Why the poller stopped.
#[derive(Debug)]
pub enum PollEnd {
    /// Asked to stop by the interactive loop.
    Stopped,
    /// A drain failed: the user is gone or the server is.
    SessionEnded(SessionError),
}

/// Drain the mailbox every `period` and hand each notification to
/// `deliver`, oldest first, until told to stop or a drain fails.
///
/// A full batch means more is queued, so the poller drains again
/// straight away instead of waiting for the next tick.
pub async fn run_poller<F>(
    session: Session,
    period: Duration,
    mut stop: watch::Receiver<bool>,
    mut deliver: F,
) -> PollEnd
where
    F: FnMut(Notification),
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *stop.borrow() {
            return PollEnd::Stopped;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.changed() => return PollEnd::Stopped,
        }

        loop {
            match session.drain().await {
                Ok(notifications) => {
                    let full = notifications.len() >= MAX_DRAIN_BATCH;
                    for notification in notifications {
                        deliver(notification);
                    }
                    if !full {
                        break;
                    }
                }
                Err(err) => {
                    debug!(error = %err, "drain failed, stopping poller");
                    return PollEnd::SessionEnded(err);
                }
            }
        }
    }
}
