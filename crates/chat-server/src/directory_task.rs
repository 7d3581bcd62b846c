//! Central directory loop.
//!
//! This task owns the `Directory` instance and processes all
//! `DirectoryRequest`s coming from connections, one at a time. That
//! single queue is the consistency boundary: register, logout, and
//! every fan-out (joins, leaves, broadcasts) are totally ordered, and
//! each mailbox sees appends in that same order.
//!
//! A `Shutdown` request is acknowledged like any other call and then
//! flips the shutdown flag. The loop keeps serving whatever is still
//! queued and exits once every `DirectoryHandle` has been dropped.

use chat_core::{Broadcast, Directory, Notification, Request, Response, Tell, Welcome};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::types::{ClientId, DirectoryRequest, DirectoryRx, DirectoryTx, ShutdownRx, ShutdownTx};

/// Spawn the directory task.
///
/// Returns a handle for issuing calls, a receiver for the shutdown flag,
/// and the task's join handle.
pub fn spawn_directory() -> (DirectoryHandle, ShutdownRx, JoinHandle<()>) {
    let (directory_tx, directory_rx): (DirectoryTx, DirectoryRx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        run_directory_loop(directory_rx, shutdown_tx).await;
    });

    let handle = DirectoryHandle {
        tx: directory_tx,
        client_id: ClientId(0),
    };
    (handle, shutdown_rx, task)
}

/// Run the central directory processing loop.
///
/// - `directory_rx`: receives requests from all connection tasks.
/// - `shutdown`: flipped to `true` after a `Shutdown` request is answered.
pub async fn run_directory_loop(mut directory_rx: DirectoryRx, shutdown: ShutdownTx) {
    let mut directory = Directory::new();

    while let Some(req) = directory_rx.recv().await {
        let DirectoryRequest {
            client_id,
            request,
            reply,
        } = req;

        debug!(client = %client_id, op = request.kind(), "directory request");

        let shutdown_requested = matches!(request, Request::Shutdown);
        let subject = subject_of(&request, &directory);
        let response = directory.process_request(request);

        log_outcome(client_id, subject, &response, &directory);

        if reply.send(response).is_err() {
            debug!(client = %client_id, "client went away before the reply");
        }

        if shutdown_requested {
            info!(client = %client_id, "server shutdown requested");
            shutdown.send_replace(true);
        }
    }

    info!(online = directory.len(), "directory loop shutting down (request channel closed)");
}

/// Roster change a request may cause, captured before it is processed.
#[derive(Debug, PartialEq, Eq)]
enum Subject {
    Joining(String),
    Leaving(String),
}

fn subject_of(request: &Request, directory: &Directory) -> Option<Subject> {
    match request {
        Request::Register { username } => Some(Subject::Joining(username.clone())),
        // Only a user who is online now can actually leave.
        Request::Logout { username } if directory.is_online(username) => {
            Some(Subject::Leaving(username.clone()))
        }
        _ => None,
    }
}

fn log_outcome(
    client_id: ClientId,
    subject: Option<Subject>,
    response: &Response,
    directory: &Directory,
) {
    match (response, subject) {
        (Response::Welcome(_), Some(Subject::Joining(username))) => {
            info!(client = %client_id, online = directory.len(), "{} has joined the chat", username);
        }
        (Response::Ack, Some(Subject::Leaving(username))) => {
            info!(client = %client_id, online = directory.len(), "{} has logged out", username);
        }
        (Response::Fault(err), _) => {
            debug!(client = %client_id, error = %err, "request faulted");
        }
        _ => {}
    }
}

/// Cloneable front door to the directory task.
///
/// Every call is a round trip through the task's queue, so calls made
/// through one handle are observed in the order they were awaited.
#[derive(Debug, Clone)]
pub struct DirectoryHandle {
    tx: DirectoryTx,
    client_id: ClientId,
}

impl DirectoryHandle {
    /// A copy of this handle whose calls are attributed to `client_id`.
    pub fn with_client(&self, client_id: ClientId) -> Self {
        DirectoryHandle {
            tx: self.tx.clone(),
            client_id,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Send one raw request and wait for its response.
    pub async fn call(&self, request: Request) -> Result<Response, ServerError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(DirectoryRequest {
                client_id: self.client_id,
                request,
                reply: reply_tx,
            })
            .map_err(|_| ServerError::DirectoryClosed)?;

        reply_rx.await.map_err(|_| ServerError::DirectoryClosed)
    }

    pub async fn register(&self, username: &str) -> Result<Welcome, ServerError> {
        let request = Request::Register {
            username: username.to_string(),
        };
        match self.call(request).await? {
            Response::Welcome(welcome) => Ok(welcome),
            other => Err(unexpected(other, "register")),
        }
    }

    pub async fn drain(&self, username: &str) -> Result<Vec<Notification>, ServerError> {
        let request = Request::Drain {
            username: username.to_string(),
        };
        match self.call(request).await? {
            Response::Notifications(notifications) => Ok(notifications),
            other => Err(unexpected(other, "drain")),
        }
    }

    pub async fn list_online(&self) -> Result<Vec<String>, ServerError> {
        match self.call(Request::ListOnline).await? {
            Response::Roster(roster) => Ok(roster),
            other => Err(unexpected(other, "list")),
        }
    }

    pub async fn tell(&self, sender: &str, target: &str, text: &str) -> Result<(), ServerError> {
        let request = Request::Tell(Tell {
            sender: sender.to_string(),
            target: target.to_string(),
            text: text.to_string(),
        });
        self.expect_ack(request, "tell").await
    }

    pub async fn broadcast(&self, sender: &str, text: &str) -> Result<(), ServerError> {
        let request = Request::Broadcast(Broadcast {
            sender: sender.to_string(),
            text: text.to_string(),
        });
        self.expect_ack(request, "broadcast").await
    }

    pub async fn logout(&self, username: &str) -> Result<(), ServerError> {
        let request = Request::Logout {
            username: username.to_string(),
        };
        self.expect_ack(request, "logout").await
    }

    /// Ask the server to stop. The directory keeps answering until the
    /// last handle is dropped.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.expect_ack(Request::Shutdown, "shutdown").await
    }

    async fn expect_ack(&self, request: Request, op: &'static str) -> Result<(), ServerError> {
        match self.call(request).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected(other, op)),
        }
    }
}

/// Faults become `ServerError::Directory`; anything else is a mismatch.
fn unexpected(response: Response, op: &'static str) -> ServerError {
    match response {
        Response::Fault(err) => ServerError::Directory(err),
        _ => ServerError::UnexpectedResponse(op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::DirectoryError;

    #[tokio::test]
    async fn handle_round_trips_through_task() {
        let (directory, _shutdown, _task) = spawn_directory();

        let welcome = directory.register("alice").await.unwrap();
        assert_eq!(welcome.roster, vec!["alice".to_string()]);

        directory.broadcast("alice", "hi").await.unwrap();
        assert_eq!(
            directory.drain("alice").await.unwrap(),
            vec![Notification::said("alice", "hi")]
        );
    }

    #[tokio::test]
    async fn faults_surface_as_directory_errors() {
        let (directory, _shutdown, _task) = spawn_directory();

        let err = directory.drain("ghost").await.unwrap_err();
        assert_eq!(
            err.as_directory_error(),
            Some(&DirectoryError::UnknownUser("ghost".into()))
        );
    }

    #[tokio::test]
    async fn shutdown_flips_flag_but_keeps_serving() {
        let (directory, mut shutdown, _task) = spawn_directory();
        assert!(!*shutdown.borrow());

        directory.shutdown().await.unwrap();
        shutdown.changed().await.unwrap();
        assert!(*shutdown.borrow());

        // Calls already in flight, or issued by connections still draining,
        // are still answered.
        assert!(directory.list_online().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn task_exits_when_last_handle_drops() {
        let (directory, _shutdown, task) = spawn_directory();
        let other = directory.with_client(ClientId(7));
        drop(directory);
        other.register("bob").await.unwrap();
        drop(other);

        task.await.expect("directory task should finish cleanly");
    }

    #[test]
    fn only_an_online_user_can_be_logging_out() {
        let mut directory = Directory::new();
        directory.register("alice").unwrap();
        let logout = |name: &str| Request::Logout {
            username: name.to_string(),
        };

        assert_eq!(
            subject_of(&logout("alice"), &directory),
            Some(Subject::Leaving("alice".into()))
        );
        assert_eq!(subject_of(&logout("ghost"), &directory), None);

        directory.logout("alice");
        assert_eq!(subject_of(&logout("alice"), &directory), None);
    }
}
