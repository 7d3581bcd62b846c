//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, up to `max_clients` at a time.
//! - Assigns each connection a `ClientId`.
//! - Spawns:
//!   - a per-connection task to handle I/O,
//!   - a single central directory task that owns `Directory`.
//! - Stops accepting once the shutdown flag goes up, waits for the
//!   connection tasks to wind down, then lets the directory task exit.
//!
//! The actual per-connection logic and directory loop live in
//! `connection` and `directory_task` respectively.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connection;
use crate::directory_task::spawn_directory;
use crate::error::ServerError;
use crate::types::ClientId;

/// Counter for assigning unique `ClientId`s. `0` is reserved for
/// in-process callers.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    ClientId(id)
}

/// A bound, not yet running, chat server.
pub struct Server {
    listener: TcpListener,
    config: Config,
}

impl Server {
    /// Bind the configured address. Failing here is fatal for the process.
    pub async fn bind(config: Config) -> Result<Self, ServerError> {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr).await?;
        Ok(Server { listener, config })
    }

    /// Wrap an already bound listener. `config.bind_addr` / `port` are ignored.
    pub fn from_listener(listener: TcpListener, config: Config) -> Self {
        Server { listener, config }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until a client sends `Shutdown`.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until a client sends `Shutdown` or `external` completes,
    /// whichever happens first.
    pub async fn run_until<F>(self, external: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, config } = self;
        info!("listening on {}", listener.local_addr()?);

        let (directory, mut shutdown, directory_task) = spawn_directory();
        let mut connections: JoinSet<()> = JoinSet::new();
        tokio::pin!(external);

        loop {
            tokio::select! {
                _ = &mut external => {
                    info!("shutdown signal received");
                    // Route through the directory so connections see the same flag.
                    directory.shutdown().await?;
                    break;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(err) = joined {
                        warn!(error = %err, "connection task panicked");
                    }
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!(error = %err, "failed to accept connection");
                            continue;
                        }
                    };

                    // Reap finished connections so they don't hold a slot.
                    while let Some(joined) = connections.try_join_next() {
                        if let Err(err) = joined {
                            warn!(error = %err, "connection task panicked");
                        }
                    }

                    if connections.len() >= config.max_clients {
                        warn!(
                            %peer_addr,
                            max_clients = config.max_clients,
                            "rejecting connection: max_clients reached"
                        );
                        // Just drop the stream; client will see connection closed.
                        continue;
                    }

                    let client_id = next_client_id();
                    info!(client = %client_id, %peer_addr, "accepted connection");

                    let handle = directory.with_client(client_id);
                    let shutdown = shutdown.clone();
                    connections.spawn(async move {
                        match connection::run_connection(client_id, stream, handle, shutdown).await {
                            Ok(()) => debug!(client = %client_id, "connection closed"),
                            Err(err) => warn!(client = %client_id, error = %err, "connection closed with error"),
                        }
                    });
                }
            }
        }

        info!("no longer accepting connections");
        drop(listener);

        while let Some(joined) = connections.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "connection task panicked");
            }
        }

        drop(directory);
        if let Err(err) = directory_task.await {
            warn!(error = %err, "directory task panicked");
        }

        info!("server shutdown... goodbye");
        Ok(())
    }
}
