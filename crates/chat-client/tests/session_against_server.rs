// crates/chat-client/tests/session_against_server.rs
//
// Drive the client library against an in-process server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use chat_client::{run_poller, ChatConnection, PollEnd, Session, SessionError};
use chat_core::{DirectoryError, Notification, MAX_DRAIN_BATCH, MAX_MESSAGE_LEN};
use chat_server::{Config, Server, ServerError};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(2);

async fn start_server() -> Result<(SocketAddr, JoinHandle<Result<(), ServerError>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = Server::from_listener(listener, Config::default());
    let addr = server.local_addr()?;
    Ok((addr, tokio::spawn(server.run())))
}

async fn session(addr: SocketAddr, name: &str) -> Result<Session> {
    let conn = ChatConnection::connect(&addr.to_string()).await?;
    Ok(Session::new(name, conn))
}

#[tokio::test]
async fn chat_between_two_sessions() -> Result<()> {
    let (addr, server) = start_server().await?;

    let alice = session(addr, "alice").await?;
    let bob = session(addr, "bob").await?;

    assert_eq!(alice.register().await?.roster, vec!["alice"]);
    assert_eq!(bob.register().await?.roster, vec!["alice", "bob"]);

    bob.tell("alice", "hi alice").await?;
    alice.say("hello room").await?;
    alice.tell("nobody", "?").await?;

    let lines: Vec<String> = alice.drain().await?.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "bob has joined.",
            "bob tells you hi alice",
            "alice says hello room",
            "nobody does not exist",
        ]
    );
    assert_eq!(bob.drain().await?, vec![Notification::said("alice", "hello room")]);

    assert_eq!(bob.list().await?, vec!["alice", "bob"]);

    alice.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}

#[tokio::test]
async fn duplicate_register_is_a_fault() -> Result<()> {
    let (addr, server) = start_server().await?;

    let first = session(addr, "carol").await?;
    let second = session(addr, "carol").await?;
    first.register().await?;

    match second.register().await {
        Err(SessionError::Fault(DirectoryError::AlreadyRegistered(name))) => {
            assert_eq!(name, "carol")
        }
        other => panic!("expected AlreadyRegistered, got {other:?}"),
    }

    first.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}

#[tokio::test]
async fn poller_delivers_then_stops_after_logout() -> Result<()> {
    let (addr, server) = start_server().await?;

    let dana = session(addr, "dana").await?;
    let eli = session(addr, "eli").await?;
    dana.register().await?;
    eli.register().await?;

    let (_stop_tx, stop_rx) = watch::channel(false);
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let poller = tokio::spawn(run_poller(
        dana.clone(),
        Duration::from_millis(20),
        stop_rx,
        move |n| {
            let _ = seen_tx.send(n);
        },
    ));

    eli.tell("dana", "ping").await?;

    assert_eq!(
        timeout(STEP, seen_rx.recv()).await?,
        Some(Notification::joined("eli"))
    );
    assert_eq!(
        timeout(STEP, seen_rx.recv()).await?,
        Some(Notification::told("eli", "ping"))
    );

    // Once dana is logged out the next drain faults and the poller ends.
    dana.logout().await?;
    match timeout(STEP, poller).await?? {
        PollEnd::SessionEnded(SessionError::Fault(DirectoryError::UnknownUser(name))) => {
            assert_eq!(name, "dana")
        }
        other => panic!("poller ended unexpectedly: {other:?}"),
    }

    eli.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}

#[tokio::test]
async fn poller_honours_stop_signal() -> Result<()> {
    let (addr, server) = start_server().await?;

    let fay = session(addr, "fay").await?;
    fay.register().await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = tokio::spawn(run_poller(
        fay.clone(),
        Duration::from_millis(20),
        stop_rx,
        |_| {},
    ));

    stop_tx.send_replace(true);
    assert!(matches!(timeout(STEP, poller).await??, PollEnd::Stopped));

    fay.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}

#[tokio::test]
async fn poller_catches_up_on_a_backlog_within_one_tick() -> Result<()> {
    let (addr, server) = start_server().await?;

    let gus = session(addr, "gus").await?;
    let hal = session(addr, "hal").await?;
    gus.register().await?;
    hal.register().await?;

    let backlog = MAX_DRAIN_BATCH + 3;
    for i in 0..backlog {
        hal.tell("gus", &i.to_string()).await?;
    }

    // The first tick fires at once; the next one is far beyond the timeout.
    let (stop_tx, stop_rx) = watch::channel(false);
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let poller = tokio::spawn(run_poller(
        gus.clone(),
        Duration::from_secs(60),
        stop_rx,
        move |n| {
            let _ = seen_tx.send(n);
        },
    ));

    assert_eq!(
        timeout(STEP, seen_rx.recv()).await?,
        Some(Notification::joined("hal"))
    );
    for i in 0..backlog {
        assert_eq!(
            timeout(STEP, seen_rx.recv()).await?,
            Some(Notification::told("hal", i.to_string()))
        );
    }

    stop_tx.send_replace(true);
    assert!(matches!(timeout(STEP, poller).await??, PollEnd::Stopped));

    gus.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}

#[tokio::test]
async fn oversized_message_is_refused_and_session_survives() -> Result<()> {
    let (addr, server) = start_server().await?;

    let ivy = session(addr, "ivy").await?;
    ivy.register().await?;

    match ivy.say(&"x".repeat(MAX_MESSAGE_LEN + 1)).await {
        Err(SessionError::Fault(DirectoryError::MessageTooLong(name))) => assert_eq!(name, "ivy"),
        other => panic!("expected MessageTooLong, got {other:?}"),
    }

    ivy.say("short").await?;
    assert_eq!(ivy.drain().await?, vec![Notification::said("ivy", "short")]);

    ivy.shutdown().await?;
    timeout(STEP, server).await???;
    Ok(())
}
