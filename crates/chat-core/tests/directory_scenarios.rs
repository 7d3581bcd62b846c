// crates/chat-core/tests/directory_scenarios.rs
use std::collections::HashSet;

use chat_core::{Broadcast, Directory, DirectoryError, Notification, Request, Response, Tell};

/// Scripted session: each line is one request, replayed in order.
fn replay(directory: &mut Directory, script: &[Request]) -> Vec<Response> {
    script
        .iter()
        .cloned()
        .map(|req| directory.process_request(req))
        .collect()
}

fn register(name: &str) -> Request {
    Request::Register {
        username: name.to_string(),
    }
}

fn logout(name: &str) -> Request {
    Request::Logout {
        username: name.to_string(),
    }
}

fn drain_text(directory: &mut Directory, name: &str) -> Vec<String> {
    directory
        .drain(name)
        .expect("user should be online")
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn roster_and_mailboxes_stay_consistent_through_churn() {
    let mut directory = Directory::new();
    let names = ["ann", "ben", "cat", "dan", "eve"];

    // Interleave registrations and logouts, checking after every step that
    // the roster and the set of drainable users are the same set.
    let script: Vec<Request> = vec![
        register("ann"),
        register("ben"),
        logout("ann"),
        register("cat"),
        register("ann"),
        logout("zed"),
        register("dan"),
        logout("ben"),
        logout("ben"),
        register("eve"),
        logout("cat"),
    ];

    for request in script {
        directory.process_request(request);

        let roster: HashSet<String> = directory.list_online().into_iter().collect();
        let with_mailbox: HashSet<String> = names
            .iter()
            .filter(|n| directory.pending(n).is_some())
            .map(|n| n.to_string())
            .collect();

        assert_eq!(roster, with_mailbox);
        assert_eq!(roster.len(), directory.len());
    }

    assert_eq!(directory.list_online(), vec!["ann", "dan", "eve"]);
}

#[test]
fn join_visibility_between_two_users() {
    let mut directory = Directory::new();
    directory.register("alice").unwrap();

    let welcome = directory.register("bob").unwrap();
    assert!(welcome.roster.contains(&"bob".to_string()));

    assert_eq!(drain_text(&mut directory, "alice"), vec!["bob has joined."]);
    assert!(drain_text(&mut directory, "bob").is_empty());
}

#[test]
fn broadcast_reaches_everyone_exactly_once() {
    let mut directory = Directory::new();
    for name in ["alice", "bob", "carol"] {
        directory.register(name).unwrap();
    }
    for name in ["alice", "bob", "carol"] {
        directory.drain(name).unwrap();
    }

    let responses = replay(
        &mut directory,
        &[Request::Broadcast(Broadcast {
            sender: "alice".into(),
            text: "hi".into(),
        })],
    );
    assert_eq!(responses, vec![Response::Ack]);

    for name in ["alice", "bob", "carol"] {
        let lines = drain_text(&mut directory, name);
        assert_eq!(
            lines.iter().filter(|l| l.contains("alice says hi")).count(),
            1,
            "{name} should see the broadcast once"
        );
    }
}

#[test]
fn misdirected_tell_only_touches_sender() {
    let mut directory = Directory::new();
    directory.register("alice").unwrap();
    directory.register("bob").unwrap();
    directory.drain("alice").unwrap();

    let responses = replay(
        &mut directory,
        &[Request::Tell(Tell {
            sender: "alice".into(),
            target: "ghost".into(),
            text: "x".into(),
        })],
    );
    assert_eq!(responses, vec![Response::Ack]);

    assert_eq!(drain_text(&mut directory, "alice"), vec!["ghost does not exist"]);
    assert!(drain_text(&mut directory, "bob").is_empty());
}

#[test]
fn drain_twice_yields_everything_then_nothing() {
    let mut directory = Directory::new();
    directory.register("alice").unwrap();
    directory.register("bob").unwrap();
    directory.drain("alice").unwrap();

    for i in 0..5 {
        directory.tell("bob", "alice", &format!("msg {i}")).unwrap();
    }

    let first = directory.drain("alice").unwrap();
    let second = directory.drain("alice").unwrap();

    let expected: Vec<Notification> = (0..5)
        .map(|i| Notification::told("bob", format!("msg {i}")))
        .collect();
    assert_eq!(first, expected);
    assert!(second.is_empty());
}

#[test]
fn mailbox_order_follows_operation_order() {
    let mut directory = Directory::new();
    directory.register("alice").unwrap();
    directory.register("bob").unwrap();
    directory.register("carol").unwrap();
    directory.tell("bob", "alice", "first").unwrap();
    directory.broadcast("carol", "second").unwrap();
    directory.logout("bob");

    assert_eq!(
        drain_text(&mut directory, "alice"),
        vec![
            "bob has joined.",
            "carol has joined.",
            "bob tells you first",
            "carol says second",
            "bob has logged out.",
        ]
    );
}

#[test]
fn logout_of_absent_user_changes_nothing() {
    let mut directory = Directory::new();
    directory.register("alice").unwrap();
    directory.drain("alice").unwrap();

    let responses = replay(&mut directory, &[logout("bob")]);
    assert_eq!(responses, vec![Response::Ack]);

    assert_eq!(directory.list_online(), vec!["alice"]);
    assert_eq!(directory.pending("alice"), Some(0));
}

#[test]
fn faults_leave_directory_usable() {
    let mut directory = Directory::new();

    let responses = replay(
        &mut directory,
        &[
            register(""),
            register("alice"),
            register("alice"),
            Request::Drain {
                username: "nobody".into(),
            },
            Request::ListOnline,
        ],
    );

    assert_eq!(
        responses[0],
        Response::Fault(DirectoryError::InvalidUser(String::new()))
    );
    assert!(matches!(responses[1], Response::Welcome(_)));
    assert_eq!(
        responses[2],
        Response::Fault(DirectoryError::AlreadyRegistered("alice".into()))
    );
    assert_eq!(
        responses[3],
        Response::Fault(DirectoryError::UnknownUser("nobody".into()))
    );
    assert_eq!(responses[4], Response::Roster(vec!["alice".into()]));
}
