// crates/chat-protocol/src/text_codec.rs

//! Line-oriented text codec, for netcat-style clients.
//!
//! Input format (one line → `Request`), keywords are case-insensitive:
//!
//! - `REGISTER <user>`
//! - `DRAIN <user>`
//! - `LIST`
//! - `TELL <sender> <target> <text...>`
//! - `SAY <sender> <text...>`
//! - `LOGOUT <user>`
//! - `SHUTDOWN`
//!
//! Output format (`Response` → one or more lines):
//!
//! - Ack:           `OK`
//! - Fault:         `ERR <code> <message>`
//! - Roster:        `USERS <user> <user> ...`
//! - Welcome:       `WELCOME <user> <user> ...`
//! - Notifications: `MESSAGES <n>` followed by `n` lines, one per notification
//!
//! Usernames never contain whitespace, so space-separated lists are
//! unambiguous. Message text keeps its inner spacing.

use chat_core::{Broadcast, DirectoryError, Request, Response, Tell};

/// Fault code for lines that do not parse.
pub const BAD_REQUEST: &str = "bad-request";

/// Longest request line a server reads, newline excluded. Leaves room for
/// a `TELL` carrying two full usernames and a maximum-length message.
pub const MAX_LINE_LEN: usize = 8192;

/// Parse a single text line into a `Request`.
///
/// Returns `None` for blank lines, comments (starting with `#`), and
/// anything that does not match the grammar above.
pub fn parse_request_line(line: &str) -> Option<Request> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (keyword, rest) = split_word(trimmed);

    match keyword.to_ascii_uppercase().as_str() {
        "REGISTER" => single_name(rest).map(|username| Request::Register { username }),
        "DRAIN" => single_name(rest).map(|username| Request::Drain { username }),
        "LOGOUT" => single_name(rest).map(|username| Request::Logout { username }),
        "LIST" if rest.is_empty() => Some(Request::ListOnline),
        "SHUTDOWN" if rest.is_empty() => Some(Request::Shutdown),
        "TELL" => parse_tell(rest),
        "SAY" => parse_say(rest),
        _ => None,
    }
}

fn parse_tell(rest: &str) -> Option<Request> {
    // TELL sender target text...
    let (sender, rest) = split_word(rest);
    let (target, text) = split_word(rest);
    if sender.is_empty() || target.is_empty() || text.is_empty() {
        return None;
    }

    Some(Request::Tell(Tell {
        sender: sender.to_string(),
        target: target.to_string(),
        text: text.to_string(),
    }))
}

fn parse_say(rest: &str) -> Option<Request> {
    // SAY sender text...
    let (sender, text) = split_word(rest);
    if sender.is_empty() || text.is_empty() {
        return None;
    }

    Some(Request::Broadcast(Broadcast {
        sender: sender.to_string(),
        text: text.to_string(),
    }))
}

/// Format a `Response` as text. Multi-line responses are joined with `\n`
/// and carry no trailing newline.
pub fn format_response(resp: &Response) -> String {
    match resp {
        Response::Ack => "OK".to_string(),
        Response::Fault(err) => format_fault(fault_code(err), &err.to_string()),
        Response::Roster(roster) => with_names("USERS", roster),
        Response::Welcome(welcome) => with_names("WELCOME", &welcome.roster),
        Response::Notifications(notifications) => {
            let mut lines = Vec::with_capacity(notifications.len() + 1);
            lines.push(format!("MESSAGES {}", notifications.len()));
            for notification in notifications {
                lines.push(single_line(&notification.to_string()));
            }
            lines.join("\n")
        }
    }
}

/// `ERR <code> <message>`
pub fn format_fault(code: &str, message: &str) -> String {
    format!("ERR {} {}", code, single_line(message))
}

/// Stable text code for a directory fault.
pub fn fault_code(err: &DirectoryError) -> &'static str {
    match err {
        DirectoryError::InvalidUser(_) => "invalid-user",
        DirectoryError::UnknownUser(_) => "unknown-user",
        DirectoryError::AlreadyRegistered(_) => "already-registered",
        DirectoryError::MessageTooLong(_) => "message-too-long",
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// Split off the first whitespace-delimited word; the remainder is
/// returned with leading whitespace removed.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn single_name(rest: &str) -> Option<String> {
    let (name, extra) = split_word(rest);
    if name.is_empty() || !extra.is_empty() {
        return None;
    }
    Some(name.to_string())
}

fn with_names(keyword: &str, names: &[String]) -> String {
    if names.is_empty() {
        keyword.to_string()
    } else {
        format!("{} {}", keyword, names.join(" "))
    }
}

/// Text clients read line by line, so embedded line breaks are flattened.
fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
