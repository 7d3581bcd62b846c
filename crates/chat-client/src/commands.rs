// crates/chat-client/src/commands.rs

//! Free-text command parsing.
//!
//! | Input                | Command            |
//! |----------------------|--------------------|
//! | `list`               | list online users  |
//! | `tell <user> <msg>`  | directed message   |
//! | `say <msg>`          | broadcast          |
//! | `logout`             | log out and quit   |
//! | anything else        | shut the server down |
//!
//! Blank lines are ignored.

pub const TELL_USAGE: &str = "Usage of tell: tell <user> <msg>";
pub const SAY_USAGE: &str = "Usage of say: say <msg>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Tell { target: String, text: String },
    Say { text: String },
    Logout,
    Shutdown,
    /// Recognised command with missing arguments; print this and carry on.
    Usage(&'static str),
}

/// Parse one line typed by the user. Returns `None` for a blank line.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (keyword, rest) = split_word(line);

    let command = match keyword {
        "list" => Command::List,
        "tell" => {
            let (target, text) = split_word(rest);
            if target.is_empty() || text.is_empty() {
                Command::Usage(TELL_USAGE)
            } else {
                Command::Tell {
                    target: target.to_string(),
                    text: text.to_string(),
                }
            }
        }
        "say" => {
            if rest.is_empty() {
                Command::Usage(SAY_USAGE)
            } else {
                Command::Say {
                    text: rest.to_string(),
                }
            }
        }
        "logout" => Command::Logout,
        _ => Command::Shutdown,
    };

    Some(command)
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, ""),
    }
}
