//! Binary encoding/decoding for chat-core messages.
//!
//! This module converts between:
//! - raw binary payloads (`&[u8]`)
//! - high-level `chat_core::Request` / `Response`
//!
//! Payload layout:
//!
//! ```text
//! Common header
//! -------------
//! [0]   : msg_type (WireRequestType / WireResponseType as u8)
//! [1]   : version  (PROTOCOL_VERSION)
//! [2..4]: reserved = 0
//! [4..] : body (depends on msg_type)
//!
//! Field encodings
//! ---------------
//! name : u8 length, then UTF-8 bytes (0..=255)
//! text : u16 BE length, then UTF-8 bytes
//! list : u16 BE count, then items
//!
//! Requests (client → server)
//! --------------------------
//! Register (0)   : name username
//! Drain (1)      : name username
//! ListOnline (2) : [no body]
//! Tell (3)       : name sender, name target, text text
//! Broadcast (4)  : name sender, text text
//! Logout (5)     : name username
//! Shutdown (6)   : [no body]
//!
//! Responses (server → client)
//! ---------------------------
//! Welcome (10)       : text greeting, list<name> roster
//! Notifications (11) : list<notification>
//! Roster (12)        : list<name>
//! Ack (13)           : [no body]
//! Fault (14)         : u8 fault code, text username
//!
//! notification = u8 kind, then:
//!   Joined / LoggedOut : text user
//!   Told / Said        : text sender, text text
//!   NoSuchUser         : text target
//!   System             : text text
//! ```
//!
//! NOTE: This module encodes/decodes **one message per buffer**. Use
//! [`crate::frame`] to carry payloads over a byte stream.

use chat_core::{Broadcast, DirectoryError, Notification, Request, Response, Tell, Welcome};
use thiserror::Error;

use crate::wire_types::{
    WireFaultCode, WireNotificationKind, WireRequestType, WireResponseType, MAX_LIST_LEN,
    MAX_NAME_FIELD_LEN, MAX_TEXT_LEN, PROTOCOL_VERSION,
};

/// Errors that can arise when encoding/decoding a payload or frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    #[error("buffer truncated")]
    Truncated,

    /// Unknown or unsupported message type.
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),

    /// Unsupported or mismatched protocol version.
    #[error("protocol version mismatch: got {0}, expected {}", PROTOCOL_VERSION)]
    VersionMismatch(u8),

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    /// A field is too long for its length prefix.
    #[error("field too long: {0}")]
    FieldTooLong(&'static str),

    /// Invalid enum byte or other semantic issue.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// Bytes left over after a complete message.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// Frame length prefix is zero or over the limit.
    #[error("invalid frame length: {0}")]
    InvalidFrameLength(usize),
}

// ============================================================================
// REQUESTS: client → server
// ============================================================================

/// Encode a single request into a binary payload.
///
/// The encoded bytes are appended to `out`.
pub fn encode_request(req: &Request, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    match req {
        Request::Register { username } => {
            put_header(out, WireRequestType::Register as u8);
            put_name(out, username, "username")
        }
        Request::Drain { username } => {
            put_header(out, WireRequestType::Drain as u8);
            put_name(out, username, "username")
        }
        Request::ListOnline => {
            put_header(out, WireRequestType::ListOnline as u8);
            Ok(())
        }
        Request::Tell(tell) => {
            put_header(out, WireRequestType::Tell as u8);
            put_name(out, &tell.sender, "sender")?;
            put_name(out, &tell.target, "target")?;
            put_text(out, &tell.text, "text")
        }
        Request::Broadcast(broadcast) => {
            put_header(out, WireRequestType::Broadcast as u8);
            put_name(out, &broadcast.sender, "sender")?;
            put_text(out, &broadcast.text, "text")
        }
        Request::Logout { username } => {
            put_header(out, WireRequestType::Logout as u8);
            put_name(out, username, "username")
        }
        Request::Shutdown => {
            put_header(out, WireRequestType::Shutdown as u8);
            Ok(())
        }
    }
}

/// Decode a single request from a binary payload.
///
/// The buffer must contain exactly one full message as described above.
pub fn decode_request(buf: &[u8]) -> Result<Request, ProtocolError> {
    let mut cursor = Cursor::new(buf);
    let msg_type = cursor.header()?;

    let wire_type =
        WireRequestType::from_u8(msg_type).ok_or(ProtocolError::UnknownMessageType(msg_type))?;

    let req = match wire_type {
        WireRequestType::Register => Request::Register {
            username: cursor.name("username")?,
        },
        WireRequestType::Drain => Request::Drain {
            username: cursor.name("username")?,
        },
        WireRequestType::ListOnline => Request::ListOnline,
        WireRequestType::Tell => Request::Tell(Tell {
            sender: cursor.name("sender")?,
            target: cursor.name("target")?,
            text: cursor.text("text")?,
        }),
        WireRequestType::Broadcast => Request::Broadcast(Broadcast {
            sender: cursor.name("sender")?,
            text: cursor.text("text")?,
        }),
        WireRequestType::Logout => Request::Logout {
            username: cursor.name("username")?,
        },
        WireRequestType::Shutdown => Request::Shutdown,
    };

    cursor.finish()?;
    Ok(req)
}

// ============================================================================
// RESPONSES: server → client
// ============================================================================

/// Encode a single response into a binary payload.
///
/// The encoded bytes are appended to `out`.
pub fn encode_response(resp: &Response, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    match resp {
        Response::Welcome(welcome) => {
            put_header(out, WireResponseType::Welcome as u8);
            put_text(out, &welcome.greeting, "greeting")?;
            put_name_list(out, &welcome.roster)
        }
        Response::Notifications(notifications) => {
            put_header(out, WireResponseType::Notifications as u8);
            put_count(out, notifications.len())?;
            for notification in notifications {
                put_notification(out, notification)?;
            }
            Ok(())
        }
        Response::Roster(roster) => {
            put_header(out, WireResponseType::Roster as u8);
            put_name_list(out, roster)
        }
        Response::Ack => {
            put_header(out, WireResponseType::Ack as u8);
            Ok(())
        }
        Response::Fault(err) => {
            put_header(out, WireResponseType::Fault as u8);
            let code = match err {
                DirectoryError::InvalidUser(_) => WireFaultCode::InvalidUser,
                DirectoryError::UnknownUser(_) => WireFaultCode::UnknownUser,
                DirectoryError::AlreadyRegistered(_) => WireFaultCode::AlreadyRegistered,
                DirectoryError::MessageTooLong(_) => WireFaultCode::MessageTooLong,
            };
            out.push(code as u8);
            put_text(out, err.username(), "username")
        }
    }
}

/// Decode a single response from a binary payload.
///
/// This is what the **client** side uses when reading from the server.
pub fn decode_response(buf: &[u8]) -> Result<Response, ProtocolError> {
    let mut cursor = Cursor::new(buf);
    let msg_type = cursor.header()?;

    let wire_type =
        WireResponseType::from_u8(msg_type).ok_or(ProtocolError::UnknownMessageType(msg_type))?;

    let resp = match wire_type {
        WireResponseType::Welcome => {
            let greeting = cursor.text("greeting")?;
            let roster = cursor.name_list()?;
            Response::Welcome(Welcome { greeting, roster })
        }
        WireResponseType::Notifications => {
            let count = cursor.u16()? as usize;
            let mut notifications = Vec::with_capacity(count);
            for _ in 0..count {
                notifications.push(cursor.notification()?);
            }
            Response::Notifications(notifications)
        }
        WireResponseType::Roster => Response::Roster(cursor.name_list()?),
        WireResponseType::Ack => Response::Ack,
        WireResponseType::Fault => {
            let code = cursor.u8()?;
            let username = cursor.text("username")?;
            let err = match WireFaultCode::from_u8(code) {
                Some(WireFaultCode::InvalidUser) => DirectoryError::InvalidUser(username),
                Some(WireFaultCode::UnknownUser) => DirectoryError::UnknownUser(username),
                Some(WireFaultCode::AlreadyRegistered) => {
                    DirectoryError::AlreadyRegistered(username)
                }
                Some(WireFaultCode::MessageTooLong) => DirectoryError::MessageTooLong(username),
                None => return Err(ProtocolError::InvalidField("fault code")),
            };
            Response::Fault(err)
        }
    };

    cursor.finish()?;
    Ok(resp)
}

fn put_notification(out: &mut Vec<u8>, notification: &Notification) -> Result<(), ProtocolError> {
    match notification {
        Notification::Joined { user } => {
            out.push(WireNotificationKind::Joined as u8);
            put_text(out, user, "user")
        }
        Notification::LoggedOut { user } => {
            out.push(WireNotificationKind::LoggedOut as u8);
            put_text(out, user, "user")
        }
        Notification::Told { sender, text } => {
            out.push(WireNotificationKind::Told as u8);
            put_text(out, sender, "sender")?;
            put_text(out, text, "text")
        }
        Notification::Said { sender, text } => {
            out.push(WireNotificationKind::Said as u8);
            put_text(out, sender, "sender")?;
            put_text(out, text, "text")
        }
        Notification::NoSuchUser { target } => {
            out.push(WireNotificationKind::NoSuchUser as u8);
            put_text(out, target, "target")
        }
        Notification::System(text) => {
            out.push(WireNotificationKind::System as u8);
            put_text(out, text, "text")
        }
    }
}

// -----------------------------------------------------------------------------
// Encode helpers
// -----------------------------------------------------------------------------

fn put_header(out: &mut Vec<u8>, msg_type: u8) {
    out.push(msg_type);
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&[0, 0]); // reserved
}

fn put_name(out: &mut Vec<u8>, value: &str, field: &'static str) -> Result<(), ProtocolError> {
    let bytes = value.as_bytes();
    if bytes.len() > MAX_NAME_FIELD_LEN {
        return Err(ProtocolError::FieldTooLong(field));
    }

    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    Ok(())
}

fn put_text(out: &mut Vec<u8>, value: &str, field: &'static str) -> Result<(), ProtocolError> {
    let bytes = value.as_bytes();
    if bytes.len() > MAX_TEXT_LEN {
        return Err(ProtocolError::FieldTooLong(field));
    }

    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn put_count(out: &mut Vec<u8>, count: usize) -> Result<(), ProtocolError> {
    if count > MAX_LIST_LEN {
        return Err(ProtocolError::FieldTooLong("list"));
    }
    out.extend_from_slice(&(count as u16).to_be_bytes());
    Ok(())
}

fn put_name_list(out: &mut Vec<u8>, names: &[String]) -> Result<(), ProtocolError> {
    put_count(out, names.len())?;
    for name in names {
        put_name(out, name, "roster entry")?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Decode helpers
// -----------------------------------------------------------------------------

/// Forward-only reader over one payload.
struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, offset: 0 }
    }

    /// Validate the 4-byte header and return the message type.
    fn header(&mut self) -> Result<u8, ProtocolError> {
        let header = self.take(4)?;
        let (msg_type, version) = (header[0], header[1]);

        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::VersionMismatch(version));
        }
        Ok(msg_type)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(ProtocolError::Truncated)?;

        let bytes = &self.buf[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn string(&mut self, len: usize, field: &'static str) -> Result<String, ProtocolError> {
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| ProtocolError::InvalidUtf8(field))
    }

    fn name(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        let len = self.u8()? as usize;
        self.string(len, field)
    }

    fn text(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        let len = self.u16()? as usize;
        self.string(len, field)
    }

    fn name_list(&mut self) -> Result<Vec<String>, ProtocolError> {
        let count = self.u16()? as usize;
        (0..count).map(|_| self.name("roster entry")).collect()
    }

    fn notification(&mut self) -> Result<Notification, ProtocolError> {
        let kind = self.u8()?;
        let kind = WireNotificationKind::from_u8(kind)
            .ok_or(ProtocolError::InvalidField("notification kind"))?;

        let notification = match kind {
            WireNotificationKind::Joined => Notification::Joined {
                user: self.text("user")?,
            },
            WireNotificationKind::LoggedOut => Notification::LoggedOut {
                user: self.text("user")?,
            },
            WireNotificationKind::Told => Notification::Told {
                sender: self.text("sender")?,
                text: self.text("text")?,
            },
            WireNotificationKind::Said => Notification::Said {
                sender: self.text("sender")?,
                text: self.text("text")?,
            },
            WireNotificationKind::NoSuchUser => Notification::NoSuchUser {
                target: self.text("target")?,
            },
            WireNotificationKind::System => Notification::System(self.text("text")?),
        };
        Ok(notification)
    }

    fn finish(&self) -> Result<(), ProtocolError> {
        match self.buf.len() - self.offset {
            0 => Ok(()),
            extra => Err(ProtocolError::TrailingBytes(extra)),
        }
    }
}
