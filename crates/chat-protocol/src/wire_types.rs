//! Low-level wire types and constants.
//!
//! This module defines:
//! - Message type IDs for requests and responses.
//! - Notification kind and fault code IDs.
//! - Protocol versioning and field limits.
//!
//! The actual encode/decode logic lives in `binary_codec`.

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Longest name field a request may carry (one-byte length prefix).
///
/// This is deliberately looser than `chat_core::MAX_USERNAME_LEN`:
/// a malformed name must still reach the directory so it can be
/// rejected with a proper `InvalidUser` fault.
pub const MAX_NAME_FIELD_LEN: usize = u8::MAX as usize;

/// Longest free-text field (two-byte length prefix).
pub const MAX_TEXT_LEN: usize = u16::MAX as usize;

/// Longest list (usernames, notifications) in one response.
pub const MAX_LIST_LEN: usize = u16::MAX as usize;

/// Request types (client → server).
///
/// These IDs are used in the first byte of each payload.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireRequestType {
    Register = 0,
    Drain = 1,
    ListOnline = 2,
    Tell = 3,
    Broadcast = 4,
    Logout = 5,
    Shutdown = 6,
}

impl WireRequestType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(WireRequestType::Register),
            1 => Some(WireRequestType::Drain),
            2 => Some(WireRequestType::ListOnline),
            3 => Some(WireRequestType::Tell),
            4 => Some(WireRequestType::Broadcast),
            5 => Some(WireRequestType::Logout),
            6 => Some(WireRequestType::Shutdown),
            _ => None,
        }
    }
}

/// Response types (server → client).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireResponseType {
    Welcome = 10,
    Notifications = 11,
    Roster = 12,
    Ack = 13,
    Fault = 14,
}

impl WireResponseType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            10 => Some(WireResponseType::Welcome),
            11 => Some(WireResponseType::Notifications),
            12 => Some(WireResponseType::Roster),
            13 => Some(WireResponseType::Ack),
            14 => Some(WireResponseType::Fault),
            _ => None,
        }
    }
}

/// Notification kinds inside a `Notifications` response.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireNotificationKind {
    Joined = 0,
    LoggedOut = 1,
    Told = 2,
    Said = 3,
    NoSuchUser = 4,
    System = 5,
}

impl WireNotificationKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(WireNotificationKind::Joined),
            1 => Some(WireNotificationKind::LoggedOut),
            2 => Some(WireNotificationKind::Told),
            3 => Some(WireNotificationKind::Said),
            4 => Some(WireNotificationKind::NoSuchUser),
            5 => Some(WireNotificationKind::System),
            _ => None,
        }
    }
}

/// Fault codes inside a `Fault` response.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireFaultCode {
    InvalidUser = 1,
    UnknownUser = 2,
    AlreadyRegistered = 3,
    MessageTooLong = 4,
}

impl WireFaultCode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(WireFaultCode::InvalidUser),
            2 => Some(WireFaultCode::UnknownUser),
            3 => Some(WireFaultCode::AlreadyRegistered),
            4 => Some(WireFaultCode::MessageTooLong),
            _ => None,
        }
    }
}
