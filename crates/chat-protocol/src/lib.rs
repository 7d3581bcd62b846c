//! chat-protocol
//!
//! Wire-level encoding/decoding for the chat directory.
//!
//! This crate is responsible for turning logical directory messages
//! (`chat_core::Request` / `Response`) into bytes and back again.
//!
//! - [`binary_codec`] : binary payloads (what the CLI client speaks)
//! - [`frame`]        : length-prefix framing for a TCP byte stream
//! - [`text_codec`]   : line-based text (for netcat / manual poking)

pub mod wire_types;
pub mod binary_codec;
pub mod frame;
pub mod text_codec;

pub use binary_codec::{
    ProtocolError,
    decode_request,
    encode_request,
    decode_response,
    encode_response,
};

pub use frame::{decode_frame, encode_frame, MAX_FRAME_LEN};
