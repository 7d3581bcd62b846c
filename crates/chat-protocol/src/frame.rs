//! Length-prefix framing for binary payloads on a byte stream.
//!
//! ```text
//! [0..4] : payload length (u32 BE, 1..=MAX_FRAME_LEN)
//! [4..]  : payload (see `binary_codec`)
//! ```
//!
//! The first byte of every frame is the high byte of the length prefix,
//! which is always zero for frames under 16 MiB. The server relies on
//! that to tell binary peers apart from text peers.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chat_core::{Request, Response};

use crate::binary_codec::{encode_request, encode_response, ProtocolError};

/// Size of the length prefix.
pub const LEN_PREFIX: usize = 4;

/// Largest payload accepted in one frame (1 MiB).
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Append `payload` to `dst` with its length prefix.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<(), ProtocolError> {
    if payload.is_empty() || payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::InvalidFrameLength(payload.len()));
    }

    dst.reserve(LEN_PREFIX + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.extend_from_slice(payload);
    Ok(())
}

/// Split one complete frame off the front of `src`.
///
/// Returns `Ok(None)` when more bytes are needed; `src` is left
/// untouched in that case. The returned bytes are the payload only.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Bytes>, ProtocolError> {
    if src.len() < LEN_PREFIX {
        return Ok(None);
    }

    let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(ProtocolError::InvalidFrameLength(len));
    }

    if src.len() < LEN_PREFIX + len {
        src.reserve(LEN_PREFIX + len - src.len());
        return Ok(None);
    }

    src.advance(LEN_PREFIX);
    Ok(Some(src.split_to(len).freeze()))
}

/// Encode `req` and append it to `dst` as one frame.
pub fn frame_request(req: &Request, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    let mut payload = Vec::with_capacity(64);
    encode_request(req, &mut payload)?;
    encode_frame(&payload, dst)
}

/// Encode `resp` and append it to `dst` as one frame.
pub fn frame_response(resp: &Response, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    let mut payload = Vec::with_capacity(128);
    encode_response(resp, &mut payload)?;
    encode_frame(&payload, dst)
}
