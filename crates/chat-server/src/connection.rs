//! Per-connection I/O loop.
//!
//! Each accepted socket gets one task running [`run_connection`]. It
//! sniffs the first byte to pick a protocol, then serves requests
//! strictly one after another: read a request, hand it to the directory,
//! write the response. Pipelined requests are answered in order.
//!
//! Once the shutdown flag is up the task finishes the request it is
//! serving and closes the socket.
//!
//! Both protocols bound what they buffer: binary frames by
//! `MAX_FRAME_LEN`, text lines by `MAX_LINE_LEN`. A text peer that
//! exceeds its limit gets one `ERR bad-request` line and is dropped.

use bytes::{BufMut, BytesMut};
use chat_protocol::binary_codec::decode_request;
use chat_protocol::frame::{decode_frame, frame_response};
use chat_protocol::text_codec::{self, BAD_REQUEST, MAX_LINE_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::directory_task::DirectoryHandle;
use crate::error::ServerError;
use crate::types::{ClientId, ShutdownRx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Binary,
    Text,
}

/// Run the I/O loop for a single connection.
pub async fn run_connection(
    client_id: ClientId,
    stream: TcpStream,
    directory: DirectoryHandle,
    mut shutdown: ShutdownRx,
) -> Result<(), ServerError> {
    if *shutdown.borrow() {
        return Ok(());
    }

    // Binary frames start with the high byte of a u32 length prefix,
    // which is zero for anything we accept. Text starts with a keyword.
    let mut first_byte = [0u8; 1];
    let peeked = tokio::select! {
        peeked = stream.peek(&mut first_byte) => peeked?,
        _ = shutdown.changed() => return Ok(()),
    };
    if peeked == 0 {
        debug!(client = %client_id, "closed before sending anything");
        return Ok(());
    }

    let protocol = if first_byte[0] == 0 {
        Protocol::Binary
    } else {
        Protocol::Text
    };
    debug!(client = %client_id, ?protocol, "protocol detected");

    match protocol {
        Protocol::Binary => run_binary_session(client_id, stream, directory, shutdown).await,
        Protocol::Text => run_text_session(client_id, stream, directory, shutdown).await,
    }
}

async fn run_binary_session(
    client_id: ClientId,
    mut stream: TcpStream,
    directory: DirectoryHandle,
    mut shutdown: ShutdownRx,
) -> Result<(), ServerError> {
    let mut read_buf = BytesMut::with_capacity(4096);
    let mut write_buf = BytesMut::with_capacity(4096);

    loop {
        // Serve every complete frame already buffered.
        while let Some(payload) = decode_frame(&mut read_buf)? {
            let request = match decode_request(&payload) {
                Ok(request) => request,
                Err(err) => {
                    warn!(client = %client_id, error = %err, "undecodable request, closing");
                    return Err(err.into());
                }
            };

            let response = directory.call(request).await?;

            write_buf.clear();
            frame_response(&response, &mut write_buf)?;
            stream.write_all(&write_buf).await?;
            stream.flush().await?;

            if *shutdown.borrow() {
                return Ok(());
            }
        }

        tokio::select! {
            read = stream.read_buf(&mut read_buf) => {
                if read? == 0 {
                    debug!(client = %client_id, "peer closed connection");
                    return Ok(());
                }
            }
            _ = shutdown.changed() => return Ok(()),
        }
    }
}

async fn run_text_session(
    client_id: ClientId,
    mut stream: TcpStream,
    directory: DirectoryHandle,
    mut shutdown: ShutdownRx,
) -> Result<(), ServerError> {
    let mut read_buf = BytesMut::with_capacity(4096);

    loop {
        while let Some(line) = split_line(&mut read_buf) {
            if line.len() > MAX_LINE_LEN {
                return reject_long_line(client_id, &mut stream).await;
            }

            let line = String::from_utf8_lossy(&line);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let reply = match text_codec::parse_request_line(trimmed) {
                Some(request) => {
                    let response = directory.call(request).await?;
                    text_codec::format_response(&response)
                }
                None => {
                    debug!(client = %client_id, line = trimmed, "unparseable text request");
                    text_codec::format_fault(BAD_REQUEST, &format!("could not parse {trimmed:?}"))
                }
            };

            stream.write_all(reply.as_bytes()).await?;
            stream.write_all(b"\n").await?;
            stream.flush().await?;

            if *shutdown.borrow() {
                return Ok(());
            }
        }

        // No newline within the limit: the peer is not speaking lines.
        if read_buf.len() > MAX_LINE_LEN {
            return reject_long_line(client_id, &mut stream).await;
        }

        let read = tokio::select! {
            read = stream.read_buf(&mut read_buf) => read?,
            _ = shutdown.changed() => return Ok(()),
        };

        if read == 0 {
            if !read_buf.is_empty() {
                // Serve an unterminated last line before closing.
                read_buf.put_u8(b'\n');
                continue;
            }
            debug!(client = %client_id, "peer closed connection");
            return Ok(());
        }
    }
}

/// Split the first `\n`-terminated line off `buf`, without the newline.
fn split_line(buf: &mut BytesMut) -> Option<BytesMut> {
    let newline = buf.iter().position(|&b| b == b'\n')?;
    let mut line = buf.split_to(newline + 1);
    line.truncate(newline);
    Some(line)
}

async fn reject_long_line(client_id: ClientId, stream: &mut TcpStream) -> Result<(), ServerError> {
    warn!(client = %client_id, max = MAX_LINE_LEN, "request line too long, closing");
    let reply = text_codec::format_fault(
        BAD_REQUEST,
        &format!("line longer than {MAX_LINE_LEN} bytes"),
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;
    Ok(())
}
