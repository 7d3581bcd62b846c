// crates/chat-client/src/network.rs

use anyhow::{Context, Result};
use bytes::BytesMut;
use chat_core::{Request, Response};
use chat_protocol::binary_codec::decode_response;
use chat_protocol::frame::{decode_frame, frame_request};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// One framed connection to the server.
///
/// Strictly request/response: [`ChatConnection::call`] writes one frame
/// and reads exactly one back.
pub struct ChatConnection {
    server_addr: String,
    stream: TcpStream,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
}

impl ChatConnection {
    pub async fn connect(server_addr: &str) -> Result<Self> {
        info!("Connecting to {}...", server_addr);

        let stream = TcpStream::connect(server_addr)
            .await
            .with_context(|| format!("error establishing connection with {server_addr}"))?;
        stream.set_nodelay(true)?;

        info!("Connected successfully");
        Ok(Self {
            server_addr: server_addr.to_string(),
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(1024),
        })
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub async fn call(&mut self, request: &Request) -> Result<Response> {
        self.send(request).await?;
        let response = self.read_response().await?;
        debug!("{} -> {:?}", request.kind(), response);
        Ok(response)
    }

    async fn send(&mut self, request: &Request) -> Result<()> {
        self.write_buffer.clear();
        frame_request(request, &mut self.write_buffer)?;

        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Response> {
        loop {
            if let Some(payload) = decode_frame(&mut self.read_buffer)? {
                return Ok(decode_response(&payload)?);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                anyhow::bail!("server at {} closed the connection", self.server_addr);
            }
        }
    }
}
