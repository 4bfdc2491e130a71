//! Network transports: single-shot UDP exchange for queries and updates,
//! length-prefixed TCP streaming for zone transfers.

use crate::dns::axfr;
use crate::errors::ServiceError;
use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

const MAX_UDP_RESPONSE_SIZE: usize = 4096;
const MAX_TCP_MESSAGE_SIZE: usize = 65535;
/// Backstop against a server that never sends the terminal SOA.
const MAX_TRANSFER_MESSAGES: usize = 4096;

/// The wire operations the client needs from a server. Tests substitute
/// this to script server behavior without sockets.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// One request/response round trip.
    async fn exchange(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ServiceError>;

    /// Streamed zone transfer: every response message up to and including
    /// the one carrying the terminal SOA.
    async fn transfer(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<Message>, ServiceError>;
}

pub struct NetTransport {
    server_addr: SocketAddr,
}

impl NetTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn connect_tcp(&self, timeout: Duration) -> Result<TcpStream, ServiceError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| {
                ServiceError::Transfer(format!("timeout connecting to {}", self.server_addr))
            })?
            .map_err(|e| {
                ServiceError::Transfer(format!("failed to connect to {}: {e}", self.server_addr))
            })?;
        stream.set_nodelay(true).map_err(|e| {
            ServiceError::Transfer(format!("failed to set TCP_NODELAY on {}: {e}", self.server_addr))
        })?;
        Ok(stream)
    }
}

#[async_trait]
impl DnsExchange for NetTransport {
    async fn exchange(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ServiceError> {
        let bind_addr = if self.server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ServiceError::Exchange(format!("failed to bind socket: {e}")))?;
        socket.connect(self.server_addr).await.map_err(|e| {
            ServiceError::Exchange(format!("failed to connect to {}: {e}", self.server_addr))
        })?;
        socket
            .send(message_bytes)
            .await
            .map_err(|e| ServiceError::Exchange(format!("failed to send query: {e}")))?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let len = tokio::time::timeout(timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| {
                ServiceError::Exchange(format!(
                    "timeout waiting for response from {}",
                    self.server_addr
                ))
            })?
            .map_err(|e| ServiceError::Exchange(format!("failed to receive response: {e}")))?;

        debug!(server = %self.server_addr, response_len = len, "DNS response received");
        buf.truncate(len);
        Ok(buf)
    }

    async fn transfer(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<Message>, ServiceError> {
        let mut stream = self.connect_tcp(timeout).await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| {
                ServiceError::Transfer(format!("timeout sending request to {}", self.server_addr))
            })??;

        let mut messages = Vec::new();
        let mut soa_seen = 0usize;
        while soa_seen < 2 {
            let frame = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
                .await
                .map_err(|_| {
                    ServiceError::Transfer(format!(
                        "timeout waiting for transfer data from {}",
                        self.server_addr
                    ))
                })??;
            let message =
                Message::from_vec(&frame).map_err(|e| ServiceError::Decode(e.to_string()))?;

            let done = message.response_code() != ResponseCode::NoError
                || message.answers().is_empty();
            soa_seen += axfr::soa_count(&message);
            messages.push(message);
            if done {
                break;
            }
            if messages.len() >= MAX_TRANSFER_MESSAGES {
                return Err(ServiceError::Transfer(
                    "transfer exceeded maximum message count".into(),
                ));
            }
        }

        debug!(
            server = %self.server_addr,
            messages = messages.len(),
            "zone transfer stream complete"
        );
        Ok(messages)
    }
}

async fn send_with_length_prefix(
    stream: &mut TcpStream,
    message_bytes: &[u8],
) -> Result<(), ServiceError> {
    let length = message_bytes.len() as u16;
    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| ServiceError::Transfer(format!("failed to write length prefix: {e}")))?;
    stream
        .write_all(message_bytes)
        .await
        .map_err(|e| ServiceError::Transfer(format!("failed to write DNS message: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| ServiceError::Transfer(format!("failed to flush stream: {e}")))?;
    Ok(())
}

async fn read_with_length_prefix(stream: &mut TcpStream) -> Result<Vec<u8>, ServiceError> {
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| ServiceError::Transfer(format!("failed to read response length: {e}")))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(ServiceError::Transfer(format!(
            "response too large: {response_len} bytes"
        )));
    }

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| ServiceError::Transfer(format!("failed to read response body: {e}")))?;
    Ok(response)
}
