//! Broadcast chat server.
//!
//! Each accepted connection runs its own session task:
//! 1. Send the welcome message
//! 2. Read one raw text frame as the username
//! 3. Turn every further raw text frame into a [`ChatMessage`] and publish it
//!
//! Names and lines longer than a text field can hold are answered with a
//! notice to the sender only; the session keeps reading.
//!
//! Published frames go through a `tokio::sync::broadcast` hub. Every session
//! subscribes to the hub and forwards what it receives to its own writer
//! task, so no connection list is shared between tasks.
//!
//! # Example
//!
//! ```ignore
//! use shapewire::transport::{Server, ServerConfig};
//!
//! let server = Server::bind(ServerConfig::default().port(4000)).await?;
//! server.run().await?;
//! ```

use std::net::SocketAddr;

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::message::{ChatMessage, LINE_TOO_LONG, USERNAME_TOO_LONG};
use crate::codec::{encode_value, MAX_ELEMENTS};
use crate::error::{Result, WireError};
use crate::protocol::{read_frame_async, Frame};
use crate::writer::{spawn_writer_task, WriterConfig, WriterHandle};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";

/// Default number of frames the broadcast hub buffers per subscriber.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,
    /// Frames buffered per subscriber before slow sessions start skipping.
    pub broadcast_capacity: usize,
    /// Per-connection writer settings.
    pub writer: WriterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            writer: WriterConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Listen on all interfaces at `port`.
    pub fn port(self, port: u16) -> Self {
        self.bind_addr(format!("0.0.0.0:{port}"))
    }

    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.writer.channel_capacity = capacity;
        self
    }
}

/// A bound chat server.
pub struct Server {
    listener: TcpListener,
    hub: broadcast::Sender<Frame>,
    writer_config: WriterConfig,
}

impl Server {
    /// Bind the listening socket.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        let (hub, _) = broadcast::channel(config.broadcast_capacity);
        tracing::info!(addr = %listener.local_addr()?, "listening");
        Ok(Self {
            listener,
            hub,
            writer_config: config.writer,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of sessions currently subscribed to the hub.
    pub fn session_count(&self) -> usize {
        self.hub.receiver_count()
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!(%peer, "accepted connection");

            let hub = self.hub.clone();
            let writer_config = self.writer_config.clone();
            tokio::spawn(async move {
                match handle_connection(stream, hub, writer_config).await {
                    Ok(()) => tracing::info!(%peer, "connection closed"),
                    Err(e) if e.is_disconnect() => tracing::info!(%peer, "connection closed"),
                    Err(e) => tracing::warn!(%peer, "session error: {}", e),
                }
            });
        }
    }
}

/// Run one client session until its stream ends.
pub async fn handle_connection(
    stream: TcpStream,
    hub: broadcast::Sender<Frame>,
    writer_config: WriterConfig,
) -> Result<()> {
    stream.set_nodelay(true)?;
    let (mut reader, write_half) = stream.into_split();
    let (writer, writer_task) = spawn_writer_task(write_half, writer_config);

    // Subscribe before greeting so nothing published afterwards is missed.
    let forwarder = spawn_forwarder(hub.subscribe(), writer.clone());

    let result = run_session(&mut reader, &hub, &writer).await;

    forwarder.abort();
    drop(writer);
    let _ = writer_task.await;
    result
}

async fn run_session(
    reader: &mut OwnedReadHalf,
    hub: &broadcast::Sender<Frame>,
    writer: &WriterHandle,
) -> Result<()> {
    writer.send(encode_value(&ChatMessage::welcome())?).await?;

    let username = read_username(reader, writer).await?;
    tracing::info!(%username, "user joined");

    loop {
        let frame = read_frame_async(reader).await?;
        let message = ChatMessage::new(username.as_str(), frame.payload_text()?);

        match encode_value(&message) {
            Ok(outbound) => {
                tracing::info!("{}: {}", message.username, message.body);
                if hub.send(outbound).is_err() {
                    return Err(WireError::ConnectionClosed);
                }
            }
            Err(WireError::LengthOverflow { len, .. }) => {
                tracing::warn!(%username, len, "dropping oversized line");
                send_notice(writer, LINE_TOO_LONG).await?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Read username frames until one fits in a text field.
async fn read_username(reader: &mut OwnedReadHalf, writer: &WriterHandle) -> Result<String> {
    loop {
        let username = read_frame_async(reader).await?.payload_text()?;
        if username.len() <= MAX_ELEMENTS {
            return Ok(username);
        }
        tracing::warn!(len = username.len(), "rejecting oversized username");
        send_notice(writer, USERNAME_TOO_LONG).await?;
    }
}

/// Reply to this session only.
async fn send_notice(writer: &WriterHandle, body: &str) -> Result<()> {
    writer.send(encode_value(&ChatMessage::notice(body))?).await
}

/// Forward every hub frame to one connection's writer.
fn spawn_forwarder(
    mut rx: broadcast::Receiver<Frame>,
    writer: WriterHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    if writer.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session fell behind, dropping broadcasts");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);
    }

    #[test]
    fn test_config_builder() {
        let config = ServerConfig::default()
            .port(9000)
            .broadcast_capacity(8)
            .channel_capacity(16);
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.broadcast_capacity, 8);
        assert_eq!(config.writer.channel_capacity, 16);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::bind(ServerConfig::default().bind_addr("127.0.0.1:0"))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.session_count(), 0);
    }
}
