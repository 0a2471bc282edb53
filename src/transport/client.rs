//! Chat client connection.
//!
//! A background read loop parses incoming frames with a [`FrameBuffer`],
//! decodes each one as a [`ChatMessage`] and hands it to the caller through
//! [`ChatClient::next_message`]. Outgoing lines are raw text frames queued on
//! the writer task.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::message::ChatMessage;
use crate::codec::decode_frame;
use crate::error::{Result, WireError};
use crate::protocol::{Frame, FrameBuffer};
use crate::writer::{spawn_writer_task, WriterConfig, WriterHandle};

/// Default server address.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:4000";

/// Size of each socket read.
const READ_CHUNK: usize = 16 * 1024;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the server.
    pub server_addr: String,
    /// Writer task settings.
    pub writer: WriterConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            writer: WriterConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.server_addr = addr.into();
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.writer.channel_capacity = capacity;
        self
    }
}

/// A connected chat client.
pub struct ChatClient {
    writer: WriterHandle,
    incoming: mpsc::Receiver<Result<ChatMessage>>,
    reader_task: JoinHandle<()>,
    _writer_task: JoinHandle<Result<()>>,
}

impl ChatClient {
    /// Connect to the server named in `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let stream = TcpStream::connect(&config.server_addr).await?;
        stream.set_nodelay(true)?;
        tracing::debug!(addr = %config.server_addr, "connected");

        let (read_half, write_half) = stream.into_split();
        let (writer, writer_task) = spawn_writer_task(write_half, config.writer.clone());

        let (tx, incoming) = mpsc::channel(config.writer.channel_capacity);
        let reader_task = tokio::spawn(async move {
            if let Err(e) = read_loop(read_half, &tx).await {
                if e.is_disconnect() {
                    tracing::debug!("server closed the connection");
                } else {
                    tracing::error!("Read loop error: {}", e);
                }
                let _ = tx.send(Err(e)).await;
            }
        });

        Ok(Self {
            writer,
            incoming,
            reader_task,
            _writer_task: writer_task,
        })
    }

    /// Send one line of text as a raw frame.
    pub async fn send_line(&self, line: &str) -> Result<()> {
        self.writer.send(Frame::text(line)?).await
    }

    /// Wait for the next message from the server.
    ///
    /// Returns `None` once the connection is gone and every message has
    /// been consumed. A decode failure or lost connection is yielded once as
    /// an error before that.
    pub async fn next_message(&mut self) -> Option<Result<ChatMessage>> {
        self.incoming.recv().await
    }

    /// True once the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Read frames until the stream ends, forwarding each decoded message.
async fn read_loop<R>(mut reader: R, tx: &mpsc::Sender<Result<ChatMessage>>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut frame_buffer = FrameBuffer::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            if frame_buffer.is_mid_frame() {
                return Err(WireError::EndOfStream {
                    expected: frame_buffer.len() + frame_buffer.bytes_needed(),
                    received: frame_buffer.len(),
                });
            }
            return Err(WireError::ConnectionClosed);
        }

        for frame in frame_buffer.push(&buf[..n])? {
            let message = decode_frame::<ChatMessage>(&frame)?;
            if tx.send(Ok(message)).await.is_err() {
                return Ok(());
            }
        }
    }
}
