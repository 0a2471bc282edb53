//! Dedicated writer task for sending frames on one connection.
//!
//! Every producer (the session itself, the broadcast forwarder) sends
//! frames through an mpsc channel to a single task that owns the socket's
//! write half, so frames never interleave on the wire.
//!
//! # Architecture
//!
//! ```text
//! Session   ─┐
//! Broadcast ─┴─► mpsc::Sender<Frame> ─► Writer Task ─► Socket
//! ```
//!
//! Frames already queued are batched into one vectored write.

use std::io::IoSlice;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, WireError};
use crate::protocol::{Frame, HEADER_SIZE};

/// Frames a connection may queue before senders wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Upper bound on frames coalesced into one vectored write.
const MAX_BATCH_SIZE: usize = 64;

/// Writer task settings.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Queue depth in frames.
    pub channel_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Producer side of a connection's outbound queue.
///
/// Clones share the same queue.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Frame>,
}

impl WriterHandle {
    /// Queue a frame, waiting while the channel is full.
    pub async fn send(&self, frame: Frame) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| WireError::ConnectionClosed)
    }

    /// True once the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start a task that owns `writer` and drains the queue into it.
///
/// The task ends cleanly once every handle is dropped, or with an error
/// if the socket fails.
pub fn spawn_writer_task<W>(writer: W, config: WriterConfig) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

async fn writer_loop<W>(mut rx: mpsc::Receiver<Frame>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
    loop {
        let first = match rx.recv().await {
            Some(frame) => frame,
            None => {
                let _ = writer.shutdown().await;
                return Ok(());
            }
        };

        batch.clear();
        batch.push(first);
        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(frame) => batch.push(frame),
                Err(_) => break,
            }
        }

        write_batch(&mut writer, &batch).await?;
        tracing::trace!(frames = batch.len(), "wrote batch");
    }
}

/// Write a batch of frames using scatter/gather I/O.
async fn write_batch<W>(writer: &mut W, batch: &[Frame]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if batch.is_empty() {
        return Ok(());
    }

    let parts: Vec<_> = batch.iter().map(Frame::parts).collect();
    let total_size: usize = batch.iter().map(Frame::wire_len).sum();

    let mut total_written = 0;
    while total_written < total_size {
        let slices = build_remaining_slices(&parts, total_written);
        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(WireError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "socket accepted no bytes",
            )));
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build IoSlice array for the data not yet written.
fn build_remaining_slices<'a>(
    parts: &'a [([u8; HEADER_SIZE], &'a [u8])],
    skip_bytes: usize,
) -> Vec<IoSlice<'a>> {
    let mut slices = Vec::with_capacity(parts.len() * 2);
    let mut offset = 0;

    for (header, payload) in parts {
        for part in [&header[..], *payload] {
            let end = offset + part.len();
            if !part.is_empty() && skip_bytes < end {
                let start = skip_bytes.saturating_sub(offset);
                slices.push(IoSlice::new(&part[start..]));
            }
            offset = end;
        }
    }

    slices
}
