//! Blocking and async frame readers.
//!
//! Both read exactly [`HEADER_SIZE`] bytes, validate the version, then read
//! exactly `payload_length` bytes. A stream that ends early at any point is
//! reported as [`WireError::EndOfStream`]; a zero-length payload needs no
//! further reads.

use std::io::{self, Read};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::wire_format::{Header, HEADER_SIZE};
use super::Frame;
use crate::error::{Result, WireError};

/// Read one frame from a blocking stream.
///
/// # Example
///
/// ```
/// use shapewire::protocol::{read_frame, Frame};
///
/// let bytes = Frame::build(&b"Hello world"[..]).unwrap().to_bytes();
/// let frame = read_frame(&mut &bytes[..]).unwrap();
/// assert_eq!(frame.payload(), b"Hello world");
/// ```
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Frame> {
    let mut header_buf = [0u8; HEADER_SIZE];
    read_full(reader, &mut header_buf)?;
    let header = Header::parse(&header_buf)?;

    let len = header.payload_length as usize;
    if len == 0 {
        return Ok(Frame::from_parts(header, Bytes::new()));
    }

    let mut payload = vec![0u8; len];
    read_full(reader, &mut payload)?;
    Ok(Frame::from_parts(header, Bytes::from(payload)))
}

/// Read one frame from an async stream.
pub async fn read_frame_async<R: AsyncRead + Unpin + ?Sized>(reader: &mut R) -> Result<Frame> {
    let mut header_buf = [0u8; HEADER_SIZE];
    read_full_async(reader, &mut header_buf).await?;
    let header = Header::parse(&header_buf)?;

    let len = header.payload_length as usize;
    if len == 0 {
        return Ok(Frame::from_parts(header, Bytes::new()));
    }

    let mut payload = vec![0u8; len];
    read_full_async(reader, &mut payload).await?;
    Ok(Frame::from_parts(header, Bytes::from(payload)))
}

/// Fill `buf` completely, tracking how much arrived before EOF.
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(WireError::EndOfStream {
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    Ok(())
}

async fn read_full_async<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => {
                return Err(WireError::EndOfStream {
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    Ok(())
}
