//! Protocol module - wire format, framing, and frame readers.
//!
//! This module implements the framing layer:
//! - 3-byte versioned header encoding/decoding
//! - Frame struct with immutable payload
//! - Blocking and async frame readers
//! - Frame buffer for accumulating partial reads

mod frame;
mod frame_buffer;
mod reader;
mod wire_format;

pub use frame::Frame;
pub use frame_buffer::FrameBuffer;
pub use reader::{read_frame, read_frame_async};
pub use wire_format::{
    pack_version, Header, CURRENT_VERSION, HEADER_SIZE, MAJOR_VERSION, MAX_DATA_LEN,
    MINOR_VERSION,
};
