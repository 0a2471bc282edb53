//! # shapewire
//!
//! Length-framed binary wire protocol with a shape-driven value codec.
//!
//! Every message is a 3-byte header followed by its payload:
//!
//! ```text
//! +---------+----------+----------+-------------------+
//! | version | len (hi) | len (lo) | payload (len B)   |
//! +---------+----------+----------+-------------------+
//! ```
//!
//! Payloads carry no type tags. The receiver's target type decides how the
//! bytes are read, so sender and receiver must agree on the shape.
//!
//! ## Example
//!
//! ```
//! use shapewire::{decode_frame_into, encode_value, read_frame, wire_record};
//!
//! wire_record! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Point {
//!         pub x: i32,
//!         pub y: i32,
//!     }
//! }
//!
//! let bytes = encode_value(&Point { x: 3, y: -4 }).unwrap().to_bytes();
//!
//! let frame = read_frame(&mut &bytes[..]).unwrap();
//! let mut point = Point::default();
//! decode_frame_into(&frame, &mut point).unwrap();
//! assert_eq!(point, Point { x: 3, y: -4 });
//! ```
//!
//! ## Layout
//!
//! - [`protocol`]: header, frame, readers and the incremental frame buffer
//! - [`codec`]: value encoder/decoder, dynamic values and record generation
//! - [`writer`]: per-connection writer task
//! - [`transport`]: broadcast chat server and client

pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod writer;

pub use codec::{decode_frame, decode_frame_into, decode_value, encode_value};
pub use error::{Result, WireError};
pub use protocol::{read_frame, read_frame_async, Frame};
