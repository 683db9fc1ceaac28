//! Length-prefixed packet framing for stream-oriented NXT backends.
//!
//! The radio link delivers a raw byte stream, while the direct-command
//! protocol is packetized. Every packet on the stream is wrapped as:
//! - A 2-byte little-endian body length
//! - Exactly that many body bytes (one request or reply frame)
//!
//! Packet-oriented backends (USB) preserve message boundaries on their own and
//! are used unframed.

pub mod codec;
pub mod error;
pub mod stream;

pub use codec::{encode_envelope, HEADER_SIZE, MAX_BODY_LEN};
pub use error::{FrameError, Result};
pub use stream::FramedStream;
