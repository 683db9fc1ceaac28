//! Request encoding and reply validation shared by every command.
//!
//! A request is `[mode, opcode, payload..]`; a reply is
//! `[0x02, opcode, status, payload..]` with a length fixed per opcode.

use bytes::BufMut;
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::error::{Error, FramingViolation, Result};
use crate::protocol::{Opcode, ReplyMode, MAX_REQUEST_LEN, REPLY_MARKER};
use crate::status::DeviceStatus;

const REQUEST_HEADER_LEN: usize = 2;
const REPLY_HEADER_LEN: usize = 3;

/// A request assembled in a fixed stack buffer.
pub(crate) struct Request {
    opcode: Opcode,
    bytes: [u8; MAX_REQUEST_LEN],
    len: usize,
}

impl Request {
    pub(crate) fn new(mode: ReplyMode, opcode: Opcode) -> Self {
        let mut bytes = [0u8; MAX_REQUEST_LEN];
        bytes[0] = mode.as_byte();
        bytes[1] = opcode.as_byte();
        Self {
            opcode,
            bytes,
            len: REQUEST_HEADER_LEN,
        }
    }

    // Callers validate lengths first; overflowing the buffer panics.
    fn put(&mut self, fill: impl FnOnce(&mut &mut [u8])) -> &mut Self {
        let mut tail = &mut self.bytes[self.len..];
        let before = tail.len();
        fill(&mut tail);
        let written = before - tail.len();
        self.len += written;
        self
    }

    pub(crate) fn put_u8(&mut self, value: u8) -> &mut Self {
        self.put(|buf| buf.put_u8(value))
    }

    pub(crate) fn put_i8(&mut self, value: i8) -> &mut Self {
        self.put(|buf| buf.put_i8(value))
    }

    pub(crate) fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(u8::from(value))
    }

    pub(crate) fn put_u16_le(&mut self, value: u16) -> &mut Self {
        self.put(|buf| buf.put_u16_le(value))
    }

    pub(crate) fn put_u32_le(&mut self, value: u32) -> &mut Self {
        self.put(|buf| buf.put_u32_le(value))
    }

    pub(crate) fn put_slice(&mut self, data: &[u8]) -> &mut Self {
        self.put(|buf| buf.put_slice(data))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A validated reply of exactly `N` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> Reply<N> {
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Everything after the marker, opcode and status bytes.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[REPLY_HEADER_LEN..]
    }
}

/// Send a raw direct command.
///
/// `payload` follows the mode and opcode bytes unchanged. It is rejected when
/// the whole request would exceed [`MAX_REQUEST_LEN`].
pub fn send(conn: &mut Connection, mode: ReplyMode, opcode: Opcode, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_REQUEST_LEN - REQUEST_HEADER_LEN {
        return Err(Error::InvalidArgument("request payload too large"));
    }
    let mut request = Request::new(mode, opcode);
    request.put_slice(payload);
    transmit(conn, &request)
}

pub(crate) fn transmit(conn: &mut Connection, request: &Request) -> Result<()> {
    let bytes = request.as_bytes();
    let written = conn.write(bytes)?;
    if written != bytes.len() {
        return Err(FramingViolation::ShortWrite {
            expected: bytes.len(),
            written,
        }
        .into());
    }
    trace!(opcode = request.opcode.name(), len = bytes.len(), "request sent");
    Ok(())
}

/// Read and validate one reply of exactly `N` bytes.
///
/// The reply must carry the reply marker, echo `opcode`, and report a zero
/// status. A nonzero status becomes [`Error::Device`], except that a pending
/// transaction reported by `LsGetStatus` reads as zero bytes ready.
pub fn recv<const N: usize>(conn: &mut Connection, opcode: Opcode) -> Result<Reply<N>> {
    if N < REPLY_HEADER_LEN {
        return Err(Error::InvalidArgument("reply length shorter than its header"));
    }

    let mut bytes = [0u8; N];
    let n = conn.read(&mut bytes)?;
    if n != N {
        return Err(FramingViolation::ShortReply {
            expected: N,
            actual: n,
        }
        .into());
    }
    if bytes[0] != REPLY_MARKER {
        return Err(FramingViolation::BadMarker(bytes[0]).into());
    }
    if bytes[1] != opcode.as_byte() {
        return Err(FramingViolation::OpcodeMismatch {
            expected: opcode.as_byte(),
            actual: bytes[1],
        }
        .into());
    }

    if bytes[2] != 0 {
        match DeviceStatus::from_code(bytes[2]) {
            DeviceStatus::PendingCommunication if opcode == Opcode::LsGetStatus => {
                bytes[2] = 0;
                bytes[REPLY_HEADER_LEN..].fill(0);
            }
            status => {
                debug!(
                    opcode = opcode.name(),
                    status = status.code(),
                    "brick rejected request"
                );
                return Err(Error::Device(status));
            }
        }
    }

    trace!(opcode = opcode.name(), len = N, "reply received");
    Ok(Reply { bytes })
}
