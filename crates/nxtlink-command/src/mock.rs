//! In-memory backend used by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use nxtlink_transport::{Backend, Result, TransportError};

use crate::connection::Connection;

#[derive(Default)]
pub(crate) struct Wire {
    pub writes: Vec<Vec<u8>>,
    pub replies: VecDeque<Vec<u8>>,
    pub closes: usize,
    pub fail_close: bool,
    /// Accept at most this many bytes per write.
    pub write_limit: Option<usize>,
}

/// Packet-style backend: one write or read per message.
pub(crate) struct MockBackend(Arc<Mutex<Wire>>);

impl MockBackend {
    pub fn new() -> (Self, Arc<Mutex<Wire>>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        (Self(Arc::clone(&wire)), wire)
    }
}

impl Backend for MockBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut wire = self.0.lock().unwrap();
        let Some(reply) = wire.replies.pop_front() else {
            return Ok(0);
        };
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut wire = self.0.lock().unwrap();
        let n = wire.write_limit.map_or(buf.len(), |limit| buf.len().min(limit));
        wire.writes.push(buf[..n].to_vec());
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        let mut wire = self.0.lock().unwrap();
        wire.closes += 1;
        if wire.fail_close {
            return Err(TransportError::Io(std::io::Error::other("close failed")));
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Default)]
pub(crate) struct Stream {
    pub incoming: VecDeque<u8>,
    pub written: Vec<u8>,
    /// Hand out at most this many bytes per read.
    pub read_limit: Option<usize>,
}

/// Byte-stream backend with no message boundaries.
pub(crate) struct StreamBackend(Arc<Mutex<Stream>>);

impl Backend for StreamBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut stream = self.0.lock().unwrap();
        let limit = stream.read_limit.unwrap_or(usize::MAX);
        let n = buf.len().min(limit).min(stream.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(stream.incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.0.lock().unwrap().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "mock-stream"
    }
}

/// A framed connection whose backend yields `incoming` as a byte stream.
pub(crate) fn stream_connection(incoming: &[u8]) -> (Connection, Arc<Mutex<Stream>>) {
    let stream = Arc::new(Mutex::new(Stream {
        incoming: incoming.iter().copied().collect(),
        ..Stream::default()
    }));
    let backend = StreamBackend(Arc::clone(&stream));
    (Connection::open_custom_stream(backend), stream)
}

/// A connection whose backend answers with `replies` in order.
pub(crate) fn connection(replies: Vec<Vec<u8>>) -> (Connection, Arc<Mutex<Wire>>) {
    let (backend, wire) = MockBackend::new();
    wire.lock().unwrap().replies.extend(replies);
    (Connection::open_custom(backend), wire)
}

/// A reply frame: marker, opcode, status, payload.
pub(crate) fn reply(opcode: u8, status: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x02, opcode, status];
    frame.extend_from_slice(payload);
    frame
}

/// A reply frame padded with zeroes to `len` bytes.
pub(crate) fn padded_reply(opcode: u8, payload: &[u8], len: usize) -> Vec<u8> {
    let mut frame = reply(opcode, 0x00, payload);
    frame.resize(len, 0);
    frame
}
