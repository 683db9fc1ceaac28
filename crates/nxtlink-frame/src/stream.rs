use std::io::ErrorKind;

use bytes::BytesMut;
use nxtlink_transport::{Backend, TransportError};
use tracing::{trace, warn};

use crate::codec::{encode_envelope, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64 + HEADER_SIZE;
const DRAIN_CHUNK_SIZE: usize = 2;

/// Sends and receives length-prefixed packets over a stream backend.
///
/// Every `send` is preceded by its own length header; every `recv` consumes
/// exactly one header and the body it announces, so the next `recv` always
/// starts at a header boundary.
pub struct FramedStream<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Backend> FramedStream<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write one packet (blocking). Returns the body length on success.
    ///
    /// A backend write that accepts zero bytes aborts the packet with
    /// [`TransportError::Disconnected`], even if part of it was already sent.
    pub fn send(&mut self, body: &[u8]) -> Result<usize> {
        self.buf.clear();
        encode_envelope(body, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(TransportError::Disconnected.into()),
                Ok(n) => offset += n,
                Err(err) if is_interrupted(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        trace!(len = body.len(), "sent framed packet");
        Ok(body.len())
    }

    /// Read one packet into `buf` (blocking). Returns the number of body bytes
    /// stored.
    ///
    /// If the announced length exceeds `buf.len()`, the packet is truncated to
    /// `buf.len()` and the undelivered remainder is read and discarded so it
    /// cannot be mistaken for the next header. Truncation is not an error.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let length = usize::from(self.read_header()?);

        if length <= buf.len() {
            self.read_exact(&mut buf[..length])?;
            trace!(len = length, "received framed packet");
            return Ok(length);
        }

        let delivered = buf.len();
        self.read_exact(buf)?;
        self.drain(length - delivered)?;
        warn!(
            announced = length,
            delivered, "framed packet larger than receive buffer, remainder discarded"
        );
        Ok(delivered)
    }

    fn read_header(&mut self) -> Result<u16> {
        let mut header = [0u8; HEADER_SIZE];
        let n = loop {
            match self.inner.read(&mut header) {
                Ok(n) => break n,
                Err(err) if is_interrupted(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        };
        match n {
            0 => Err(TransportError::Disconnected.into()),
            HEADER_SIZE => Ok(u16::from_le_bytes(header)),
            got => Err(FrameError::ShortHeader { got }),
        }
    }

    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < dst.len() {
            match self.inner.read(&mut dst[filled..]) {
                Ok(0) => return Err(TransportError::Disconnected.into()),
                Ok(n) => filled += n,
                Err(err) if is_interrupted(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn drain(&mut self, mut remaining: usize) -> Result<()> {
        let mut scratch = [0u8; DRAIN_CHUNK_SIZE];
        while remaining > 0 {
            let want = remaining.min(DRAIN_CHUNK_SIZE);
            match self.inner.read(&mut scratch[..want]) {
                Ok(0) => return Err(TransportError::Disconnected.into()),
                Ok(n) => remaining -= n.min(remaining),
                Err(err) if is_interrupted(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Close the underlying backend.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close().map_err(Into::into)
    }

    /// Borrow the underlying backend.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying backend.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framer and return the inner backend.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn is_interrupted(err: &TransportError) -> bool {
    matches!(err, TransportError::Io(io) if io.kind() == ErrorKind::Interrupted)
}

impl<T> std::fmt::Debug for FramedStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// In-memory stream backend that hands out at most `chunk` bytes per read.
    struct ScriptedStream {
        incoming: VecDeque<u8>,
        chunk: usize,
        written: Vec<u8>,
        schedule: VecDeque<usize>,
        write_limit: Option<usize>,
        interrupt_next: bool,
    }

    impl ScriptedStream {
        fn new(incoming: &[u8]) -> Self {
            Self {
                incoming: incoming.iter().copied().collect(),
                chunk: usize::MAX,
                written: Vec::new(),
                schedule: VecDeque::new(),
                write_limit: None,
                interrupt_next: false,
            }
        }

        fn chunked(incoming: &[u8], chunk: usize) -> Self {
            Self {
                chunk,
                ..Self::new(incoming)
            }
        }
    }

    impl Backend for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> nxtlink_transport::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(std::io::Error::from(ErrorKind::Interrupted).into());
            }
            let limit = self.schedule.pop_front().unwrap_or(self.chunk);
            let n = buf.len().min(limit).min(self.incoming.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.incoming.pop_front().unwrap();
            }
            Ok(n)
        }

        fn write(&mut self, buf: &[u8]) -> nxtlink_transport::Result<usize> {
            let n = match self.write_limit {
                Some(limit) => {
                    let n = buf.len().min(limit);
                    self.write_limit = Some(limit - n);
                    n
                }
                None => buf.len().min(3),
            };
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn close(&mut self) -> nxtlink_transport::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn send_prefixes_length_and_loops_over_partial_writes() {
        let mut framed = FramedStream::new(ScriptedStream::new(&[]));
        let sent = framed.send(&[0x00, 0x0B]).unwrap();
        assert_eq!(sent, 2);
        assert_eq!(framed.get_ref().written, vec![0x02, 0x00, 0x00, 0x0B]);
    }

    #[test]
    fn send_aborts_on_zero_byte_write() {
        let mut stream = ScriptedStream::new(&[]);
        stream.write_limit = Some(3);
        let mut framed = FramedStream::new(stream);

        let err = framed.send(&[1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Disconnected)
        ));
        assert_eq!(framed.get_ref().written.len(), 3, "partial bytes were sent");
    }

    #[test]
    fn recv_exact_fit() {
        let mut framed = FramedStream::new(ScriptedStream::new(&[3, 0, 0xA, 0xB, 0xC]));
        let mut buf = [0u8; 3];
        assert_eq!(framed.recv(&mut buf).unwrap(), 3);
        assert_eq!(buf, [0xA, 0xB, 0xC]);
    }

    #[test]
    fn recv_smaller_packet_than_buffer() {
        let mut framed = FramedStream::new(ScriptedStream::new(&[2, 0, 0xA, 0xB]));
        let mut buf = [0u8; 8];
        assert_eq!(framed.recv(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[0xA, 0xB]);
    }

    #[test]
    fn recv_reassembles_body_from_partial_reads() {
        let wire = [5, 0, 1, 2, 3, 4, 5];
        let mut framed = FramedStream::new(ScriptedStream::chunked(&wire, 2));
        let mut buf = [0u8; 5];
        assert_eq!(framed.recv(&mut buf).unwrap(), 5);
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn oversized_packet_is_truncated_and_drained() {
        // 7-byte packet into a 3-byte buffer, followed by a 2-byte packet.
        let wire = [7, 0, 1, 2, 3, 4, 5, 6, 7, 2, 0, 0xEE, 0xFF];
        let mut framed = FramedStream::new(ScriptedStream::new(&wire));

        let mut small = [0u8; 3];
        assert_eq!(framed.recv(&mut small).unwrap(), 3);
        assert_eq!(small, [1, 2, 3]);

        let mut next = [0u8; 4];
        assert_eq!(framed.recv(&mut next).unwrap(), 2);
        assert_eq!(&next[..2], &[0xEE, 0xFF]);
        assert!(framed.get_ref().incoming.is_empty());
    }

    #[test]
    fn drain_tolerates_short_reads() {
        let wire = [6, 0, 1, 2, 3, 4, 5, 6, 1, 0, 0x42];
        let mut stream = ScriptedStream::new(&wire);
        // header, one body byte, then single-byte reads while draining
        stream.schedule = VecDeque::from(vec![2, 1, 1, 1, 1, 1, 1]);
        let mut framed = FramedStream::new(stream);

        let mut first = [0u8; 1];
        assert_eq!(framed.recv(&mut first).unwrap(), 1);
        assert_eq!(first, [1]);

        let mut next = [0u8; 1];
        assert_eq!(framed.recv(&mut next).unwrap(), 1);
        assert_eq!(next, [0x42]);
    }

    #[test]
    fn drain_hitting_eof_is_transport_error() {
        let wire = [9, 0, 1, 2, 3];
        let mut framed = FramedStream::new(ScriptedStream::new(&wire));
        let mut buf = [0u8; 2];
        let err = framed.recv(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Disconnected)
        ));
    }

    #[test]
    fn empty_stream_is_transport_error() {
        let mut framed = FramedStream::new(ScriptedStream::new(&[]));
        let mut buf = [0u8; 4];
        let err = framed.recv(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Disconnected)
        ));
    }

    #[test]
    fn one_byte_header_is_framing_violation() {
        let mut framed = FramedStream::new(ScriptedStream::chunked(&[4, 0, 1, 2, 3, 4], 1));
        let mut buf = [0u8; 4];
        let err = framed.recv(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::ShortHeader { got: 1 }));
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut stream = ScriptedStream::new(&[1, 0, 0x99]);
        stream.interrupt_next = true;
        let mut framed = FramedStream::new(stream);
        let mut buf = [0u8; 1];
        assert_eq!(framed.recv(&mut buf).unwrap(), 1);
        assert_eq!(buf, [0x99]);
    }

    #[test]
    fn zero_length_packet() {
        let mut framed = FramedStream::new(ScriptedStream::new(&[0, 0, 1, 0, 7]));
        let mut buf = [0u8; 4];
        assert_eq!(framed.recv(&mut buf).unwrap(), 0);
        assert_eq!(framed.recv(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 7);
    }
}
