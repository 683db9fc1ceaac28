use crate::error::Result;

/// The minimal contract every NXT backend fulfils.
///
/// All calls block until the backend completes or fails. A packet-oriented
/// backend maps one `write`/`read` to one protocol message; a stream-oriented
/// backend has no message boundaries and must be framed before the codec uses
/// it.
pub trait Backend {
    /// Read up to `buf.len()` bytes. `Ok(0)` means the peer produced nothing.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write up to `buf.len()` bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Release the underlying resource. Called at most once by the owner.
    fn close(&mut self) -> Result<()>;

    /// Backend name for diagnostics.
    fn transport_name(&self) -> &'static str {
        "custom"
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}
