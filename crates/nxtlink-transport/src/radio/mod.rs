//! Bluetooth RFCOMM backend (Linux).
//!
//! The radio link is a raw byte stream: it has no message boundaries, so the
//! codec must run it through the framing layer.

pub mod hci;
mod sys;

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use tracing::debug;

use crate::address::{BdAddr, RadioTarget};
use crate::config::RadioConfig;
use crate::discovery::resolve_name;
use crate::error::{Result, TransportError};
use crate::traits::Backend;

pub use hci::HciScanner;

/// A connected RFCOMM stream socket.
pub struct RadioSocket {
    fd: Option<OwnedFd>,
    address: BdAddr,
}

impl RadioSocket {
    /// Connect to a hardware address or friendly name with default settings.
    pub fn connect(destination: &str) -> Result<Self> {
        Self::connect_with_config(destination, &RadioConfig::default())
    }

    /// Connect with explicit configuration.
    ///
    /// Destinations that are not `XX:XX:XX:XX:XX:XX` addresses are resolved by
    /// scanning for a peer whose remote name matches exactly.
    pub fn connect_with_config(destination: &str, config: &RadioConfig) -> Result<Self> {
        let address = match RadioTarget::parse(destination)? {
            RadioTarget::Address(addr) => addr,
            RadioTarget::Name(name) => {
                debug!(name = %name, "destination is a friendly name, scanning");
                let mut scanner = HciScanner::open(config)?;
                resolve_name(&mut scanner, &name)?
            }
        };
        Self::connect_address(address, config)
    }

    /// Connect to a known hardware address.
    pub fn connect_address(address: BdAddr, config: &RadioConfig) -> Result<Self> {
        let connect_err = |source: io::Error| TransportError::Connect {
            address: address.to_string(),
            source,
        };

        // SAFETY: plain socket(2) call; the result is checked before use.
        let raw = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
                sys::BTPROTO_RFCOMM,
            )
        };
        if raw < 0 {
            return Err(connect_err(io::Error::last_os_error()));
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let yes: libc::c_int = 1;
        // SAFETY: `yes` outlives the call and its size is passed alongside.
        // Failure only affects address reuse, so the result is ignored.
        unsafe {
            libc::setsockopt(
                fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_REUSEADDR,
                (&yes as *const libc::c_int).cast::<libc::c_void>(),
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            );
        }

        let addr = sys::SockaddrRc {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: address.to_le_bytes(),
            rc_channel: config.channel,
        };
        // SAFETY: `addr` is a valid sockaddr_rc and its exact size is passed.
        let rc = unsafe {
            libc::connect(
                fd.as_raw_fd(),
                (&addr as *const sys::SockaddrRc).cast::<libc::sockaddr>(),
                std::mem::size_of::<sys::SockaddrRc>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(connect_err(io::Error::last_os_error()));
        }

        debug!(%address, channel = config.channel, "connected rfcomm socket");
        Ok(Self {
            fd: Some(fd),
            address,
        })
    }

    /// The hardware address this socket is connected to.
    pub fn address(&self) -> BdAddr {
        self.address
    }

    fn raw_fd(&self) -> Result<RawFd> {
        self.fd
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or(TransportError::Closed)
    }
}

impl Backend for RadioSocket {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let fd = self.raw_fd()?;
        loop {
            // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
            let n = unsafe { libc::recv(fd, buf.as_mut_ptr().cast(), buf.len(), 0) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err.into());
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let fd = self.raw_fd()?;
        loop {
            // SAFETY: `buf` is valid for reads of `buf.len()` bytes.
            let n = unsafe { libc::send(fd, buf.as_ptr().cast(), buf.len(), libc::MSG_NOSIGNAL) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err.into());
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        let Some(fd) = self.fd.take() else {
            return Ok(());
        };
        debug!(address = %self.address, "closing rfcomm socket");
        // SAFETY: ownership of the descriptor was just released by `into_raw_fd`.
        if unsafe { libc::close(fd.into_raw_fd()) } < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "bluetooth-rfcomm"
    }
}

impl std::fmt::Debug for RadioSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioSocket")
            .field("address", &self.address)
            .field("open", &self.fd.is_some())
            .finish()
    }
}
