//! HCI inquiry and remote-name lookup over raw kernel sockets.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{debug, trace};

use super::sys;
use crate::address::BdAddr;
use crate::config::RadioConfig;
use crate::discovery::PeerScanner;
use crate::error::{Result, TransportError};

/// Page scan repetition mode R2, the value used when nothing better is known.
const DEFAULT_PSCAN_REP_MODE: u8 = 0x02;
const MAX_EVENT_LEN: usize = 3 + 255;
const NAME_LEN: usize = 248;

/// [`PeerScanner`] backed by the first local adapter that is up.
pub struct HciScanner {
    fd: OwnedFd,
    dev_id: u16,
    inquiry_length: u8,
    max_responses: u8,
}

impl HciScanner {
    /// Open the first available adapter and prepare it for name requests.
    pub fn open(config: &RadioConfig) -> Result<Self> {
        let dev_id = first_adapter_up().map_err(TransportError::Discovery)?;
        let fd = open_hci_socket().map_err(TransportError::Discovery)?;

        let addr = sys::SockaddrHci {
            hci_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            hci_dev: dev_id,
            hci_channel: 0,
        };
        // SAFETY: `addr` is a valid sockaddr_hci and its exact size is passed.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const sys::SockaddrHci).cast::<libc::sockaddr>(),
                std::mem::size_of::<sys::SockaddrHci>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(TransportError::Discovery(io::Error::last_os_error()));
        }

        let filter =
            sys::HciFilter::events(&[sys::EVT_CMD_STATUS, sys::EVT_REMOTE_NAME_REQ_COMPLETE]);
        set_sockopt(&fd, sys::SOL_HCI, sys::HCI_FILTER, &filter)
            .map_err(TransportError::Discovery)?;
        set_recv_timeout(&fd, config.name_timeout).map_err(TransportError::Discovery)?;

        debug!(dev_id, "opened hci adapter");
        Ok(Self {
            fd,
            dev_id,
            inquiry_length: config.inquiry_length,
            max_responses: config.max_responses,
        })
    }

    fn send_name_request(&self, addr: &BdAddr) -> io::Result<()> {
        let mut packet = [0u8; 4 + 10];
        packet[0] = sys::HCI_COMMAND_PKT;
        packet[1..3].copy_from_slice(&sys::OPCODE_REMOTE_NAME_REQ.to_le_bytes());
        packet[3] = 10;
        packet[4..10].copy_from_slice(&addr.to_le_bytes());
        packet[10] = DEFAULT_PSCAN_REP_MODE;
        // packet[11] reserved, packet[12..14] clock offset: zero

        // SAFETY: `packet` is valid for reads of its full length.
        let n = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                packet.as_ptr().cast(),
                packet.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        if n as usize != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "short write of hci command",
            ));
        }
        Ok(())
    }

    fn read_event(&self, buf: &mut [u8; MAX_EVENT_LEN]) -> io::Result<(u8, usize)> {
        loop {
            // SAFETY: `buf` is valid for writes of its full length.
            let n = unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted => continue,
                    io::ErrorKind::WouldBlock => {
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            "remote name request timed out",
                        ))
                    }
                    _ => return Err(err),
                }
            }
            let n = n as usize;
            if n < 3 || buf[0] != sys::HCI_EVENT_PKT {
                continue;
            }
            let plen = usize::from(buf[2]).min(n - 3);
            return Ok((buf[1], plen));
        }
    }
}

impl PeerScanner for HciScanner {
    fn scan(&mut self) -> io::Result<Vec<BdAddr>> {
        let max = usize::from(self.max_responses);
        let mut buf = vec![0u8; sys::INQUIRY_REQ_LEN + max * sys::INQUIRY_INFO_LEN];
        buf[0..2].copy_from_slice(&self.dev_id.to_ne_bytes());
        buf[2..4].copy_from_slice(&sys::IREQ_CACHE_FLUSH.to_ne_bytes());
        buf[4..7].copy_from_slice(&sys::GIAC_LAP);
        buf[7] = self.inquiry_length;
        buf[8] = self.max_responses;

        // SAFETY: `buf` holds an hci_inquiry_req followed by room for
        // `max_responses` inquiry_info records, as HCIINQUIRY requires.
        let rc = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                sys::HCIINQUIRY as _,
                buf.as_mut_ptr(),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        let count = usize::from(buf[8]).min(max);
        let peers = buf[sys::INQUIRY_REQ_LEN..]
            .chunks_exact(sys::INQUIRY_INFO_LEN)
            .take(count)
            .map(|info| {
                let mut raw = [0u8; 6];
                raw.copy_from_slice(&info[..6]);
                BdAddr::from_le_bytes(raw)
            })
            .collect();
        Ok(peers)
    }

    fn remote_name(&mut self, addr: &BdAddr) -> io::Result<String> {
        self.send_name_request(addr)?;

        let mut buf = [0u8; MAX_EVENT_LEN];
        loop {
            let (event, plen) = self.read_event(&mut buf)?;
            let params = &buf[3..3 + plen];
            match event {
                sys::EVT_CMD_STATUS if params.len() >= 4 => {
                    let opcode = u16::from_le_bytes([params[2], params[3]]);
                    if opcode == sys::OPCODE_REMOTE_NAME_REQ && params[0] != 0 {
                        return Err(io::Error::other(format!(
                            "remote name request rejected (status {:#04x})",
                            params[0]
                        )));
                    }
                }
                sys::EVT_REMOTE_NAME_REQ_COMPLETE if params.len() >= 7 => {
                    let mut raw = [0u8; 6];
                    raw.copy_from_slice(&params[1..7]);
                    if BdAddr::from_le_bytes(raw) != *addr {
                        continue;
                    }
                    if params[0] != 0 {
                        return Err(io::Error::other(format!(
                            "remote name request failed (status {:#04x})",
                            params[0]
                        )));
                    }
                    let name = &params[7..params.len().min(7 + NAME_LEN)];
                    let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
                    let name = String::from_utf8_lossy(&name[..end]).into_owned();
                    trace!(%addr, name = %name, "remote name");
                    return Ok(name);
                }
                _ => {}
            }
        }
    }
}

fn open_hci_socket() -> io::Result<OwnedFd> {
    // SAFETY: plain socket(2) call; the result is checked before use.
    let raw = unsafe {
        libc::socket(
            libc::AF_BLUETOOTH,
            libc::SOCK_RAW | libc::SOCK_CLOEXEC,
            sys::BTPROTO_HCI,
        )
    };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
    Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

fn first_adapter_up() -> io::Result<u16> {
    let fd = open_hci_socket()?;
    let mut list = sys::HciDevListReq {
        dev_num: sys::HCI_MAX_DEV as u16,
        dev_req: [sys::HciDevReq::default(); sys::HCI_MAX_DEV],
    };

    // SAFETY: `list` is a valid hci_dev_list_req with room for `dev_num` entries.
    let rc = unsafe {
        libc::ioctl(
            fd.as_raw_fd(),
            sys::HCIGETDEVLIST as _,
            &mut list as *mut sys::HciDevListReq,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    let count = usize::from(list.dev_num).min(sys::HCI_MAX_DEV);
    list.dev_req[..count]
        .iter()
        .find(|dev| dev.dev_opt & (1 << sys::HCI_UP) != 0)
        .map(|dev| dev.dev_id)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no bluetooth adapter is up"))
}

fn set_sockopt<T>(
    fd: &OwnedFd,
    level: libc::c_int,
    name: libc::c_int,
    value: &T,
) -> io::Result<()> {
    // SAFETY: `value` is a live reference and its exact size is passed.
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            level,
            name,
            (value as *const T).cast::<libc::c_void>(),
            std::mem::size_of::<T>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn set_recv_timeout(fd: &OwnedFd, timeout: Duration) -> io::Result<()> {
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    set_sockopt(fd, libc::SOL_SOCKET, libc::SO_RCVTIMEO, &tv)
}
