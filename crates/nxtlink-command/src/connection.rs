use nxtlink_frame::FramedStream;
use nxtlink_transport::{Backend, RadioConfig, UsbConfig};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

#[cfg(all(feature = "radio", target_os = "linux"))]
use nxtlink_transport::RadioSocket;
#[cfg(feature = "usb")]
use nxtlink_transport::UsbBulk;

type BoxedBackend = Box<dyn Backend + Send>;

enum Link {
    /// Each USB bulk transfer is one protocol message.
    #[cfg(feature = "usb")]
    Packet(UsbBulk),
    /// A byte stream (RFCOMM or caller-supplied); packets are length-prefixed.
    Stream(FramedStream<BoxedBackend>),
    /// Caller-supplied transport, used unframed.
    Custom(BoxedBackend),
}

impl Link {
    fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "usb")]
            Link::Packet(usb) => usb.transport_name(),
            Link::Stream(framed) => framed.get_ref().transport_name(),
            Link::Custom(backend) => backend.transport_name(),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            #[cfg(feature = "usb")]
            Link::Packet(usb) => Ok(usb.read(buf)?),
            Link::Stream(framed) => Ok(framed.recv(buf)?),
            Link::Custom(backend) => Ok(backend.read(buf)?),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        match self {
            #[cfg(feature = "usb")]
            Link::Packet(usb) => Ok(usb.write(data)?),
            Link::Stream(framed) => Ok(framed.send(data)?),
            Link::Custom(backend) => Ok(backend.write(data)?),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            #[cfg(feature = "usb")]
            Link::Packet(usb) => Ok(usb.close()?),
            Link::Stream(framed) => Ok(framed.close()?),
            Link::Custom(backend) => Ok(backend.close()?),
        }
    }
}

/// An open link to one brick.
///
/// A connection is used from one thread at a time; every operation blocks.
/// Once closed, every operation fails with [`Error::EntityClosed`] and
/// further calls to [`Connection::close`] do nothing. Dropping an open
/// connection closes it.
pub struct Connection {
    link: Option<Link>,
}

impl Connection {
    fn from_link(link: Link) -> Self {
        debug!(transport = link.name(), "connection opened");
        Self { link: Some(link) }
    }

    /// Try Bluetooth to the default destination first, then USB with the
    /// default identity.
    pub fn open() -> Result<Self> {
        Self::first_available(
            || {
                info!("attempting bluetooth connection");
                Self::open_radio()
            },
            || {
                info!("attempting usb connection");
                Self::open_usb()
            },
        )
    }

    /// Run `fallback` only if `primary` fails; its error is the one reported.
    fn first_available<P, F>(primary: P, fallback: F) -> Result<Self>
    where
        P: FnOnce() -> Result<Self>,
        F: FnOnce() -> Result<Self>,
    {
        match primary() {
            Ok(conn) => return Ok(conn),
            Err(err) => info!(error = %err, "connection attempt failed, trying next backend"),
        }
        fallback().inspect_err(|err| info!(error = %err, "connection attempt failed"))
    }

    /// Connect over Bluetooth to a peer named `NXT`.
    pub fn open_radio() -> Result<Self> {
        Self::open_radio_address(nxtlink_transport::DEFAULT_RADIO_DESTINATION)
    }

    /// Connect over Bluetooth to a hardware address (`XX:XX:XX:XX:XX:XX`) or
    /// a friendly name resolved by scanning.
    pub fn open_radio_address(destination: &str) -> Result<Self> {
        Self::open_radio_with_config(destination, &RadioConfig::default())
    }

    pub fn open_radio_with_config(destination: &str, config: &RadioConfig) -> Result<Self> {
        #[cfg(all(feature = "radio", target_os = "linux"))]
        {
            let socket = RadioSocket::connect_with_config(destination, config)?;
            info!(address = %socket.address(), "bluetooth connection established");
            let inner: BoxedBackend = Box::new(socket);
            Ok(Self::from_link(Link::Stream(FramedStream::new(inner))))
        }
        #[cfg(any(not(feature = "radio"), not(target_os = "linux")))]
        {
            let _ = (destination, config);
            Err(Error::BackendUnavailable("radio"))
        }
    }

    /// Open the first USB device with the standard brick identity.
    pub fn open_usb() -> Result<Self> {
        Self::open_usb_vid_pid(
            nxtlink_transport::USB_VENDOR_LEGO,
            nxtlink_transport::USB_PRODUCT_NXT,
        )
    }

    pub fn open_usb_vid_pid(vendor: u16, product: u16) -> Result<Self> {
        Self::open_usb_with_config(vendor, product, &UsbConfig::default())
    }

    pub fn open_usb_with_config(vendor: u16, product: u16, config: &UsbConfig) -> Result<Self> {
        #[cfg(feature = "usb")]
        {
            let usb = UsbBulk::open_with_config(vendor, product, config)?;
            info!(vendor, product, "usb connection established");
            Ok(Self::from_link(Link::Packet(usb)))
        }
        #[cfg(not(feature = "usb"))]
        {
            let _ = (vendor, product, config);
            Err(Error::BackendUnavailable("usb"))
        }
    }

    /// Wrap a caller-supplied backend. Its reads and writes are passed through
    /// without framing, so each call must carry exactly one message.
    pub fn open_custom<B>(backend: B) -> Self
    where
        B: Backend + Send + 'static,
    {
        Self::from_link(Link::Custom(Box::new(backend)))
    }

    /// Wrap a caller-supplied byte-stream backend. Every message is sent and
    /// received inside a 2-byte little-endian length envelope, the same way
    /// the Bluetooth backend frames them.
    pub fn open_custom_stream<B>(backend: B) -> Self
    where
        B: Backend + Send + 'static,
    {
        let inner: BoxedBackend = Box::new(backend);
        Self::from_link(Link::Stream(FramedStream::new(inner)))
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Name of the backend in use, or `None` once closed.
    pub fn transport_name(&self) -> Option<&'static str> {
        self.link.as_ref().map(Link::name)
    }

    /// Read one message. On a stream backend an oversized packet is
    /// truncated to `buf.len()` and the rest discarded.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.link_mut()?.read(buf)
    }

    /// Write one message, returning how many bytes the backend accepted.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.link_mut()?.write(data)
    }

    /// Release the backend. Closing an already closed connection succeeds.
    ///
    /// The connection counts as closed even if the backend reports an error.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut link) = self.link.take() else {
            return Ok(());
        };
        debug!(transport = link.name(), "closing connection");
        link.close()
    }

    fn link_mut(&mut self) -> Result<&mut Link> {
        self.link.as_mut().ok_or(Error::EntityClosed)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close connection on drop");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("transport", &self.transport_name())
            .finish()
    }
}
