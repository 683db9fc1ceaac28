/// Errors that can occur in backend operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An OS-level I/O error occurred on the backend.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A USB transfer failed.
    #[cfg(feature = "usb")]
    #[error("usb transfer error: {0}")]
    Usb(#[from] rusb::Error),

    /// Failed to connect to the specified radio address.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    /// No USB device with the requested identity is attached.
    #[error("no usb device {vendor:04x}:{product:04x} found")]
    DeviceNotFound { vendor: u16, product: u16 },

    /// The USB device was found but could not be claimed.
    #[cfg(feature = "usb")]
    #[error("failed to claim usb device {vendor:04x}:{product:04x}: {source}")]
    Claim {
        vendor: u16,
        product: u16,
        source: rusb::Error,
    },

    /// Discovery finished without a peer carrying the requested name.
    #[error("no radio peer named {0:?} found")]
    NameNotFound(String),

    /// The radio inquiry scan itself failed.
    #[error("radio discovery failed: {0}")]
    Discovery(std::io::Error),

    /// The destination is neither a hardware address nor a usable name.
    #[error("invalid radio destination: {0:?}")]
    InvalidAddress(String),

    /// The requested backend was not compiled into this build.
    #[error("{0} backend not available in this build")]
    Unsupported(&'static str),

    /// The peer stopped accepting or producing bytes.
    #[error("transport disconnected")]
    Disconnected,

    /// The backend has already been closed.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Whether this error was raised while establishing a connection, as
    /// opposed to during I/O on an open one.
    pub fn is_connect_failure(&self) -> bool {
        match self {
            TransportError::Connect { .. }
            | TransportError::DeviceNotFound { .. }
            | TransportError::NameNotFound(_)
            | TransportError::Discovery(_)
            | TransportError::InvalidAddress(_) => true,
            #[cfg(feature = "usb")]
            TransportError::Claim { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
