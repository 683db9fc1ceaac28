use std::time::Duration;

use nxtlink_frame::FrameError;
use nxtlink_transport::TransportError;

use crate::status::DeviceStatus;

/// Ways a reply (or an outgoing request) can violate the wire format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingViolation {
    /// The backend delivered a reply of the wrong length.
    #[error("short reply ({actual} of {expected} bytes)")]
    ShortReply { expected: usize, actual: usize },

    /// The first reply byte was not the reply marker.
    #[error("bad reply marker {0:#04x}")]
    BadMarker(u8),

    /// The reply echoes a different opcode than the request carried.
    #[error("reply opcode {actual:#04x} does not match request {expected:#04x}")]
    OpcodeMismatch { expected: u8, actual: u8 },

    /// The stream yielded part of a length header and then stopped.
    #[error("short envelope header ({got} of 2 bytes)")]
    ShortHeader { got: usize },

    /// The backend accepted fewer bytes than the request holds.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { expected: usize, written: usize },

    /// The packet cannot be described by a 16-bit length.
    #[error("packet body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },
}

/// Every failure a direct command can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operating system or USB stack rejected an I/O call.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The bytes on the wire did not form a valid reply.
    #[error("framing violation: {0}")]
    Framing(#[from] FramingViolation),

    /// The brick answered with a nonzero status byte.
    #[error("brick reported {0} (status {code:#04x})", code = .0.code())]
    Device(DeviceStatus),

    /// A caller-supplied argument was rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A filename exceeds the firmware's limit.
    #[error("filename too long ({len} bytes, max {max})")]
    FilenameTooLong { len: usize, max: usize },

    /// The reply carried more data than the caller's buffer holds.
    /// The buffer still receives as much of the data as fits.
    #[error("buffer too small ({needed} bytes needed, {available} available)")]
    BufferTooSmall { needed: usize, available: usize },

    /// The connection has already been closed.
    #[error("operation attempted on a closed connection")]
    EntityClosed,

    /// The requested backend was not compiled into this build.
    #[error("{0} backend not available in this build")]
    BackendUnavailable(&'static str),

    /// Discovery or connection setup failed.
    #[error("cannot establish connection: {0}")]
    CannotConnect(#[source] TransportError),

    /// The reply describes a different port than the one requested.
    #[error("reply for port {actual} does not match requested port {expected}")]
    PortMismatch { expected: u8, actual: u8 },

    /// A blocking operation gave up waiting.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// The brick status behind a [`Error::Device`] failure, if any.
    pub fn device_status(&self) -> Option<DeviceStatus> {
        match self {
            Error::Device(status) => Some(*status),
            _ => None,
        }
    }

    /// Whether the error means the connection should be considered dead.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Error::EntityClosed | Error::Transport(TransportError::Disconnected)
        )
    }
}

impl From<DeviceStatus> for Error {
    fn from(status: DeviceStatus) -> Self {
        Error::Device(status)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unsupported(backend) => Error::BackendUnavailable(backend),
            TransportError::Closed => Error::EntityClosed,
            err if err.is_connect_failure() => Error::CannotConnect(err),
            err => Error::Transport(err),
        }
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Transport(err) => err.into(),
            FrameError::ShortHeader { got } => FramingViolation::ShortHeader { got }.into(),
            FrameError::BodyTooLarge { size, max } => {
                FramingViolation::BodyTooLarge { size, max }.into()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_routed_by_kind() {
        let err: Error = TransportError::Unsupported("radio").into();
        assert!(matches!(err, Error::BackendUnavailable("radio")));

        let err: Error = TransportError::Closed.into();
        assert!(matches!(err, Error::EntityClosed));

        let err: Error = TransportError::NameNotFound("NXT".into()).into();
        assert!(matches!(err, Error::CannotConnect(_)));

        let err: Error = TransportError::Disconnected.into();
        assert!(err.is_disconnect());
    }

    #[test]
    fn frame_errors_become_framing_violations() {
        let err: Error = FrameError::ShortHeader { got: 1 }.into();
        assert!(matches!(
            err,
            Error::Framing(FramingViolation::ShortHeader { got: 1 })
        ));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = FrameError::Transport(TransportError::Io(io)).into();
        assert!(matches!(err, Error::Transport(TransportError::Io(_))));
    }

    #[test]
    fn device_error_names_the_status() {
        let err = Error::from(DeviceStatus::NoActiveProgram);
        assert_eq!(err.device_status(), Some(DeviceStatus::NoActiveProgram));
        assert_eq!(
            err.to_string(),
            "brick reported no active program (status 0xec)"
        );
    }
}
