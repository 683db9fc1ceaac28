use nxtlink_transport::TransportError;

/// Errors that can occur while framing packets on a stream backend.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The underlying backend failed, or stopped producing/accepting bytes.
    #[error("frame transport error: {0}")]
    Transport(#[from] TransportError),

    /// The stream yielded part of a length header and then stopped.
    #[error("short envelope header ({got} of 2 bytes)")]
    ShortHeader { got: usize },

    /// The body cannot be described by a 16-bit length.
    #[error("packet body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
