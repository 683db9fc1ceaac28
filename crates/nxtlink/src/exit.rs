use std::fmt;
use std::io;

use nxtlink::transport::TransportError;
use nxtlink::Error;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DEVICE_ERROR: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn transport_code(err: &TransportError) -> i32 {
    match err {
        TransportError::Io(source) | TransportError::Connect { source, .. }
            if matches!(
                source.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) =>
        {
            TIMEOUT
        }
        _ => TRANSPORT_ERROR,
    }
}

/// Map a command failure to an exit code, prefixing the message with what
/// the CLI was doing.
pub fn command_error(context: &str, err: Error) -> CliError {
    let code = match &err {
        Error::Transport(source) | Error::CannotConnect(source) => transport_code(source),
        Error::BackendUnavailable(_) => TRANSPORT_ERROR,
        Error::Device(_) => DEVICE_ERROR,
        Error::InvalidArgument(_) | Error::FilenameTooLong { .. } => USAGE,
        Error::Timeout(_) => TIMEOUT,
        Error::Framing(_) | Error::BufferTooSmall { .. } | Error::PortMismatch { .. } => FAILURE,
        Error::EntityClosed => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
