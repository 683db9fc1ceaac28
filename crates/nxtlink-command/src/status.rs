use std::fmt;

/// A nonzero status byte reported by the brick in a reply frame.
///
/// Known firmware codes get their own variant; anything else is kept verbatim
/// in [`DeviceStatus::Unknown`]. [`DeviceStatus::code`] always returns the
/// original byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    PendingCommunication,
    MailboxQueueEmpty,
    RequestFailed,
    UnknownOpcode,
    InsanePacket,
    OutOfRange,
    BusError,
    BufferOutOfMemory,
    ConnectionNotValid,
    ConnectionNotConfigured,
    NoActiveProgram,
    IllegalSize,
    IllegalMailboxQueue,
    InvalidField,
    BadInputOutput,
    InsufficientMemory,
    BadArguments,
    Unknown(u8),
}

impl DeviceStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x20 => Self::PendingCommunication,
            0x40 => Self::MailboxQueueEmpty,
            0xBD => Self::RequestFailed,
            0xBE => Self::UnknownOpcode,
            0xBF => Self::InsanePacket,
            0xC0 => Self::OutOfRange,
            0xDD => Self::BusError,
            0xDE => Self::BufferOutOfMemory,
            0xDF => Self::ConnectionNotValid,
            0xE0 => Self::ConnectionNotConfigured,
            0xEC => Self::NoActiveProgram,
            0xED => Self::IllegalSize,
            0xEE => Self::IllegalMailboxQueue,
            0xEF => Self::InvalidField,
            0xF0 => Self::BadInputOutput,
            0xFB => Self::InsufficientMemory,
            0xFF => Self::BadArguments,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::PendingCommunication => 0x20,
            Self::MailboxQueueEmpty => 0x40,
            Self::RequestFailed => 0xBD,
            Self::UnknownOpcode => 0xBE,
            Self::InsanePacket => 0xBF,
            Self::OutOfRange => 0xC0,
            Self::BusError => 0xDD,
            Self::BufferOutOfMemory => 0xDE,
            Self::ConnectionNotValid => 0xDF,
            Self::ConnectionNotConfigured => 0xE0,
            Self::NoActiveProgram => 0xEC,
            Self::IllegalSize => 0xED,
            Self::IllegalMailboxQueue => 0xEE,
            Self::InvalidField => 0xEF,
            Self::BadInputOutput => 0xF0,
            Self::InsufficientMemory => 0xFB,
            Self::BadArguments => 0xFF,
            Self::Unknown(code) => code,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PendingCommunication => "pending communication transaction in progress",
            Self::MailboxQueueEmpty => "specified mailbox queue is empty",
            Self::RequestFailed => "request failed (e.g. specified file not found)",
            Self::UnknownOpcode => "unknown command opcode",
            Self::InsanePacket => "insane packet",
            Self::OutOfRange => "data contains out-of-range values",
            Self::BusError => "communication bus error",
            Self::BufferOutOfMemory => "no free memory in communication buffer",
            Self::ConnectionNotValid => "specified channel/connection is not valid",
            Self::ConnectionNotConfigured => "specified channel/connection not configured or busy",
            Self::NoActiveProgram => "no active program",
            Self::IllegalSize => "illegal size specified",
            Self::IllegalMailboxQueue => "illegal mailbox queue ID specified",
            Self::InvalidField => "attempted to access invalid field of a structure",
            Self::BadInputOutput => "bad input or output specified",
            Self::InsufficientMemory => "insufficient memory available",
            Self::BadArguments => "bad arguments",
            Self::Unknown(_) => "unknown brick error",
        }
    }
}

impl From<u8> for DeviceStatus {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
