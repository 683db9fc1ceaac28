//! Wire constants for the direct-command protocol.

/// First byte of every reply frame.
pub const REPLY_MARKER: u8 = 0x02;

/// Largest request a single command builds, header included.
pub const MAX_REQUEST_LEN: usize = 64;

/// Longest filename the brick accepts, excluding the NUL terminator.
pub const MAX_FILENAME_LEN: usize = 18;

/// Longest mailbox message payload, including its NUL terminator.
pub const MAX_MESSAGE_LEN: usize = 59;

/// Highest local mailbox index.
pub const MAX_INBOX: u8 = 9;

/// Highest remote mailbox index accepted by `MessageRead`.
pub const MAX_REMOTE_INBOX: u8 = 16;

/// Largest low-speed (I2C) transfer in either direction.
pub const MAX_LS_DATA: usize = 16;

pub const MIN_TONE_HZ: u16 = 200;
pub const MAX_TONE_HZ: u16 = 14_000;

/// Power and turn ratio are clamped to +/- this value.
pub const MAX_POWER: i8 = 100;

/// Whether the brick should answer a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplyMode {
    Expected = 0x00,
    NoReply = 0x80,
}

impl ReplyMode {
    pub fn from_flag(reply: bool) -> Self {
        if reply {
            Self::Expected
        } else {
            Self::NoReply
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Direct-command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    StartProgram = 0x00,
    StopProgram = 0x01,
    PlaySoundFile = 0x02,
    PlayTone = 0x03,
    SetOutputState = 0x04,
    SetInputMode = 0x05,
    GetOutputState = 0x06,
    GetInputValues = 0x07,
    ResetInputScaledValue = 0x08,
    MessageWrite = 0x09,
    ResetMotorPosition = 0x0A,
    GetBatteryLevel = 0x0B,
    StopSoundPlayback = 0x0C,
    KeepAlive = 0x0D,
    LsGetStatus = 0x0E,
    LsWrite = 0x0F,
    LsRead = 0x10,
    GetCurrentProgramName = 0x11,
    MessageRead = 0x13,
}

impl Opcode {
    pub const ALL: [Opcode; 19] = [
        Opcode::StartProgram,
        Opcode::StopProgram,
        Opcode::PlaySoundFile,
        Opcode::PlayTone,
        Opcode::SetOutputState,
        Opcode::SetInputMode,
        Opcode::GetOutputState,
        Opcode::GetInputValues,
        Opcode::ResetInputScaledValue,
        Opcode::MessageWrite,
        Opcode::ResetMotorPosition,
        Opcode::GetBatteryLevel,
        Opcode::StopSoundPlayback,
        Opcode::KeepAlive,
        Opcode::LsGetStatus,
        Opcode::LsWrite,
        Opcode::LsRead,
        Opcode::GetCurrentProgramName,
        Opcode::MessageRead,
    ];

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_byte() == byte)
    }

    /// Total reply length (marker, opcode and status included) for opcodes
    /// whose reply this library reads. `None` means the command is sent
    /// without asking for a reply.
    pub fn reply_len(self) -> Option<usize> {
        match self {
            Opcode::GetOutputState => Some(25),
            Opcode::GetInputValues => Some(16),
            Opcode::GetBatteryLevel => Some(5),
            Opcode::KeepAlive => Some(7),
            Opcode::LsGetStatus => Some(4),
            Opcode::LsRead => Some(20),
            Opcode::GetCurrentProgramName => Some(22),
            Opcode::MessageRead => Some(64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::StartProgram => "StartProgram",
            Opcode::StopProgram => "StopProgram",
            Opcode::PlaySoundFile => "PlaySoundFile",
            Opcode::PlayTone => "PlayTone",
            Opcode::SetOutputState => "SetOutputState",
            Opcode::SetInputMode => "SetInputMode",
            Opcode::GetOutputState => "GetOutputState",
            Opcode::GetInputValues => "GetInputValues",
            Opcode::ResetInputScaledValue => "ResetInputScaledValue",
            Opcode::MessageWrite => "MessageWrite",
            Opcode::ResetMotorPosition => "ResetMotorPosition",
            Opcode::GetBatteryLevel => "GetBatteryLevel",
            Opcode::StopSoundPlayback => "StopSoundPlayback",
            Opcode::KeepAlive => "KeepAlive",
            Opcode::LsGetStatus => "LsGetStatus",
            Opcode::LsWrite => "LsWrite",
            Opcode::LsRead => "LsRead",
            Opcode::GetCurrentProgramName => "GetCurrentProgramName",
            Opcode::MessageRead => "MessageRead",
        }
    }
}
