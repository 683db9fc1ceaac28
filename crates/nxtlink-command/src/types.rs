//! Port identifiers and the small value types carried by output and input
//! commands.

use std::fmt;
use std::ops::BitOr;

use crate::error::{Error, Result};

/// A motor output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutputPort {
    A = 0x00,
    B = 0x01,
    C = 0x02,
    /// Addresses all three motors at once. Only meaningful for commands.
    All = 0xFF,
}

impl OutputPort {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OutputPort {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(Self::A),
            0x01 => Ok(Self::B),
            0x02 => Ok(Self::C),
            0xFF => Ok(Self::All),
            _ => Err(Error::InvalidArgument("output port must be 0, 1, 2 or 0xFF")),
        }
    }
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
            Self::C => f.write_str("C"),
            Self::All => f.write_str("all"),
        }
    }
}

/// A sensor input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputPort {
    One = 0x00,
    Two = 0x01,
    Three = 0x02,
    Four = 0x03,
}

impl InputPort {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for InputPort {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(Self::One),
            0x01 => Ok(Self::Two),
            0x02 => Ok(Self::Three),
            0x03 => Ok(Self::Four),
            _ => Err(Error::InvalidArgument("input port must be 0 to 3")),
        }
    }
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() + 1)
    }
}

macro_rules! byte_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u8);

        impl $name {
            pub fn bits(self) -> u8 {
                self.0
            }
        }

        impl From<u8> for $name {
            fn from(byte: u8) -> Self {
                Self(byte)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#04x}", self.0)
            }
        }
    };
}

byte_value!(
    /// Output mode flags. Combine with `|`.
    MotorMode
);

impl MotorMode {
    pub const IDLE: Self = Self(0x00);
    pub const MOTOR_ON: Self = Self(0x01);
    pub const BRAKE: Self = Self(0x02);
    pub const REGULATED: Self = Self(0x04);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MotorMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

byte_value!(
    /// Speed regulation applied to a motor.
    RegulationMode
);

impl RegulationMode {
    pub const IDLE: Self = Self(0x00);
    pub const MOTOR_SPEED: Self = Self(0x01);
    pub const MOTOR_SYNC: Self = Self(0x02);
}

byte_value!(
    /// Motor run state.
    RunState
);

impl RunState {
    pub const IDLE: Self = Self(0x00);
    pub const RAMP_UP: Self = Self(0x10);
    pub const RUNNING: Self = Self(0x20);
    pub const RAMP_DOWN: Self = Self(0x40);
}

byte_value!(
    /// Sensor type attached to an input port.
    SensorType
);

impl SensorType {
    pub const NO_SENSOR: Self = Self(0x00);
    pub const SWITCH: Self = Self(0x01);
    pub const TEMPERATURE: Self = Self(0x02);
    pub const REFLECTION: Self = Self(0x03);
    pub const ANGLE: Self = Self(0x04);
    pub const LIGHT_ACTIVE: Self = Self(0x05);
    pub const LIGHT_INACTIVE: Self = Self(0x06);
    pub const SOUND_DB: Self = Self(0x07);
    pub const SOUND_DBA: Self = Self(0x08);
    pub const CUSTOM: Self = Self(0x09);
    pub const LOWSPEED: Self = Self(0x0A);
    pub const LOWSPEED_9V: Self = Self(0x0B);
    pub const HIGHSPEED: Self = Self(0x0C);
    pub const COLOR_FULL: Self = Self(0x0D);
    pub const COLOR_RED: Self = Self(0x0E);
    pub const COLOR_GREEN: Self = Self(0x0F);
    pub const COLOR_BLUE: Self = Self(0x10);
    pub const COLOR_NONE: Self = Self(0x11);
}

byte_value!(
    /// Sensor mode. The high three bits select the mode; the low five bits
    /// carry an optional slope.
    SensorMode
);

impl SensorMode {
    pub const RAW: Self = Self(0x00);
    pub const BOOLEAN: Self = Self(0x20);
    pub const TRANSITION_COUNT: Self = Self(0x40);
    pub const PERIOD_COUNTER: Self = Self(0x60);
    pub const PCT_FULL_SCALE: Self = Self(0x80);
    pub const CELSIUS: Self = Self(0xA0);
    pub const FAHRENHEIT: Self = Self(0xC0);
    pub const ANGLE_STEPS: Self = Self(0xE0);

    pub const SLOPE_MASK: u8 = 0x1F;
    pub const MODE_MASK: u8 = 0xE0;

    /// Combine a mode with a slope; the slope is truncated to five bits.
    pub fn with_slope(self, slope: u8) -> Self {
        Self((self.0 & Self::MODE_MASK) | (slope & Self::SLOPE_MASK))
    }

    pub fn mode(self) -> Self {
        Self(self.0 & Self::MODE_MASK)
    }

    pub fn slope(self) -> u8 {
        self.0 & Self::SLOPE_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_mode_flags_combine() {
        let mode = MotorMode::MOTOR_ON | MotorMode::REGULATED;
        assert_eq!(mode.bits(), 0x05);
        assert!(mode.contains(MotorMode::MOTOR_ON));
        assert!(!mode.contains(MotorMode::BRAKE));
    }

    #[test]
    fn sensor_mode_splits_slope() {
        let mode = SensorMode::TRANSITION_COUNT.with_slope(0x3F);
        assert_eq!(mode.bits(), 0x5F);
        assert_eq!(mode.mode(), SensorMode::TRANSITION_COUNT);
        assert_eq!(mode.slope(), 0x1F);
    }

    #[test]
    fn ports_reject_unknown_bytes() {
        assert_eq!(OutputPort::try_from(0xFF).ok(), Some(OutputPort::All));
        assert!(OutputPort::try_from(0x03).is_err());
        assert_eq!(InputPort::try_from(0x03).ok(), Some(InputPort::Four));
        assert!(InputPort::try_from(0x04).is_err());
        assert_eq!(InputPort::Two.to_string(), "2");
    }
}
