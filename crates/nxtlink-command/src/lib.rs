//! NXT direct-command codec and connection management.
//!
//! This is the layer client code talks to. Open a [`Connection`] over
//! Bluetooth, USB or a custom backend, then issue direct commands through the
//! functions in [`commands`]. Every failure comes back as one [`Error`] value,
//! whether it came from the operating system, the framing, or the brick.

pub mod commands;
pub mod connection;
pub mod direct;
pub mod error;
pub mod protocol;
pub mod status;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use commands::{
    get_battery_level, get_current_program_name, get_input_values, get_output_state, keep_alive,
    ls_get_status, ls_read, ls_write, message_read, message_write, play_sound_file, play_tone,
    reset_input_scaled_value, reset_motor_position, set_input_mode, set_output_state,
    start_program, stop_program, stop_sound_playback, InputValues, OutputState,
    OutputStateReply,
};
pub use connection::Connection;
pub use direct::{recv, send, Reply};
pub use error::{Error, FramingViolation, Result};
pub use protocol::{Opcode, ReplyMode};
pub use status::DeviceStatus;
pub use types::{
    InputPort, MotorMode, OutputPort, RegulationMode, RunState, SensorMode, SensorType,
};

pub use nxtlink_transport::{Backend, RadioConfig, TransportError, UsbConfig};
