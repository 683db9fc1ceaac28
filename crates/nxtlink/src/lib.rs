//! Talk to LEGO NXT bricks using direct commands.
//!
//! nxtlink opens a link to a brick over Bluetooth (RFCOMM), USB, or a
//! transport you supply, and encodes every direct command as a plain function
//! call.
//!
//! ```no_run
//! use nxtlink::{commands, Connection};
//!
//! # fn main() -> nxtlink::Result<()> {
//! let mut conn = Connection::open()?;
//! let millivolts = commands::get_battery_level(&mut conn)?;
//! println!("battery at {millivolts} mV");
//! conn.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`transport`]: backend trait, Bluetooth and USB backends, discovery
//! - [`frame`]: length-prefixed packets over stream backends
//! - [`command`]: connection, direct-command codec and error taxonomy

/// Re-export transport types.
pub mod transport {
    pub use nxtlink_transport::*;
}

/// Re-export framing types.
pub mod frame {
    pub use nxtlink_frame::*;
}

/// Re-export connection and command types.
pub mod command {
    pub use nxtlink_command::*;
}

pub use nxtlink_command::{
    commands, Connection, DeviceStatus, Error, FramingViolation, InputPort, MotorMode, Opcode,
    OutputPort, OutputState, RegulationMode, Result, RunState, SensorMode, SensorType,
};
