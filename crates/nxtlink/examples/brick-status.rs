//! Print a status summary for the nearest brick.
//!
//! Usage: cargo run --example brick-status [-- <address-or-name>]

use nxtlink::{commands, Connection, DeviceStatus, Error};

fn main() -> nxtlink::Result<()> {
    let mut conn = match std::env::args().nth(1) {
        Some(destination) => Connection::open_radio_address(&destination)?,
        None => Connection::open()?,
    };
    println!("connected via {}", conn.transport_name().unwrap_or("?"));

    let millivolts = commands::get_battery_level(&mut conn)?;
    println!("battery: {:.2} V", f64::from(millivolts) / 1000.0);

    let sleep_ms = commands::keep_alive(&mut conn)?;
    println!("sleep timeout: {} min", sleep_ms / 60_000);

    match commands::get_current_program_name(&mut conn) {
        Ok(name) => println!("running: {name}"),
        Err(Error::Device(DeviceStatus::NoActiveProgram)) => println!("running: nothing"),
        Err(err) => return Err(err),
    }

    commands::play_tone(&mut conn, 880, 200)?;
    conn.close()
}
