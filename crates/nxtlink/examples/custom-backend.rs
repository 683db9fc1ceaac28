//! Drive the codec through a user-supplied backend.
//!
//! The backend here is a stand-in brick that answers battery and keep-alive
//! queries, which is handy for exercising client code without hardware.

use std::collections::VecDeque;

use nxtlink::transport::{Backend, Result};
use nxtlink::{commands, Connection};

#[derive(Default)]
struct SimulatedBrick {
    pending: VecDeque<Vec<u8>>,
}

impl Backend for SimulatedBrick {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let reply = self.pending.pop_front().unwrap_or_default();
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn write(&mut self, request: &[u8]) -> Result<usize> {
        // Only requests with the reply bit clear get an answer.
        if let [0x00, opcode, ..] = request {
            let opcode = *opcode;
            let reply = match opcode {
                0x0B => Some(vec![0x02, opcode, 0x00, 0x1C, 0x1D]),
                0x0D => Some(vec![0x02, opcode, 0x00, 0xC0, 0x27, 0x09, 0x00]),
                _ => None,
            };
            self.pending.extend(reply);
        }
        Ok(request.len())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "simulated"
    }
}

fn main() -> nxtlink::Result<()> {
    let mut conn = Connection::open_custom(SimulatedBrick::default());

    let millivolts = commands::get_battery_level(&mut conn)?;
    let sleep_ms = commands::keep_alive(&mut conn)?;
    println!("battery {millivolts} mV, sleeps after {} min", sleep_ms / 60_000);

    commands::play_tone(&mut conn, 440, 100)?;
    conn.close()
}
