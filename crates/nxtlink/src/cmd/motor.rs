use nxtlink::command::OutputStateReply;
use nxtlink::{commands, Connection, MotorMode, RunState};
use serde::Serialize;

use crate::cmd::OutputArgs;
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize, Debug, PartialEq)]
pub struct OutputReport {
    port: String,
    power: i8,
    mode: u8,
    regulation: u8,
    turn_ratio: i8,
    run_state: &'static str,
    tacho_limit: u32,
    tacho_count: i32,
    block_tacho_count: i32,
    rotation_count: i32,
}

fn run_state_name(state: RunState) -> &'static str {
    match state {
        RunState::IDLE => "idle",
        RunState::RAMP_UP => "ramp-up",
        RunState::RUNNING => "running",
        RunState::RAMP_DOWN => "ramp-down",
        _ => "unknown",
    }
}

fn mode_flags(mode: MotorMode) -> String {
    let flags: Vec<_> = [
        (MotorMode::MOTOR_ON, "on"),
        (MotorMode::BRAKE, "brake"),
        (MotorMode::REGULATED, "regulated"),
    ]
    .into_iter()
    .filter(|(flag, _)| mode.contains(*flag))
    .map(|(_, name)| name)
    .collect();
    if flags.is_empty() {
        "coast".to_string()
    } else {
        flags.join("+")
    }
}

impl From<OutputStateReply> for OutputReport {
    fn from(state: OutputStateReply) -> Self {
        Self {
            port: state.port.to_string(),
            power: state.power,
            mode: state.mode.bits(),
            regulation: state.regulation.bits(),
            turn_ratio: state.turn_ratio,
            run_state: run_state_name(state.run_state),
            tacho_limit: state.tacho_limit,
            tacho_count: state.tacho_count,
            block_tacho_count: state.block_tacho_count,
            rotation_count: state.rotation_count,
        }
    }
}

impl Report for OutputReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("port", self.port.clone()),
            ("power", self.power.to_string()),
            ("mode", mode_flags(MotorMode(self.mode))),
            ("regulation", self.regulation.to_string()),
            ("turn ratio", self.turn_ratio.to_string()),
            ("run state", self.run_state.to_string()),
            ("tacho limit", self.tacho_limit.to_string()),
            ("tacho count", self.tacho_count.to_string()),
            ("block tacho count", self.block_tacho_count.to_string()),
            ("rotation count", self.rotation_count.to_string()),
        ]
    }
}

pub fn run(conn: &mut Connection, args: OutputArgs, format: OutputFormat) -> CliResult<i32> {
    let state = commands::get_output_state(conn, args.port.into())
        .map_err(|err| command_error("output", err))?;
    print_report(&OutputReport::from(state), format);
    Ok(SUCCESS)
}
