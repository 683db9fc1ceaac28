use nxtlink::{commands, Connection, DeviceStatus, Error};
use serde::Serialize;

use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize, Debug, PartialEq)]
pub struct BatteryReport {
    millivolts: u16,
    volts: f64,
}

impl Report for BatteryReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("millivolts", self.millivolts.to_string()),
            ("volts", format!("{:.2}", self.volts)),
        ]
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct KeepAliveReport {
    sleep_timeout_ms: u32,
}

impl Report for KeepAliveReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let timeout = match self.sleep_timeout_ms {
            0 => "never".to_string(),
            ms => format!("{} min", ms / 60_000),
        };
        vec![("sleep timeout", timeout)]
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ProgramReport {
    running: bool,
    name: Option<String>,
}

impl Report for ProgramReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![(
            "program",
            self.name.clone().unwrap_or_else(|| "(none)".to_string()),
        )]
    }
}

fn battery_report(conn: &mut Connection) -> nxtlink::Result<BatteryReport> {
    let millivolts = commands::get_battery_level(conn)?;
    Ok(BatteryReport {
        millivolts,
        volts: f64::from(millivolts) / 1000.0,
    })
}

fn program_report(conn: &mut Connection) -> nxtlink::Result<ProgramReport> {
    match commands::get_current_program_name(conn) {
        Ok(name) => Ok(ProgramReport {
            running: true,
            name: Some(name),
        }),
        Err(Error::Device(DeviceStatus::NoActiveProgram)) => Ok(ProgramReport {
            running: false,
            name: None,
        }),
        Err(err) => Err(err),
    }
}

pub fn battery(conn: &mut Connection, format: OutputFormat) -> CliResult<i32> {
    let report = battery_report(conn).map_err(|err| command_error("battery", err))?;
    print_report(&report, format);
    Ok(SUCCESS)
}

pub fn keepalive(conn: &mut Connection, format: OutputFormat) -> CliResult<i32> {
    let sleep_timeout_ms =
        commands::keep_alive(conn).map_err(|err| command_error("keepalive", err))?;
    print_report(&KeepAliveReport { sleep_timeout_ms }, format);
    Ok(SUCCESS)
}

pub fn program(conn: &mut Connection, format: OutputFormat) -> CliResult<i32> {
    let report = program_report(conn).map_err(|err| command_error("program", err))?;
    print_report(&report, format);
    Ok(SUCCESS)
}
