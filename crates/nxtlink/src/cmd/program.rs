use nxtlink::{commands, Connection};

use crate::cmd::{Ack, StartArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn start(conn: &mut Connection, args: StartArgs, format: OutputFormat) -> CliResult<i32> {
    commands::start_program(conn, &args.name).map_err(|err| command_error("start", err))?;
    let ack = Ack {
        command: "start",
        detail: args.name,
    };
    print_report(&ack, format);
    Ok(SUCCESS)
}

pub fn stop(conn: &mut Connection, format: OutputFormat) -> CliResult<i32> {
    commands::stop_program(conn).map_err(|err| command_error("stop", err))?;
    let ack = Ack {
        command: "stop",
        detail: String::new(),
    };
    print_report(&ack, format);
    Ok(SUCCESS)
}
