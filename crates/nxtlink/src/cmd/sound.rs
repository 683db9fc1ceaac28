use nxtlink::{commands, Connection};

use crate::cmd::{Ack, ToneArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(conn: &mut Connection, args: ToneArgs, format: OutputFormat) -> CliResult<i32> {
    commands::play_tone(conn, args.frequency, args.duration)
        .map_err(|err| command_error("tone", err))?;
    let ack = Ack {
        command: "tone",
        detail: format!("{} Hz for {} ms", args.frequency, args.duration),
    };
    print_report(&ack, format);
    Ok(SUCCESS)
}
