use nxtlink::command::protocol::MAX_MESSAGE_LEN;
use nxtlink::{commands, Connection};
use serde::Serialize;

use crate::cmd::{Ack, ReadMessageArgs, SendMessageArgs};
use crate::exit::{command_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{message_preview, print_report, OutputFormat, Report};

#[derive(Serialize, Debug)]
pub struct MessageReport {
    remote: u8,
    local: u8,
    length: usize,
    text: String,
}

impl Report for MessageReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mailbox", self.remote.to_string()),
            ("length", self.length.to_string()),
            ("message", self.text.clone()),
        ]
    }
}

/// Message bytes as the brick expects them: NUL-terminated unless `raw`.
fn encode_message(text: &str, raw: bool) -> CliResult<Vec<u8>> {
    let mut data = text.as_bytes().to_vec();
    if !raw {
        data.push(0);
    }
    if data.len() > MAX_MESSAGE_LEN {
        return Err(CliError::new(
            USAGE,
            format!("message is {} bytes, the brick accepts {MAX_MESSAGE_LEN}", data.len()),
        ));
    }
    Ok(data)
}

pub fn send(conn: &mut Connection, args: SendMessageArgs, format: OutputFormat) -> CliResult<i32> {
    let data = encode_message(&args.text, args.raw)?;
    commands::message_write(conn, args.inbox, &data)
        .map_err(|err| command_error("send-message", err))?;
    let ack = Ack {
        command: "send-message",
        detail: format!("{} bytes to mailbox {}", data.len(), args.inbox),
    };
    print_report(&ack, format);
    Ok(SUCCESS)
}

fn read_report(conn: &mut Connection, args: &ReadMessageArgs) -> nxtlink::Result<MessageReport> {
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let length = commands::message_read(conn, args.remote, args.local, !args.keep, &mut buf)?;
    Ok(MessageReport {
        remote: args.remote,
        local: args.local,
        length,
        text: message_preview(&buf[..length]),
    })
}

pub fn read(conn: &mut Connection, args: ReadMessageArgs, format: OutputFormat) -> CliResult<i32> {
    let report = read_report(conn, &args).map_err(|err| command_error("read-message", err))?;
    print_report(&report, format);
    Ok(SUCCESS)
}
