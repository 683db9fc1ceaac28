use clap::{Args, Subcommand, ValueEnum};
use tracing::{debug, warn};

use nxtlink::{Connection, OutputPort};

use crate::exit::{command_error, CliResult};
use crate::output::OutputFormat;

pub mod mailbox;
pub mod motor;
pub mod program;
pub mod sensor;
pub mod sound;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    #[command(flatten)]
    Brick(BrickCommand),
}

/// Subcommands that talk to a brick.
#[derive(Subcommand, Debug)]
pub enum BrickCommand {
    /// Read the battery voltage.
    Battery,
    /// Reset the sleep timer and print the sleep timeout.
    Keepalive,
    /// Play a tone.
    Tone(ToneArgs),
    /// Start a program stored on the brick.
    Start(StartArgs),
    /// Stop the running program.
    Stop,
    /// Print the name of the running program.
    Program,
    /// Write a message to one of the brick's mailboxes.
    SendMessage(SendMessageArgs),
    /// Read a message from one of the brick's mailboxes.
    ReadMessage(ReadMessageArgs),
    /// Print the state of a motor output.
    Output(OutputArgs),
    /// Print the readings of a sensor input.
    Input(InputArgs),
}

/// How to reach the brick. `--usb` wins over `--address`; with neither, try
/// Bluetooth to a brick named `NXT` and then USB.
#[derive(Args, Debug, Default)]
pub struct Target {
    /// Bluetooth address (XX:XX:XX:XX:XX:XX) or friendly name of the brick.
    #[arg(long, short = 'a', env = "NXTLINK_ADDRESS", global = true)]
    pub address: Option<String>,
    /// Connect over USB.
    #[arg(long, global = true)]
    pub usb: bool,
}

pub fn run(command: Command, target: &Target, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Brick(command) => {
            let mut conn = connect(target)?;
            let result = dispatch(&mut conn, command, format);
            if let Err(err) = conn.close() {
                warn!(error = %err, "failed to close connection");
            }
            result
        }
    }
}

fn dispatch(conn: &mut Connection, command: BrickCommand, format: OutputFormat) -> CliResult<i32> {
    match command {
        BrickCommand::Battery => status::battery(conn, format),
        BrickCommand::Keepalive => status::keepalive(conn, format),
        BrickCommand::Program => status::program(conn, format),
        BrickCommand::Tone(args) => sound::run(conn, args, format),
        BrickCommand::Start(args) => program::start(conn, args, format),
        BrickCommand::Stop => program::stop(conn, format),
        BrickCommand::SendMessage(args) => mailbox::send(conn, args, format),
        BrickCommand::ReadMessage(args) => mailbox::read(conn, args, format),
        BrickCommand::Output(args) => motor::run(conn, args, format),
        BrickCommand::Input(args) => sensor::run(conn, args, format),
    }
}

fn connect(target: &Target) -> CliResult<Connection> {
    let result = if target.usb {
        debug!("connecting over usb");
        Connection::open_usb()
    } else if let Some(address) = target.address.as_deref() {
        debug!(address, "connecting over bluetooth");
        Connection::open_radio_address(address)
    } else {
        Connection::open()
    };
    result.map_err(|err| command_error("connect failed", err))
}

#[derive(Args, Debug)]
pub struct ToneArgs {
    /// Frequency in Hz (the brick plays 200 to 14000).
    #[arg(long, short = 'f', default_value = "440")]
    pub frequency: u16,
    /// Duration in milliseconds.
    #[arg(long, short = 'd', default_value = "500")]
    pub duration: u16,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Program file name, e.g. `demo.rxe`.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct SendMessageArgs {
    /// Mailbox to write to.
    #[arg(
        long,
        short = 'i',
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub inbox: u8,
    /// Send the text without a trailing NUL.
    #[arg(long)]
    pub raw: bool,
    /// Message text.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ReadMessageArgs {
    /// Brick-side mailbox to read from.
    #[arg(
        long,
        short = 'r',
        default_value = "10",
        value_parser = clap::value_parser!(u8).range(0..=16)
    )]
    pub remote: u8,
    /// Local mailbox the message is routed through.
    #[arg(
        long,
        short = 'l',
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub local: u8,
    /// Leave the message in the queue.
    #[arg(long)]
    pub keep: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MotorPort {
    A,
    B,
    C,
}

impl From<MotorPort> for OutputPort {
    fn from(port: MotorPort) -> Self {
        match port {
            MotorPort::A => OutputPort::A,
            MotorPort::B => OutputPort::B,
            MotorPort::C => OutputPort::C,
        }
    }
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Motor port.
    #[arg(value_enum, ignore_case = true)]
    pub port: MotorPort,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Sensor port, as labelled on the brick.
    #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
    pub port: u8,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

/// Printed by commands the brick does not answer.
#[derive(serde::Serialize)]
pub struct Ack {
    pub command: &'static str,
    pub detail: String,
}

impl crate::output::Report for Ack {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("command", self.command.to_string()), ("sent", self.detail.clone())]
    }
}
