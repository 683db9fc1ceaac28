//! One function per direct command.
//!
//! Commands that expect no reply return as soon as the request is written.
//! Queries block until the brick answers. Arguments are checked before any
//! byte is written, so a rejected call leaves the connection untouched.

use bytes::Buf;
use tracing::debug;

use crate::connection::Connection;
use crate::direct::{recv, transmit, Request};
use crate::error::{Error, Result};
use crate::protocol::{
    Opcode, ReplyMode, MAX_FILENAME_LEN, MAX_INBOX, MAX_LS_DATA, MAX_MESSAGE_LEN, MAX_POWER,
    MAX_REMOTE_INBOX, MAX_TONE_HZ, MIN_TONE_HZ,
};
use crate::types::{
    InputPort, MotorMode, OutputPort, RegulationMode, RunState, SensorMode, SensorType,
};

const PROGRAM_NAME_LEN: usize = MAX_FILENAME_LEN + 1;

/// Motor settings written by [`set_output_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputState {
    pub port: OutputPort,
    /// Clamped to -100..=100 when sent.
    pub power: i8,
    pub mode: MotorMode,
    pub regulation: RegulationMode,
    /// Clamped to -100..=100 when sent.
    pub turn_ratio: i8,
    pub run_state: RunState,
    /// Degrees to run for; zero runs forever.
    pub tacho_limit: u32,
}

impl OutputState {
    /// All fields zero: the motor coasts.
    pub fn idle(port: OutputPort) -> Self {
        Self {
            port,
            power: 0,
            mode: MotorMode::IDLE,
            regulation: RegulationMode::IDLE,
            turn_ratio: 0,
            run_state: RunState::IDLE,
            tacho_limit: 0,
        }
    }
}

/// Motor state reported by [`get_output_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStateReply {
    pub port: OutputPort,
    pub power: i8,
    pub mode: MotorMode,
    pub regulation: RegulationMode,
    pub turn_ratio: i8,
    pub run_state: RunState,
    pub tacho_limit: u32,
    /// Count since the last motor reset.
    pub tacho_count: i32,
    /// Count since the last programmed movement.
    pub block_tacho_count: i32,
    /// Count since the last position reset.
    pub rotation_count: i32,
}

/// Sensor readings reported by [`get_input_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValues {
    pub port: InputPort,
    pub valid: bool,
    pub calibrated: bool,
    pub sensor_type: SensorType,
    pub sensor_mode: SensorMode,
    pub raw: u16,
    pub normalized: u16,
    pub scaled: i16,
    pub calibrated_value: i16,
}

fn check_filename(name: &str) -> Result<()> {
    if name.as_bytes().contains(&0) {
        return Err(Error::InvalidArgument("filename contains a NUL byte"));
    }
    if name.len() > MAX_FILENAME_LEN {
        return Err(Error::FilenameTooLong {
            len: name.len(),
            max: MAX_FILENAME_LEN,
        });
    }
    Ok(())
}

fn check_port(expected: u8, actual: u8) -> Result<()> {
    if expected != actual {
        return Err(Error::PortMismatch { expected, actual });
    }
    Ok(())
}

/// Start a program stored on the brick. `name` is at most 18 bytes.
pub fn start_program(conn: &mut Connection, name: &str) -> Result<()> {
    check_filename(name)?;
    let mut request = Request::new(ReplyMode::NoReply, Opcode::StartProgram);
    request.put_slice(name.as_bytes()).put_u8(0);
    transmit(conn, &request)
}

pub fn stop_program(conn: &mut Connection) -> Result<()> {
    transmit(conn, &Request::new(ReplyMode::NoReply, Opcode::StopProgram))
}

pub fn play_sound_file(conn: &mut Connection, looped: bool, name: &str) -> Result<()> {
    check_filename(name)?;
    let mut request = Request::new(ReplyMode::NoReply, Opcode::PlaySoundFile);
    request
        .put_bool(looped)
        .put_slice(name.as_bytes())
        .put_u8(0);
    transmit(conn, &request)
}

/// Play a tone. The frequency is clamped to 200..=14000 Hz; the duration is in
/// milliseconds.
pub fn play_tone(conn: &mut Connection, frequency: u16, duration_ms: u16) -> Result<()> {
    let mut request = Request::new(ReplyMode::NoReply, Opcode::PlayTone);
    request
        .put_u16_le(frequency.clamp(MIN_TONE_HZ, MAX_TONE_HZ))
        .put_u16_le(duration_ms);
    transmit(conn, &request)
}

pub fn set_output_state(conn: &mut Connection, state: &OutputState) -> Result<()> {
    let mut request = Request::new(ReplyMode::NoReply, Opcode::SetOutputState);
    request
        .put_u8(state.port.as_byte())
        .put_i8(state.power.clamp(-MAX_POWER, MAX_POWER))
        .put_u8(state.mode.bits())
        .put_u8(state.regulation.bits())
        .put_i8(state.turn_ratio.clamp(-MAX_POWER, MAX_POWER))
        .put_u8(state.run_state.bits())
        .put_u32_le(state.tacho_limit);
    transmit(conn, &request)
}

pub fn set_input_mode(
    conn: &mut Connection,
    port: InputPort,
    sensor_type: SensorType,
    sensor_mode: SensorMode,
) -> Result<()> {
    let mut request = Request::new(ReplyMode::NoReply, Opcode::SetInputMode);
    request
        .put_u8(port.as_byte())
        .put_u8(sensor_type.bits())
        .put_u8(sensor_mode.bits());
    transmit(conn, &request)
}

pub fn get_output_state(conn: &mut Connection, port: OutputPort) -> Result<OutputStateReply> {
    let mut request = Request::new(ReplyMode::Expected, Opcode::GetOutputState);
    request.put_u8(port.as_byte());
    transmit(conn, &request)?;

    let reply = recv::<25>(conn, Opcode::GetOutputState)?;
    let mut body = reply.payload();
    check_port(port.as_byte(), body.get_u8())?;

    Ok(OutputStateReply {
        port,
        power: body.get_i8(),
        mode: MotorMode(body.get_u8()),
        regulation: RegulationMode(body.get_u8()),
        turn_ratio: body.get_i8(),
        run_state: RunState(body.get_u8()),
        tacho_limit: body.get_u32_le(),
        tacho_count: body.get_i32_le(),
        block_tacho_count: body.get_i32_le(),
        rotation_count: body.get_i32_le(),
    })
}

pub fn get_input_values(conn: &mut Connection, port: InputPort) -> Result<InputValues> {
    let mut request = Request::new(ReplyMode::Expected, Opcode::GetInputValues);
    request.put_u8(port.as_byte());
    transmit(conn, &request)?;

    let reply = recv::<16>(conn, Opcode::GetInputValues)?;
    let mut body = reply.payload();
    check_port(port.as_byte(), body.get_u8())?;

    Ok(InputValues {
        port,
        valid: body.get_u8() != 0,
        calibrated: body.get_u8() != 0,
        sensor_type: SensorType(body.get_u8()),
        sensor_mode: SensorMode(body.get_u8()),
        raw: body.get_u16_le(),
        normalized: body.get_u16_le(),
        scaled: body.get_i16_le(),
        calibrated_value: body.get_i16_le(),
    })
}

pub fn reset_input_scaled_value(conn: &mut Connection, port: InputPort) -> Result<()> {
    let mut request = Request::new(ReplyMode::NoReply, Opcode::ResetInputScaledValue);
    request.put_u8(port.as_byte());
    transmit(conn, &request)
}

/// Write `data` to mailbox `inbox` (0..=9) on the brick. `data` holds at most
/// 59 bytes, including any terminator the receiving program expects.
pub fn message_write(conn: &mut Connection, inbox: u8, data: &[u8]) -> Result<()> {
    if inbox > MAX_INBOX {
        return Err(Error::InvalidArgument("mailbox index must be 0 to 9"));
    }
    if data.len() > MAX_MESSAGE_LEN {
        return Err(Error::InvalidArgument("message longer than 59 bytes"));
    }
    let mut request = Request::new(ReplyMode::NoReply, Opcode::MessageWrite);
    request
        .put_u8(inbox)
        .put_u8(data.len() as u8)
        .put_slice(data);
    transmit(conn, &request)
}

pub fn reset_motor_position(conn: &mut Connection, port: OutputPort, relative: bool) -> Result<()> {
    let mut request = Request::new(ReplyMode::NoReply, Opcode::ResetMotorPosition);
    request.put_u8(port.as_byte()).put_bool(relative);
    transmit(conn, &request)
}

/// Battery voltage in millivolts.
pub fn get_battery_level(conn: &mut Connection) -> Result<u16> {
    transmit(conn, &Request::new(ReplyMode::Expected, Opcode::GetBatteryLevel))?;
    let reply = recv::<5>(conn, Opcode::GetBatteryLevel)?;
    Ok(reply.payload().get_u16_le())
}

pub fn stop_sound_playback(conn: &mut Connection) -> Result<()> {
    transmit(conn, &Request::new(ReplyMode::NoReply, Opcode::StopSoundPlayback))
}

/// Reset the brick's sleep timer. Returns the configured sleep timeout in
/// milliseconds.
pub fn keep_alive(conn: &mut Connection) -> Result<u32> {
    transmit(conn, &Request::new(ReplyMode::Expected, Opcode::KeepAlive))?;
    let reply = recv::<7>(conn, Opcode::KeepAlive)?;
    Ok(reply.payload().get_u32_le())
}

/// Number of bytes ready to read from a low-speed sensor. A transaction that
/// is still pending reports zero.
pub fn ls_get_status(conn: &mut Connection, port: InputPort) -> Result<u8> {
    let mut request = Request::new(ReplyMode::Expected, Opcode::LsGetStatus);
    request.put_u8(port.as_byte());
    transmit(conn, &request)?;
    let reply = recv::<4>(conn, Opcode::LsGetStatus)?;
    Ok(reply.payload().get_u8())
}

/// Start a low-speed (I2C) transaction: send `tx` and ask for `rx_len` bytes
/// back. Both are limited to 16 bytes.
pub fn ls_write(conn: &mut Connection, port: InputPort, tx: &[u8], rx_len: u8) -> Result<()> {
    if tx.len() > MAX_LS_DATA {
        return Err(Error::InvalidArgument("low-speed transmit data longer than 16 bytes"));
    }
    if usize::from(rx_len) > MAX_LS_DATA {
        return Err(Error::InvalidArgument("low-speed receive length above 16 bytes"));
    }
    let mut request = Request::new(ReplyMode::NoReply, Opcode::LsWrite);
    request
        .put_u8(port.as_byte())
        .put_u8(tx.len() as u8)
        .put_u8(rx_len)
        .put_slice(tx);
    transmit(conn, &request)
}

/// Read the result of a low-speed transaction into `buf`.
///
/// Returns the number of bytes the brick reported. If `buf` is shorter, or the
/// reported length exceeds the 16 data bytes a reply can carry, `buf` is
/// filled with what fits and [`Error::BufferTooSmall`] is returned.
pub fn ls_read(conn: &mut Connection, port: InputPort, buf: &mut [u8]) -> Result<usize> {
    let mut request = Request::new(ReplyMode::Expected, Opcode::LsRead);
    request.put_u8(port.as_byte());
    transmit(conn, &request)?;

    let reply = recv::<20>(conn, Opcode::LsRead)?;
    let payload = reply.payload();
    let rx_len = usize::from(payload[0]);
    let data = &payload[1..];
    if rx_len > data.len() {
        let available = buf.len().min(data.len());
        buf[..available].copy_from_slice(&data[..available]);
        debug!(rx_len, "low-speed reply longer than the protocol allows");
        return Err(Error::BufferTooSmall {
            needed: rx_len,
            available,
        });
    }
    copy_prefix(&data[..rx_len], buf)
}

/// Name of the running program, without its NUL padding.
pub fn get_current_program_name(conn: &mut Connection) -> Result<String> {
    transmit(
        conn,
        &Request::new(ReplyMode::Expected, Opcode::GetCurrentProgramName),
    )?;
    let reply = recv::<22>(conn, Opcode::GetCurrentProgramName)?;
    let field = &reply.payload()[..PROGRAM_NAME_LEN];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    Ok(String::from_utf8_lossy(&field[..end]).into_owned())
}

/// Read a message from the brick's outbox `remote` (0..=16) into `buf`,
/// routing it through local mailbox `local` (0..=9). With `remove` the
/// message is taken off the queue.
///
/// Returns the message length. A reported length above 59 fills `buf` and
/// returns [`Error::BufferTooSmall`].
pub fn message_read(
    conn: &mut Connection,
    remote: u8,
    local: u8,
    remove: bool,
    buf: &mut [u8; MAX_MESSAGE_LEN],
) -> Result<usize> {
    if remote > MAX_REMOTE_INBOX {
        return Err(Error::InvalidArgument("remote mailbox index must be 0 to 16"));
    }
    if local > MAX_INBOX {
        return Err(Error::InvalidArgument("local mailbox index must be 0 to 9"));
    }
    let mut request = Request::new(ReplyMode::Expected, Opcode::MessageRead);
    request.put_u8(remote).put_u8(local).put_bool(remove);
    transmit(conn, &request)?;

    let reply = recv::<64>(conn, Opcode::MessageRead)?;
    let payload = reply.payload();
    let len = usize::from(payload[1]);
    let data = &payload[2..];
    if len > data.len() {
        buf.copy_from_slice(data);
        debug!(len, "mailbox message longer than the protocol allows");
        return Err(Error::BufferTooSmall {
            needed: len,
            available: MAX_MESSAGE_LEN,
        });
    }
    buf[..len].copy_from_slice(&data[..len]);
    Ok(len)
}

fn copy_prefix(data: &[u8], buf: &mut [u8]) -> Result<usize> {
    if buf.len() < data.len() {
        let available = buf.len();
        buf.copy_from_slice(&data[..available]);
        return Err(Error::BufferTooSmall {
            needed: data.len(),
            available,
        });
    }
    buf[..data.len()].copy_from_slice(data);
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingViolation;
    use crate::mock::{self, padded_reply, reply};
    use crate::status::DeviceStatus;

    fn request(opcode: u8, reply: bool, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![if reply { 0x00 } else { 0x80 }, opcode];
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn start_program_sends_terminated_name() {
        let (mut conn, wire) = mock::connection(vec![]);
        start_program(&mut conn, "12345678901234.123").unwrap();

        let mut expected = request(0x00, false, b"12345678901234.123");
        expected.push(0);
        assert_eq!(wire.lock().unwrap().writes, vec![expected]);
    }

    #[test]
    fn long_or_nul_filenames_are_rejected_before_writing() {
        let (mut conn, wire) = mock::connection(vec![]);

        let err = start_program(&mut conn, "12345678901234.1234").unwrap_err();
        assert!(matches!(err, Error::FilenameTooLong { len: 19, max: 18 }));

        let err = play_sound_file(&mut conn, true, "a\0b.rso").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        assert!(wire.lock().unwrap().writes.is_empty());
    }

    #[test]
    fn play_sound_file_prefixes_loop_flag() {
        let (mut conn, wire) = mock::connection(vec![]);
        play_sound_file(&mut conn, true, "12345678901234.123").unwrap();

        let mut payload = vec![0x01];
        payload.extend_from_slice(b"12345678901234.123\0");
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x02, false, &payload)]);
    }

    #[test]
    fn fire_and_forget_commands() {
        let (mut conn, wire) = mock::connection(vec![]);
        stop_program(&mut conn).unwrap();
        stop_sound_playback(&mut conn).unwrap();
        reset_input_scaled_value(&mut conn, InputPort::Three).unwrap();
        reset_motor_position(&mut conn, OutputPort::B, true).unwrap();
        set_input_mode(
            &mut conn,
            InputPort::One,
            SensorType::SWITCH,
            SensorMode::BOOLEAN,
        )
        .unwrap();

        assert_eq!(
            wire.lock().unwrap().writes,
            vec![
                request(0x01, false, &[]),
                request(0x0C, false, &[]),
                request(0x08, false, &[0x02]),
                request(0x0A, false, &[0x01, 0x01]),
                request(0x05, false, &[0x00, 0x01, 0x20]),
            ]
        );
    }

    #[test]
    fn play_tone_clamps_frequency() {
        let (mut conn, wire) = mock::connection(vec![]);
        play_tone(&mut conn, 199, 40000).unwrap();
        play_tone(&mut conn, 14001, 40000).unwrap();
        play_tone(&mut conn, 440, 500).unwrap();

        let [low, high, a4] = <[Vec<u8>; 3]>::try_from(wire.lock().unwrap().writes.clone())
            .expect("three requests");
        let duration = 40000u16.to_le_bytes();
        assert_eq!(low, request(0x03, false, &[0xC8, 0x00, duration[0], duration[1]]));
        assert_eq!(high, request(0x03, false, &[0xB0, 0x36, duration[0], duration[1]]));
        assert_eq!(a4, request(0x03, false, &[0xB8, 0x01, 0xF4, 0x01]));
    }

    #[test]
    fn set_output_state_clamps_power_and_turn() {
        let (mut conn, wire) = mock::connection(vec![]);
        let state = OutputState {
            port: OutputPort::A,
            power: 101,
            mode: MotorMode::MOTOR_ON | MotorMode::REGULATED,
            regulation: RegulationMode::MOTOR_SPEED,
            turn_ratio: -128,
            run_state: RunState::RUNNING,
            tacho_limit: 0x0102_0304,
        };
        set_output_state(&mut conn, &state).unwrap();

        assert_eq!(
            wire.lock().unwrap().writes,
            vec![request(
                0x04,
                false,
                &[0x00, 0x64, 0x05, 0x01, 0x9C, 0x20, 0x04, 0x03, 0x02, 0x01]
            )]
        );
    }

    #[test]
    fn get_output_state_decodes_every_field() {
        let mut payload = vec![0x02, 0xCE, 0x07, 0x02, 0x0A, 0x20];
        payload.extend_from_slice(&360u32.to_le_bytes());
        payload.extend_from_slice(&(-1234i32).to_le_bytes());
        payload.extend_from_slice(&567i32.to_le_bytes());
        payload.extend_from_slice(&(-89i32).to_le_bytes());
        let (mut conn, wire) = mock::connection(vec![reply(0x06, 0x00, &payload)]);

        let state = get_output_state(&mut conn, OutputPort::C).unwrap();
        assert_eq!(
            state,
            OutputStateReply {
                port: OutputPort::C,
                power: -50,
                mode: MotorMode(0x07),
                regulation: RegulationMode::MOTOR_SYNC,
                turn_ratio: 10,
                run_state: RunState::RUNNING,
                tacho_limit: 360,
                tacho_count: -1234,
                block_tacho_count: 567,
                rotation_count: -89,
            }
        );
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x06, true, &[0x02])]);
    }

    #[test]
    fn echoed_port_must_match() {
        let (mut conn, _wire) = mock::connection(vec![
            padded_reply(0x06, &[0x01], 25),
            padded_reply(0x07, &[0x03], 16),
        ]);

        let err = get_output_state(&mut conn, OutputPort::A).unwrap_err();
        assert!(matches!(err, Error::PortMismatch { expected: 0, actual: 1 }));

        let err = get_input_values(&mut conn, InputPort::Two).unwrap_err();
        assert!(matches!(err, Error::PortMismatch { expected: 1, actual: 3 }));
    }

    #[test]
    fn get_input_values_decodes_every_field() {
        let mut payload = vec![0x03, 0x01, 0x00, 0x05, 0x80];
        payload.extend_from_slice(&1023u16.to_le_bytes());
        payload.extend_from_slice(&512u16.to_le_bytes());
        payload.extend_from_slice(&(-40i16).to_le_bytes());
        payload.extend_from_slice(&77i16.to_le_bytes());
        let (mut conn, wire) = mock::connection(vec![reply(0x07, 0x00, &payload)]);

        let values = get_input_values(&mut conn, InputPort::Four).unwrap();
        assert_eq!(
            values,
            InputValues {
                port: InputPort::Four,
                valid: true,
                calibrated: false,
                sensor_type: SensorType::LIGHT_ACTIVE,
                sensor_mode: SensorMode::PCT_FULL_SCALE,
                raw: 1023,
                normalized: 512,
                scaled: -40,
                calibrated_value: 77,
            }
        );
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x07, true, &[0x03])]);
    }

    #[test]
    fn message_write_encodes_inbox_and_length() {
        let (mut conn, wire) = mock::connection(vec![]);
        message_write(&mut conn, 5, b"1234567890").unwrap();

        let mut payload = vec![0x05, 0x0A];
        payload.extend_from_slice(b"1234567890");
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x09, false, &payload)]);
    }

    #[test]
    fn message_write_validates_before_writing() {
        let (mut conn, wire) = mock::connection(vec![]);
        assert!(matches!(
            message_write(&mut conn, 11, b"hi"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            message_write(&mut conn, 0, &[0u8; 60]),
            Err(Error::InvalidArgument(_))
        ));
        message_write(&mut conn, 9, &[0u8; 59]).unwrap();
        assert_eq!(wire.lock().unwrap().writes.len(), 1);
    }

    #[test]
    fn battery_level_is_little_endian_millivolts() {
        let (mut conn, wire) = mock::connection(vec![vec![0x02, 0x0B, 0x00, 0x40, 0x1F]]);
        assert_eq!(get_battery_level(&mut conn).unwrap(), 8000);
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x0B, true, &[])]);
    }

    #[test]
    fn battery_level_reports_device_status() {
        let (mut conn, _wire) = mock::connection(vec![reply(0x0B, 0xBF, &[0x40, 0x1F])]);
        let err = get_battery_level(&mut conn).unwrap_err();
        assert!(matches!(err, Error::Device(DeviceStatus::InsanePacket)));
    }

    #[test]
    fn mismatched_reply_is_not_decoded() {
        let (mut conn, _wire) = mock::connection(vec![
            vec![0x02, 0x0D, 0x00, 0x40, 0x1F],
            vec![0x02, 0x0B, 0x00, 0x40],
        ]);

        let err = get_battery_level(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            Error::Framing(FramingViolation::OpcodeMismatch { .. })
        ));
        let err = get_battery_level(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            Error::Framing(FramingViolation::ShortReply {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn battery_level_over_framed_stream() {
        let (mut conn, stream) =
            mock::stream_connection(&[5, 0, 0x02, 0x0B, 0x00, 0x40, 0x1F]);
        stream.lock().unwrap().read_limit = Some(2);

        assert_eq!(get_battery_level(&mut conn).unwrap(), 8000);
        let stream = stream.lock().unwrap();
        assert_eq!(stream.written, vec![2, 0, 0x00, 0x0B]);
        assert!(stream.incoming.is_empty());
    }

    #[test]
    fn oversized_stream_reply_is_truncated_and_next_reply_decodes() {
        let (mut conn, _stream) = mock::stream_connection(&[
            7, 0, 0x02, 0x0B, 0x00, 0x40, 0x1F, 0xAA, 0xBB, // two trailing extra bytes
            5, 0, 0x02, 0x0B, 0x00, 0x10, 0x27,
        ]);

        assert_eq!(get_battery_level(&mut conn).unwrap(), 8000);
        assert_eq!(get_battery_level(&mut conn).unwrap(), 10000);
    }

    #[test]
    fn one_byte_stream_header_is_a_framing_violation() {
        let (mut conn, _stream) = mock::stream_connection(&[5]);
        let err = get_battery_level(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            Error::Framing(FramingViolation::ShortHeader { got: 1 })
        ));
    }

    #[test]
    fn each_query_expects_its_opcode_reply_length() {
        type Query = fn(&mut Connection) -> Result<()>;
        let queries: [(Opcode, Query); 8] = [
            (Opcode::GetOutputState, |c| {
                get_output_state(c, OutputPort::A).map(drop)
            }),
            (Opcode::GetInputValues, |c| {
                get_input_values(c, InputPort::One).map(drop)
            }),
            (Opcode::GetBatteryLevel, |c| get_battery_level(c).map(drop)),
            (Opcode::KeepAlive, |c| keep_alive(c).map(drop)),
            (Opcode::LsGetStatus, |c| ls_get_status(c, InputPort::One).map(drop)),
            (Opcode::LsRead, |c| {
                ls_read(c, InputPort::One, &mut [0u8; 16]).map(drop)
            }),
            (Opcode::GetCurrentProgramName, |c| {
                get_current_program_name(c).map(drop)
            }),
            (Opcode::MessageRead, |c| {
                message_read(c, 0, 0, false, &mut [0u8; MAX_MESSAGE_LEN]).map(drop)
            }),
        ];

        let covered: Vec<_> = queries.iter().map(|(opcode, _)| *opcode).collect();
        let with_reply: Vec<_> = Opcode::ALL
            .into_iter()
            .filter(|opcode| opcode.reply_len().is_some())
            .collect();
        assert_eq!(covered, with_reply);

        for (opcode, query) in queries {
            let (mut conn, _wire) = mock::connection(vec![reply(opcode.as_byte(), 0x00, &[])]);
            let err = query(&mut conn).unwrap_err();
            let Error::Framing(FramingViolation::ShortReply { expected, actual }) = &err else {
                panic!("{}: unexpected error {err:?}", opcode.name());
            };
            assert_eq!(Some(*expected), opcode.reply_len(), "{}", opcode.name());
            assert_eq!(*actual, 3);
        }
    }

    #[test]
    fn keep_alive_returns_sleep_timeout() {
        let (mut conn, wire) =
            mock::connection(vec![reply(0x0D, 0x00, &600_000u32.to_le_bytes())]);
        assert_eq!(keep_alive(&mut conn).unwrap(), 600_000);
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x0D, true, &[])]);
    }

    #[test]
    fn ls_get_status_treats_pending_as_zero() {
        let (mut conn, wire) = mock::connection(vec![
            reply(0x0E, 0x00, &[0x08]),
            reply(0x0E, 0x20, &[0x05]),
            reply(0x0E, 0xDD, &[0x00]),
        ]);

        assert_eq!(ls_get_status(&mut conn, InputPort::Four).unwrap(), 8);
        assert_eq!(ls_get_status(&mut conn, InputPort::Four).unwrap(), 0);
        assert!(matches!(
            ls_get_status(&mut conn, InputPort::Four),
            Err(Error::Device(DeviceStatus::BusError))
        ));
        assert_eq!(wire.lock().unwrap().writes[0], request(0x0E, true, &[0x03]));
    }

    #[test]
    fn ls_write_validates_lengths() {
        let (mut conn, wire) = mock::connection(vec![]);
        assert!(matches!(
            ls_write(&mut conn, InputPort::One, &[0u8; 17], 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ls_write(&mut conn, InputPort::One, &[0x02, 0x42], 17),
            Err(Error::InvalidArgument(_))
        ));
        ls_write(&mut conn, InputPort::One, &[0x02, 0x42], 1).unwrap();

        assert_eq!(
            wire.lock().unwrap().writes,
            vec![request(0x0F, false, &[0x00, 0x02, 0x01, 0x02, 0x42])]
        );
    }

    #[test]
    fn ls_read_copies_reported_bytes() {
        let (mut conn, _wire) =
            mock::connection(vec![padded_reply(0x10, &[3, 0xA, 0xB, 0xC], 20)]);
        let mut buf = [0u8; 16];
        assert_eq!(ls_read(&mut conn, InputPort::One, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..4], &[0xA, 0xB, 0xC, 0]);
    }

    #[test]
    fn ls_read_fills_short_buffer_then_fails() {
        let data: Vec<u8> = (1..=16).collect();
        let mut payload = vec![16];
        payload.extend_from_slice(&data);
        let (mut conn, _wire) = mock::connection(vec![reply(0x10, 0x00, &payload)]);

        let mut buf = [0u8; 10];
        let err = ls_read(&mut conn, InputPort::Two, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 16,
                available: 10
            }
        ));
        assert_eq!(&buf[..], &data[..10]);
    }

    #[test]
    fn ls_read_overlong_length_fills_buffer() {
        let data: Vec<u8> = (1..=16).collect();
        let mut payload = vec![20];
        payload.extend_from_slice(&data);
        let (mut conn, _wire) = mock::connection(vec![reply(0x10, 0x00, &payload)]);

        let mut buf = [0u8; 32];
        let err = ls_read(&mut conn, InputPort::One, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 20,
                available: 16
            }
        ));
        assert_eq!(&buf[..16], &data[..]);
        assert!(buf[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn program_name_stops_at_padding() {
        let mut field = b"linefollow.rxe".to_vec();
        field.resize(19, 0);
        let (mut conn, wire) = mock::connection(vec![reply(0x11, 0x00, &field)]);

        assert_eq!(get_current_program_name(&mut conn).unwrap(), "linefollow.rxe");
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x11, true, &[])]);
    }

    #[test]
    fn program_name_fills_whole_field() {
        let (mut conn, _wire) = mock::connection(vec![reply(0x11, 0x00, &[b'x'; 19])]);
        assert_eq!(get_current_program_name(&mut conn).unwrap().len(), 19);
    }

    #[test]
    fn no_active_program_is_a_device_error() {
        let (mut conn, _wire) = mock::connection(vec![reply(0x11, 0xEC, &[0u8; 19])]);
        assert!(matches!(
            get_current_program_name(&mut conn),
            Err(Error::Device(DeviceStatus::NoActiveProgram))
        ));
    }

    #[test]
    fn message_read_returns_message() {
        let mut payload = vec![0x01, 0x06];
        payload.extend_from_slice(b"hello\0");
        let (mut conn, wire) = mock::connection(vec![padded_reply(0x13, &payload, 64)]);

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        assert_eq!(message_read(&mut conn, 11, 1, true, &mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b"hello\0");
        assert_eq!(wire.lock().unwrap().writes, vec![request(0x13, true, &[11, 1, 1])]);
    }

    #[test]
    fn message_read_validates_mailboxes() {
        let (mut conn, wire) = mock::connection(vec![]);
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        assert!(matches!(
            message_read(&mut conn, 17, 0, false, &mut buf),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            message_read(&mut conn, 0, 10, false, &mut buf),
            Err(Error::InvalidArgument(_))
        ));
        assert!(wire.lock().unwrap().writes.is_empty());
    }

    #[test]
    fn message_read_overlong_length_fills_buffer() {
        let mut payload = vec![0x00, 60];
        payload.extend(std::iter::repeat(0x55).take(MAX_MESSAGE_LEN));
        let (mut conn, _wire) = mock::connection(vec![reply(0x13, 0x00, &payload)]);

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let err = message_read(&mut conn, 0, 0, false, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 60,
                available: 59
            }
        ));
        assert!(buf.iter().all(|&b| b == 0x55));
    }

    #[test]
    fn empty_mailbox_is_a_device_error() {
        let (mut conn, _wire) = mock::connection(vec![reply(0x13, 0x40, &[0u8; 61])]);
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        assert!(matches!(
            message_read(&mut conn, 0, 0, true, &mut buf),
            Err(Error::Device(DeviceStatus::MailboxQueueEmpty))
        ));
    }

    #[test]
    fn commands_fail_after_close() {
        let (mut conn, wire) = mock::connection(vec![]);
        conn.close().unwrap();
        assert!(matches!(get_battery_level(&mut conn), Err(Error::EntityClosed)));
        assert!(matches!(stop_program(&mut conn), Err(Error::EntityClosed)));
        assert!(wire.lock().unwrap().writes.is_empty());
    }
}
