use nxtlink::command::InputValues;
use nxtlink::{commands, Connection, InputPort, SensorType};
use serde::Serialize;

use crate::cmd::InputArgs;
use crate::exit::{command_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize, Debug)]
pub struct InputReport {
    port: u8,
    valid: bool,
    calibrated: bool,
    sensor_type: &'static str,
    sensor_mode: u8,
    raw: u16,
    normalized: u16,
    scaled: i16,
    calibrated_value: i16,
}

fn sensor_name(sensor: SensorType) -> &'static str {
    match sensor {
        SensorType::NO_SENSOR => "none",
        SensorType::SWITCH => "touch",
        SensorType::TEMPERATURE => "temperature",
        SensorType::REFLECTION => "reflection",
        SensorType::ANGLE => "angle",
        SensorType::LIGHT_ACTIVE => "light (active)",
        SensorType::LIGHT_INACTIVE => "light (ambient)",
        SensorType::SOUND_DB => "sound (dB)",
        SensorType::SOUND_DBA => "sound (dBA)",
        SensorType::CUSTOM => "custom",
        SensorType::LOWSPEED => "i2c",
        SensorType::LOWSPEED_9V => "i2c (9V)",
        SensorType::HIGHSPEED => "high speed",
        SensorType::COLOR_FULL
        | SensorType::COLOR_RED
        | SensorType::COLOR_GREEN
        | SensorType::COLOR_BLUE
        | SensorType::COLOR_NONE => "color",
        _ => "unknown",
    }
}

impl From<InputValues> for InputReport {
    fn from(values: InputValues) -> Self {
        Self {
            port: values.port.as_byte() + 1,
            valid: values.valid,
            calibrated: values.calibrated,
            sensor_type: sensor_name(values.sensor_type),
            sensor_mode: values.sensor_mode.bits(),
            raw: values.raw,
            normalized: values.normalized,
            scaled: values.scaled,
            calibrated_value: values.calibrated_value,
        }
    }
}

impl Report for InputReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("port", self.port.to_string()),
            ("sensor", self.sensor_type.to_string()),
            ("valid", self.valid.to_string()),
            ("raw", self.raw.to_string()),
            ("normalized", self.normalized.to_string()),
            ("scaled", self.scaled.to_string()),
        ]
    }
}

pub fn run(conn: &mut Connection, args: InputArgs, format: OutputFormat) -> CliResult<i32> {
    let port = InputPort::try_from(args.port.saturating_sub(1))
        .map_err(|err| CliError::new(USAGE, format!("input: {err}")))?;
    let values =
        commands::get_input_values(conn, port).map_err(|err| command_error("input", err))?;
    print_report(&InputReport::from(values), format);
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::fake::{brick, reply};

    #[test]
    fn ports_are_numbered_from_one() {
        let mut payload = vec![0x00, 0x01, 0x00, 0x01, 0x20];
        payload.extend_from_slice(&183u16.to_le_bytes());
        payload.extend_from_slice(&1023u16.to_le_bytes());
        payload.extend_from_slice(&1i16.to_le_bytes());
        let (mut conn, requests) = brick(vec![reply(0x07, 0x00, &payload, 16)]);

        let values = commands::get_input_values(&mut conn, InputPort::One).unwrap();
        let report = InputReport::from(values);
        assert_eq!(report.port, 1);
        assert_eq!(report.sensor_type, "touch");
        assert_eq!(report.scaled, 1);
        assert_eq!(*requests.lock().unwrap(), vec![vec![0x00, 0x07, 0x00]]);
    }
}
