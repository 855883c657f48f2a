//! Minimal TOML reader for the arm configuration
//!
//! Handles only the subset the arm configuration uses, not all of TOML.
//!
//! Supported features:
//! - Key = value pairs (integer, float, boolean, quoted or bare string)
//! - `[section]` headers, `[stepper shoulder]` or `[stepper.shoulder]`
//! - Comments (`# ...`), also after a value
//!
//! Keys that are absent keep their default. The result is validated before
//! it is returned.

use core::str::FromStr;

use super::types::{ArmConfig, AxisConfig, ConfigError, CONFIG_VERSION};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or the line is not `key = value`
    InvalidValue,
    /// Key not recognised in its section
    UnknownKey,
    /// Parsed values failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Stepper section target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joint {
    Shoulder,
    Elbow,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Serial,
    Stepper(Joint),
    Kinematics,
}

/// Parse TOML text into a validated [`ArmConfig`]
pub fn parse_config(input: &str) -> Result<ArmConfig, ParseError> {
    let mut config = ArmConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

/// Parse section header like "serial", "stepper elbow" or "stepper.elbow"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let mut parts = header
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let kind = parts.next().ok_or(ParseError::InvalidSection)?;
    let name = parts.next();
    if parts.next().is_some() {
        return Err(ParseError::InvalidSection);
    }

    match (kind, name) {
        ("serial", None) => Ok(Section::Serial),
        ("kinematics", None) => Ok(Section::Kinematics),
        ("stepper", Some(name)) => match parse_string(name) {
            "shoulder" => Ok(Section::Stepper(Joint::Shoulder)),
            "elbow" => Ok(Section::Stepper(Joint::Elbow)),
            _ => Err(ParseError::InvalidSection),
        },
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = match value.find('#') {
        // Keep a # that sits inside a quoted string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Strip surrounding quotes if present
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer or float value
fn parse_num<T: FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ArmConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => match key {
            "version" => {
                if parse_num::<u8>(value)? != CONFIG_VERSION {
                    return Err(ParseError::InvalidValue);
                }
            }
            "startup_delay_ms" => config.startup_delay_ms = parse_num(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Serial => {
            let s = &mut config.serial;
            match key {
                "baud_rate" | "baud" => s.baud_rate = parse_num(value)?,
                "parse_timeout_ms" => s.parse_timeout_ms = parse_num(value)?,
                "echo" => s.echo = parse_bool(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Stepper(joint) => {
            let axis = match joint {
                Joint::Shoulder => &mut config.shoulder,
                Joint::Elbow => &mut config.elbow,
            };
            apply_axis_value(axis, key, value)?;
        }
        Section::Kinematics => {
            let k = &mut config.kinematics;
            match key {
                "link1_mm" => k.link1_mm = parse_num(value)?,
                "link2_mm" => k.link2_mm = parse_num(value)?,
                "steps_per_rev" => k.steps_per_rev = parse_num(value)?,
                "gear_ratio_j1" => k.gear_ratio_j1 = parse_num(value)?,
                "gear_ratio_j2" => k.gear_ratio_j2 = parse_num(value)?,
                "theta1_min" => k.theta1_min = parse_num(value)?,
                "theta1_max" => k.theta1_max = parse_num(value)?,
                "theta1_zero_offset" => k.theta1_zero_offset = parse_num(value)?,
                "theta2_zero_offset" => k.theta2_zero_offset = parse_num(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }

    Ok(())
}

fn apply_axis_value(axis: &mut AxisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "max_speed" => axis.max_speed = parse_num(value)?,
        "acceleration" => axis.acceleration = parse_num(value)?,
        "pulse_width_us" => axis.pulse_width_us = parse_num(value)?,
        "dir_setup_ns" => axis.dir_setup_ns = parse_num(value)?,
        "invert_dir" => axis.invert_dir = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), ArmConfig::default());
        assert_eq!(
            parse_config("# nothing here\n\n").unwrap(),
            ArmConfig::default()
        );
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("serial"), Ok(Section::Serial));
        assert_eq!(
            parse_section_header("stepper shoulder"),
            Ok(Section::Stepper(Joint::Shoulder))
        );
        assert_eq!(
            parse_section_header("stepper.elbow"),
            Ok(Section::Stepper(Joint::Elbow))
        );
        assert_eq!(
            parse_section_header("stepper wrist"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(parse_section_header("stepper"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_section_header("serial extra"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_key_value_strips_comments() {
        assert_eq!(parse_key_value("echo = true # debug"), Some(("echo", "true")));
        assert_eq!(
            parse_key_value(r#"name = "a#b""#),
            Some(("name", r#""a#b""#))
        );
        assert_eq!(parse_key_value("echo ="), None);
        assert_eq!(parse_key_value("no equals sign"), None);
    }

    #[test]
    fn test_parse_full_config() {
        let input = r#"
version = 1
startup_delay_ms = 250

[serial]
baud_rate = 57600
parse_timeout_ms = 50
echo = true

[stepper shoulder]
max_speed = 1200.5
acceleration = 800
pulse_width_us = 5
dir_setup_ns = 650

[stepper.elbow]
max_speed = 600
invert_dir = true

[kinematics]
link1_mm = 120
link2_mm = 80.5
gear_ratio_j1 = 4
theta1_max = 170
"#;

        let config = parse_config(input).unwrap();
        assert_eq!(config.startup_delay_ms, 250);
        assert_eq!(config.serial.baud_rate, 57600);
        assert_eq!(config.serial.parse_timeout_ms, 50);
        assert!(config.serial.echo);
        assert_eq!(config.shoulder.max_speed, 1200.5);
        assert_eq!(config.shoulder.acceleration, 800.0);
        assert_eq!(config.shoulder.pulse_width_us, 5);
        assert_eq!(config.shoulder.dir_setup_ns, 650);
        assert_eq!(config.elbow.dir_setup_ns, 1000);
        assert!(!config.shoulder.invert_dir);
        assert_eq!(config.elbow.max_speed, 600.0);
        assert_eq!(config.elbow.acceleration, 500.0);
        assert!(config.elbow.invert_dir);
        assert_eq!(config.kinematics.link1_mm, 120.0);
        assert_eq!(config.kinematics.link2_mm, 80.5);
        assert_eq!(config.kinematics.gear_ratio_j1, 4.0);
        assert_eq!(config.kinematics.theta1_max, 170.0);
        assert_eq!(config.kinematics.steps_per_rev, 1600);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert_eq!(
            parse_config("[serial]\nparity = \"none\"\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("colour = 3\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert_eq!(
            parse_config("[serial]\necho = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[serial]\nbaud_rate = -1\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("version = 9\n"), Err(ParseError::InvalidValue));
        assert_eq!(parse_config("[serial]\nbaud_rate\n"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_validation_failure_reported() {
        assert_eq!(
            parse_config("[stepper elbow]\nmax_speed = 0\n"),
            Err(ParseError::Invalid(ConfigError::InvalidSpeed))
        );
        assert_eq!(
            parse_config("[serial]\nbaud_rate = 0\n"),
            Err(ParseError::Invalid(ConfigError::InvalidBaudRate))
        );
    }

    #[test]
    fn test_firmware_config_parses() {
        let config = parse_config(include_str!("../../../scara-firmware/arm.toml")).unwrap();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.shoulder.max_speed, 1000.0);
        assert_eq!(config.elbow.acceleration, 500.0);
    }
}
