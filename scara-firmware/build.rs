//! Build script for scara-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates arm.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys allowed in each section
const ROOT_KEYS: &[&str] = &["version", "startup_delay_ms"];
const SERIAL_KEYS: &[&str] = &["baud_rate", "baud", "parse_timeout_ms", "echo"];
const STEPPER_KEYS: &[&str] = &["max_speed", "acceleration", "pulse_width_us", "dir_setup_ns", "invert_dir"];
const STEPPER_NAMES: &[&str] = &["shoulder", "elbow"];
const KINEMATICS_KEYS: &[&str] = &[
    "link1_mm",
    "link2_mm",
    "steps_per_rev",
    "gear_ratio_j1",
    "gear_ratio_j2",
    "theta1_min",
    "theta1_max",
    "theta1_zero_offset",
    "theta2_zero_offset",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate arm.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=arm.toml");

    let config_path = Path::new("arm.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: arm.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds arm.toml from the scara-firmware directory. ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read arm.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in arm.toml                          ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_root(&config, &mut errors);
    validate_serial(&config, &mut errors);
    validate_steppers(&config, &mut errors);
    validate_kinematics(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid arm configuration                                ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=arm.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numeric value as f64, accepting integers and floats
fn number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn check_keys(section: &str, table: &toml::Table, allowed: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

fn check_positive(section: &str, table: &toml::Table, key: &str, errors: &mut Vec<String>) {
    match table.get(key) {
        None => {}
        Some(v) => match number(v) {
            Some(n) if n > 0.0 => {}
            _ => errors.push(format!("[{}] {} must be a positive number", section, key)),
        },
    }
}

fn check_bool(section: &str, table: &toml::Table, key: &str, errors: &mut Vec<String>) {
    if let Some(v) = table.get(key) {
        if !v.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

fn check_integer(
    section: &str,
    table: &toml::Table,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(i)) if range.contains(i) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be an integer in {}..={}",
            section,
            key,
            range.start(),
            range.end()
        )),
    }
}

fn validate_root(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (key, value) in root {
        match key.as_str() {
            "serial" | "stepper" | "kinematics" => {
                if !value.is_table() {
                    errors.push(format!("'{}' must be a table", key));
                }
            }
            k if ROOT_KEYS.contains(&k) => {}
            other => errors.push(format!("unknown top-level key '{}'", other)),
        }
    }

    check_integer("root", root, "version", 1..=1, errors);
    check_integer("root", root, "startup_delay_ms", 0..=u32::MAX as i64, errors);
}

fn validate_serial(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(serial) = config.get("serial").and_then(|s| s.as_table()) else {
        return;
    };

    check_keys("serial", serial, SERIAL_KEYS, errors);
    check_integer("serial", serial, "baud_rate", 1..=7_812_500, errors);
    check_integer("serial", serial, "baud", 1..=7_812_500, errors);
    check_integer("serial", serial, "parse_timeout_ms", 0..=u32::MAX as i64, errors);
    check_bool("serial", serial, "echo", errors);
}

fn validate_steppers(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(steppers) = config.get("stepper").and_then(|s| s.as_table()) else {
        return;
    };

    for (name, stepper) in steppers {
        let section = format!("stepper.{}", name);
        if !STEPPER_NAMES.contains(&name.as_str()) {
            errors.push(format!("[{}] must be 'shoulder' or 'elbow'", section));
            continue;
        }
        let Some(stepper) = stepper.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        check_keys(&section, stepper, STEPPER_KEYS, errors);
        check_positive(&section, stepper, "max_speed", errors);
        check_positive(&section, stepper, "acceleration", errors);
        check_integer(&section, stepper, "pulse_width_us", 1..=1000, errors);
        check_integer(&section, stepper, "dir_setup_ns", 0..=100_000, errors);
        check_bool(&section, stepper, "invert_dir", errors);
    }
}

fn validate_kinematics(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(kin) = config.get("kinematics").and_then(|k| k.as_table()) else {
        return;
    };

    check_keys("kinematics", kin, KINEMATICS_KEYS, errors);
    for key in ["link1_mm", "link2_mm", "gear_ratio_j1", "gear_ratio_j2"] {
        check_positive("kinematics", kin, key, errors);
    }
    check_integer("kinematics", kin, "steps_per_rev", 1..=u32::MAX as i64, errors);

    for key in ["theta1_min", "theta1_max", "theta1_zero_offset", "theta2_zero_offset"] {
        if let Some(v) = kin.get(key) {
            if number(v).is_none() {
                errors.push(format!("[kinematics] {} must be a number", key));
            }
        }
    }

    let min = kin.get("theta1_min").and_then(number).unwrap_or(0.0);
    let max = kin.get("theta1_max").and_then(number).unwrap_or(180.0);
    if min > max {
        errors.push("[kinematics] theta1_min must not exceed theta1_max".to_string());
    }
}
