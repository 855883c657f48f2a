//! Embedded configuration loader
//!
//! Falls back to built-in defaults if the embedded file does not parse.

use defmt::*;

use scara_core::config::{parse_config, ArmConfig};

/// Embedded configuration (compiled into firmware)
/// Edit arm.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../arm.toml");

/// Load the arm configuration
pub fn load_config() -> ArmConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            // build.rs checks arm.toml, so this only trips on reader/validator drift
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            ArmConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &ArmConfig) {
    debug!(
        "  serial: {} baud, field timeout {} ms, echo={}",
        config.serial.baud_rate, config.serial.parse_timeout_ms, config.serial.echo
    );
    for axis in [&config.shoulder, &config.elbow] {
        debug!(
            "  {}: max {} steps/s, accel {} steps/s^2, pulse {} us, dir setup {} ns, invert_dir={}",
            axis.name.as_str(),
            axis.max_speed,
            axis.acceleration,
            axis.pulse_width_us,
            axis.dir_setup_ns,
            axis.invert_dir
        );
    }
    debug!("  startup delay {} ms", config.startup_delay_ms);
}
