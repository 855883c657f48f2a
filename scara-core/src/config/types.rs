//! Configuration type definitions
//!
//! Defaults reproduce the constants the arm shipped with, so a board with
//! no usable configuration behaves exactly like the stock firmware.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Highest baud rate the RP2040 UART divider can produce from a 125 MHz clock
pub const MAX_BAUD_RATE: u32 = 7_812_500;

/// Longest step pulse accepted, in microseconds
pub const MAX_PULSE_WIDTH_US: u32 = 1000;

/// Longest direction setup time accepted, in nanoseconds
pub const MAX_DIR_SETUP_NS: u32 = 100_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Max speed not a positive finite number
    InvalidSpeed,
    /// Acceleration not a positive finite number
    InvalidAcceleration,
    /// Baud rate zero or above the UART limit
    InvalidBaudRate,
    /// Step pulse width zero or too long
    InvalidPulseWidth,
    /// Direction setup time too long
    InvalidDirSetup,
    /// Link lengths, gear ratios, resolution or joint limits unusable
    InvalidGeometry,
}

/// Serial command link settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate (8N1 framing)
    pub baud_rate: u32,
    /// Per-byte wait while scanning an integer field
    pub parse_timeout_ms: u32,
    /// Write `Moving: <a> <b>` back after each accepted command
    pub echo: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            parse_timeout_ms: 1000,
            echo: false,
        }
    }
}

/// Motion limits and driver timing for one joint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Axis name (matches the `[stepper <name>]` section)
    pub name: String<MAX_LABEL_LEN>,
    /// Speed ceiling in steps per second
    pub max_speed: f32,
    /// Acceleration and deceleration in steps per second squared
    pub acceleration: f32,
    /// Minimum high time of the step pulse
    pub pulse_width_us: u32,
    /// Wait between a direction change and the next step edge
    pub dir_setup_ns: u32,
    /// Invert the direction pin
    pub invert_dir: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_speed: 1000.0,
            acceleration: 500.0,
            pulse_width_us: 2,
            dir_setup_ns: 1000,
            invert_dir: false,
        }
    }
}

impl AxisConfig {
    /// Default limits under the given name
    pub fn named(name: &str) -> Self {
        let mut config = Self::default();
        // Names longer than MAX_LABEL_LEN stay empty
        config.name = String::try_from(name).unwrap_or_default();
        config
    }

    /// Check limits and timing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::InvalidSpeed);
        }
        if !(self.acceleration.is_finite() && self.acceleration > 0.0) {
            return Err(ConfigError::InvalidAcceleration);
        }
        if self.pulse_width_us == 0 || self.pulse_width_us > MAX_PULSE_WIDTH_US {
            return Err(ConfigError::InvalidPulseWidth);
        }
        if self.dir_setup_ns > MAX_DIR_SETUP_NS {
            return Err(ConfigError::InvalidDirSetup);
        }
        Ok(())
    }
}

/// Arm geometry and joint conventions used to turn positions into steps
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicsConfig {
    /// Shoulder-to-elbow link length in mm
    pub link1_mm: f32,
    /// Elbow-to-tool link length in mm
    pub link2_mm: f32,
    /// Motor steps per revolution, microstepping included
    pub steps_per_rev: u32,
    /// Shoulder reduction (motor turns per joint turn)
    pub gear_ratio_j1: f32,
    /// Elbow reduction
    pub gear_ratio_j2: f32,
    /// Lowest reachable shoulder angle in degrees
    pub theta1_min: f32,
    /// Highest reachable shoulder angle in degrees
    pub theta1_max: f32,
    /// Shoulder angle at motor position zero
    pub theta1_zero_offset: f32,
    /// Elbow angle at motor position zero
    pub theta2_zero_offset: f32,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            link1_mm: 100.0,
            link2_mm: 100.0,
            steps_per_rev: 1600,
            gear_ratio_j1: 3.0,
            gear_ratio_j2: 1.0,
            theta1_min: 0.0,
            theta1_max: 180.0,
            theta1_zero_offset: 90.0,
            theta2_zero_offset: 0.0,
        }
    }
}

impl KinematicsConfig {
    /// Check geometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        let finite = [
            self.theta1_min,
            self.theta1_max,
            self.theta1_zero_offset,
            self.theta2_zero_offset,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !positive(self.link1_mm)
            || !positive(self.link2_mm)
            || !positive(self.gear_ratio_j1)
            || !positive(self.gear_ratio_j2)
            || self.steps_per_rev == 0
            || !finite
            || self.theta1_min > self.theta1_max
        {
            return Err(ConfigError::InvalidGeometry);
        }
        Ok(())
    }
}

/// Complete arm configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArmConfig {
    /// Format version
    pub version: u8,
    /// Wait after boot before the control loop starts
    pub startup_delay_ms: u32,
    /// Command link
    pub serial: SerialConfig,
    /// Shoulder (X) axis
    pub shoulder: AxisConfig,
    /// Elbow (Y) axis
    pub elbow: AxisConfig,
    /// Geometry for host-side planning
    pub kinematics: KinematicsConfig,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            startup_delay_ms: 100,
            serial: SerialConfig::default(),
            shoulder: AxisConfig::named("shoulder"),
            elbow: AxisConfig::named("elbow"),
            kinematics: KinematicsConfig::default(),
        }
    }
}

impl ArmConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.baud_rate == 0 || self.serial.baud_rate > MAX_BAUD_RATE {
            return Err(ConfigError::InvalidBaudRate);
        }
        self.shoulder.validate()?;
        self.elbow.validate()?;
        self.kinematics.validate()
    }
}
