//! Board-agnostic core logic for the SCARA arm firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Stepper driver trait
//! - Trapezoidal position control per axis
//! - The two-axis control loop fed by the serial command reader
//! - Configuration types and the embedded TOML reader
//! - Inverse kinematics for producing move commands on a host

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod arm;
pub mod config;
pub mod kinematics;
pub mod motion;
pub mod traits;

pub use arm::ArmController;
pub use motion::{AxisController, AxisState};
pub use traits::{Direction, StepperDriver};
