//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in scara-core:
//!
//! - Step/direction stepper drivers (A4988, DRV8825, TMC in standalone mode)

#![no_std]
#![deny(unsafe_code)]

pub mod stepper;

pub use stepper::{StepDirConfig, StepDirDriver};
