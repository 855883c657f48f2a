//! Motion control
//!
//! Trapezoidal position control for step/direction axes.

pub mod axis;

pub use axis::{AxisController, AxisState};
