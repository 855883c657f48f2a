//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic and
//! board-specific driver implementations.

pub mod stepper;

pub use stepper::{Direction, StepperDriver};
