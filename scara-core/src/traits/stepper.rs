//! Stepper motor driver trait
//!
//! The arm uses plain step/direction drivers (A4988, DRV8825, TMC in
//! standalone mode). The motion controller decides when a step is due; the
//! driver only turns that into pin activity.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
///
/// `Clockwise` is the direction of increasing step position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (position increases)
    #[default]
    Clockwise,
    /// Counter-clockwise rotation (position decreases)
    CounterClockwise,
}

impl Direction {
    /// Direction that reduces a signed step distance, `None` for zero
    pub fn toward(distance: i64) -> Option<Self> {
        match distance {
            0 => None,
            d if d > 0 => Some(Direction::Clockwise),
            _ => Some(Direction::CounterClockwise),
        }
    }

    /// Position change of one step in this direction
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Trait for step/direction stepper drivers
pub trait StepperDriver {
    /// Assert the direction line
    ///
    /// Called before every step. Implementations may skip the pin write
    /// when the direction is unchanged.
    fn set_direction(&mut self, dir: Direction);

    /// Emit a single step pulse
    fn step(&mut self);
}

impl<T: StepperDriver + ?Sized> StepperDriver for &mut T {
    fn set_direction(&mut self, dir: Direction) {
        T::set_direction(self, dir)
    }

    fn step(&mut self) {
        T::step(self)
    }
}
