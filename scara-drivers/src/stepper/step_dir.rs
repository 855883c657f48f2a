//! Generic step/direction stepper driver
//!
//! Two GPIO lines per motor. The direction line selects the rotation and
//! must be stable before the step edge; each rising edge on the step line
//! advances the motor one (micro)step.
//!
//! # Timing
//!
//! The step pulse is held high for `pulse_width_us` using a busy delay.
//! Common drivers need 1-2 µs (A4988 1 µs, DRV8825 1.9 µs).
//!
//! After the direction line changes, the driver waits `dir_setup_ns` before
//! the next step edge can follow (A4988 200 ns, DRV8825 650 ns).

use embedded_hal::delay::DelayNs;
use scara_core::config::AxisConfig;
use scara_core::traits::{Direction, StepperDriver};
use scara_hal::OutputPin;

/// Step/direction driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDirConfig {
    /// Minimum step pulse high time
    pub pulse_width_us: u32,
    /// Direction setup time before the next step edge
    pub dir_setup_ns: u32,
    /// Drive the direction line low for clockwise
    pub invert_dir: bool,
}

impl Default for StepDirConfig {
    fn default() -> Self {
        Self {
            pulse_width_us: 2,
            dir_setup_ns: 1000,
            invert_dir: false,
        }
    }
}

impl From<&AxisConfig> for StepDirConfig {
    fn from(axis: &AxisConfig) -> Self {
        Self {
            pulse_width_us: axis.pulse_width_us,
            dir_setup_ns: axis.dir_setup_ns,
            invert_dir: axis.invert_dir,
        }
    }
}

/// Step/direction stepper driver
pub struct StepDirDriver<STEP, DIR, D> {
    step: STEP,
    dir: DIR,
    delay: D,
    config: StepDirConfig,
    /// Direction last written to the pin
    direction: Option<Direction>,
    /// Steps emitted since creation
    pulses: u32,
}

impl<STEP, DIR, D> StepDirDriver<STEP, DIR, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayNs,
{
    /// Create a driver; the step line is driven low
    pub fn new(mut step: STEP, dir: DIR, delay: D, config: StepDirConfig) -> Self {
        step.set_low();
        Self {
            step,
            dir,
            delay,
            config,
            direction: None,
            pulses: 0,
        }
    }

    /// Get the driver configuration
    pub fn config(&self) -> &StepDirConfig {
        &self.config
    }

    /// Direction currently on the pin, `None` before the first write
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Steps emitted since creation
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    /// Release the pins and delay
    pub fn release(self) -> (STEP, DIR, D) {
        (self.step, self.dir, self.delay)
    }
}

impl<STEP, DIR, D> StepperDriver for StepDirDriver<STEP, DIR, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayNs,
{
    fn set_direction(&mut self, dir: Direction) {
        if self.direction == Some(dir) {
            return;
        }
        let high = (dir == Direction::Clockwise) != self.config.invert_dir;
        self.dir.set_state(high);
        self.direction = Some(dir);
        if self.config.dir_setup_ns > 0 {
            self.delay.delay_ns(self.config.dir_setup_ns);
        }
    }

    fn step(&mut self) {
        self.step.set_high();
        self.delay.delay_us(self.config.pulse_width_us);
        self.step.set_low();
        self.pulses = self.pulses.wrapping_add(1);
    }
}
