//! Trapezoidal step generator for one joint
//!
//! Motion is tracked with a ramp index `n`: the number of accelerated steps
//! behind the current speed. The speed of a step at index `n` is
//! `min(sqrt(2·a·n), max_speed)`, and coming to rest from index `n` takes
//! `n - 1` further steps at indices `n-1 .. 1`. After every step the next
//! index is planned as
//!
//! - one more than the last while there is room to stop (accelerate),
//! - the same when the cap is reached (cruise),
//! - one less when the remaining distance only just allows a stop
//!   (decelerate), or when the target lies behind the motion.
//!
//! The index never moves by more than one per step, so the speed changes
//! at no more than the configured acceleration, and the index never
//! exceeds the distance left, so the axis lands on the target exactly with
//! zero speed. A target behind the motion is reached by slowing to rest
//! first and then starting over in the other direction.

use libm::{ceilf, sqrtf};

use crate::config::AxisConfig;
use crate::traits::{Direction, StepperDriver};

/// Floor applied to speed and acceleration settings
pub const MIN_RATE: f32 = 0.001;

/// Motion state of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisState {
    /// At the target with zero speed
    Idle,
    /// A step is pending
    Moving,
}

/// Position controller for one stepper axis
///
/// Owns its driver. Call [`AxisController::step`] as often as possible; it
/// emits at most one step per call and only when the step interval for the
/// current speed has elapsed.
#[derive(Debug)]
pub struct AxisController<D: StepperDriver> {
    driver: D,
    /// Absolute position in steps
    position: i64,
    /// Absolute target in steps
    target: i64,
    /// Speed ceiling in steps/s
    max_speed: f32,
    /// Acceleration in steps/s²
    acceleration: f32,
    /// Ramp index of the last emitted step, 0 at rest
    ramp: u32,
    /// Ramp index of the next step, 0 when none is due
    next_ramp: u32,
    /// Smallest index that reaches max speed
    ramp_cap: u32,
    /// Direction of the next step
    direction: Direction,
    /// Signed speed of the next step in steps/s
    speed: f32,
    /// Time between the last step and the next one
    step_interval_us: u32,
    /// Timestamp of the last emitted step
    last_step_us: Option<u64>,
}

impl<D: StepperDriver> AxisController<D> {
    /// Create an idle axis at position 0
    pub fn new(driver: D, max_speed: f32, acceleration: f32) -> Self {
        let mut axis = Self {
            driver,
            position: 0,
            target: 0,
            max_speed: sanitize(max_speed),
            acceleration: sanitize(acceleration),
            ramp: 0,
            next_ramp: 0,
            ramp_cap: 1,
            direction: Direction::Clockwise,
            speed: 0.0,
            step_interval_us: 0,
            last_step_us: None,
        };
        axis.update_cap();
        axis
    }

    /// Create an axis with the limits from its configuration section
    pub fn from_config(driver: D, config: &AxisConfig) -> Self {
        Self::new(driver, config.max_speed, config.acceleration)
    }

    /// Set the absolute target position
    ///
    /// Current speed is kept. If the new target is behind the motion the
    /// axis decelerates, stops and reverses.
    pub fn set_target(&mut self, target: i64) {
        self.target = target;
        self.plan();
    }

    /// Set the target relative to the current position
    pub fn move_by(&mut self, delta: i64) {
        self.set_target(self.position.saturating_add(delta));
    }

    /// Emit one step if it is due at `now_us`
    ///
    /// Returns `true` when a step was emitted.
    pub fn step(&mut self, now_us: u64) -> bool {
        if self.next_ramp == 0 {
            return false;
        }

        if let Some(last) = self.last_step_us {
            if now_us.saturating_sub(last) < u64::from(self.step_interval_us) {
                return false;
            }
        }

        self.driver.set_direction(self.direction);
        self.driver.step();

        self.position = self.position.saturating_add(self.direction.sign());
        self.ramp = self.next_ramp;
        self.last_step_us = Some(now_us);
        self.plan();
        true
    }

    /// Decelerate to rest as quickly as the acceleration allows
    ///
    /// The target is moved to the point where the axis comes to rest.
    pub fn stop(&mut self) {
        if self.ramp > 0 {
            let stopping = i64::from(self.ramp - 1);
            self.target = self
                .position
                .saturating_add(stopping * self.direction.sign());
        } else {
            self.target = self.position;
        }
        self.plan();
    }

    /// Redefine the current position without moving
    ///
    /// The target follows the position and speed drops to zero.
    pub fn set_current_position(&mut self, position: i64) {
        self.position = position;
        self.target = position;
        self.ramp = 0;
        self.halt();
    }

    /// Change the speed ceiling
    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = sanitize(max_speed);
        self.update_cap();
        self.plan();
    }

    /// Change the acceleration
    ///
    /// The ramp index is rescaled so the current speed is kept.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        let acceleration = sanitize(acceleration);
        if self.ramp > 0 {
            let scaled = self.ramp as f32 * self.acceleration / acceleration;
            self.ramp = (scaled as u32).max(1);
        }
        self.acceleration = acceleration;
        self.update_cap();
        self.plan();
    }

    /// Current position in steps
    pub fn current_position(&self) -> i64 {
        self.position
    }

    /// Target position in steps
    pub fn target_position(&self) -> i64 {
        self.target
    }

    /// Signed steps from the current position to the target
    pub fn distance_to_go(&self) -> i64 {
        self.target.saturating_sub(self.position)
    }

    /// Signed speed of the next step in steps/s, 0 when idle
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed ceiling in steps/s
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps/s²
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Current motion state
    pub fn state(&self) -> AxisState {
        if self.next_ramp == 0 {
            AxisState::Idle
        } else {
            AxisState::Moving
        }
    }

    /// Check if a step is pending
    pub fn is_running(&self) -> bool {
        self.state() == AxisState::Moving
    }

    /// Access the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Release the driver
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Choose the ramp index, direction and interval of the next step
    fn plan(&mut self) {
        let remaining = self.target.saturating_sub(self.position);

        if self.ramp > 0 {
            let ahead = remaining.saturating_mul(self.direction.sign());
            let next = if ahead > 0 {
                let room = u32::try_from(ahead).unwrap_or(u32::MAX);
                self.ramp.saturating_add(1)
                    .min(self.ramp_cap)
                    .min(room)
                    .max(self.ramp - 1)
            } else {
                self.ramp - 1
            };

            if next > 0 {
                self.schedule(next);
                return;
            }

            // Came to rest
            self.ramp = 0;
        }

        match Direction::toward(remaining) {
            Some(direction) => {
                self.direction = direction;
                self.schedule(1);
            }
            None => self.halt(),
        }
    }

    fn schedule(&mut self, ramp: u32) {
        let speed = self.speed_at(ramp);
        self.next_ramp = ramp;
        self.speed = speed * self.direction.sign() as f32;
        self.step_interval_us = ((1_000_000.0 / speed) as u32).max(1);
    }

    fn halt(&mut self) {
        self.next_ramp = 0;
        self.speed = 0.0;
        self.step_interval_us = 0;
    }

    fn speed_at(&self, ramp: u32) -> f32 {
        sqrtf(2.0 * self.acceleration * ramp as f32).min(self.max_speed)
    }

    fn update_cap(&mut self) {
        let cap = ceilf(self.max_speed * self.max_speed / (2.0 * self.acceleration));
        self.ramp_cap = (cap as u32).max(1);
    }
}

fn sanitize(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.max(MIN_RATE)
    } else {
        MIN_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default)]
    struct MockDriver {
        direction: Option<Direction>,
        steps: Vec<Direction>,
    }

    impl StepperDriver for MockDriver {
        fn set_direction(&mut self, dir: Direction) {
            self.direction = Some(dir);
        }

        fn step(&mut self) {
            let dir = self.direction.expect("direction asserted before step");
            self.steps.push(dir);
        }
    }

    fn axis(max_speed: f32, acceleration: f32) -> AxisController<MockDriver> {
        AxisController::new(MockDriver::default(), max_speed, acceleration)
    }

    /// Tick at a fixed rate until idle, returning the elapsed time
    fn run_until_idle(axis: &mut AxisController<MockDriver>, now: &mut u64, dt: u64) {
        let mut guard = 0u64;
        while axis.is_running() {
            axis.step(*now);
            *now += dt;
            guard += 1;
            assert!(guard < 50_000_000, "axis never settled");
        }
    }

    #[test]
    fn test_new_axis_is_idle() {
        let mut a = axis(1000.0, 500.0);
        assert_eq!(a.state(), AxisState::Idle);
        assert_eq!(a.speed(), 0.0);
        assert!(!a.step(0));
        assert!(a.driver().steps.is_empty());
    }

    #[test]
    fn test_target_equal_to_position_stays_idle() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(0);
        assert_eq!(a.state(), AxisState::Idle);
        assert!(!a.step(0));
    }

    #[test]
    fn test_single_step_move() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(1);
        assert!(a.is_running());
        assert!(a.step(0));
        assert_eq!(a.current_position(), 1);
        assert_eq!(a.state(), AxisState::Idle);
        assert_eq!(a.speed(), 0.0);
    }

    #[test]
    fn test_first_step_is_immediate_then_spaced() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(100);
        assert!(a.step(5));
        // Index 2 runs at sqrt(2000) steps/s, about 22 ms apart
        assert!(!a.step(5 + 1000));
        assert!(a.step(5 + 22_361));
        assert_eq!(a.current_position(), 2);
    }

    #[test]
    fn test_trapezoid_reaches_cruise_and_lands_exactly() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(2000);

        let mut now = 0u64;
        let mut peak = 0.0f32;
        let mut prev_pos = 0;
        while a.is_running() {
            a.step(now);
            assert!(a.current_position() >= prev_pos);
            prev_pos = a.current_position();
            peak = peak.max(a.speed());
            now += 50;
        }

        assert_eq!(a.current_position(), 2000);
        assert_eq!(a.speed(), 0.0);
        assert_eq!(a.driver().steps.len(), 2000);
        assert!(peak > 990.0 && peak <= 1000.0);
        // 1 s ramp up, 1 s cruise, 1 s ramp down, plus discretisation
        assert!(now > 3_000_000 && now < 4_500_000);
    }

    #[test]
    fn test_short_move_is_triangular() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(100);
        let mut now = 0;
        let mut peak = 0.0f32;
        while a.is_running() {
            a.step(now);
            peak = peak.max(a.speed());
            now += 50;
        }
        assert_eq!(a.current_position(), 100);
        // sqrt(2·a·d/2) = sqrt(50_000)
        assert!(peak < 240.0);
    }

    #[test]
    fn test_negative_target() {
        let mut a = axis(800.0, 400.0);
        a.set_target(-300);
        let mut now = 0;
        run_until_idle(&mut a, &mut now, 50);
        assert_eq!(a.current_position(), -300);
        assert!(a
            .driver()
            .steps
            .iter()
            .all(|d| *d == Direction::CounterClockwise));
    }

    #[test]
    fn test_reversal_mid_motion_is_smooth() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(2000);
        let mut now = 0u64;
        while now < 1_000_000 {
            a.step(now);
            now += 50;
        }
        let turn_pos = a.current_position();
        assert!(turn_pos > 0 && turn_pos < 2000);

        a.set_target(-500);
        // Still heading forward while slowing down
        assert!(a.speed() > 0.0);

        let mut max_pos = turn_pos;
        let mut prev_speed = a.speed();
        while a.is_running() {
            a.step(now);
            max_pos = max_pos.max(a.current_position());
            // Speed never jumps by more than one ramp index
            assert!((a.speed() - prev_speed).abs() < 80.0);
            prev_speed = a.speed();
            now += 50;
        }

        assert_eq!(a.current_position(), -500);
        assert_eq!(a.speed(), 0.0);
        assert!(max_pos > turn_pos);
    }

    #[test]
    fn test_retarget_same_direction_keeps_speed() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(5000);
        let mut now = 0;
        while now < 500_000 {
            a.step(now);
            now += 50;
        }
        let before = a.speed();
        a.set_target(6000);
        assert_eq!(a.speed(), before);
    }

    #[test]
    fn test_stop_decelerates_without_reversing() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(10_000);
        let mut now = 0;
        while now < 1_500_000 {
            a.step(now);
            now += 50;
        }
        let at_stop = a.current_position();
        a.stop();
        assert!(a.target_position() > at_stop);
        assert!(a.target_position() < 10_000);

        run_until_idle(&mut a, &mut now, 50);
        assert_eq!(a.current_position(), a.target_position());
        assert!(a
            .driver()
            .steps
            .iter()
            .all(|d| *d == Direction::Clockwise));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut a = axis(1000.0, 500.0);
        a.set_current_position(42);
        a.stop();
        assert_eq!(a.target_position(), 42);
        assert_eq!(a.state(), AxisState::Idle);
    }

    #[test]
    fn test_set_current_position_clears_motion() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(1000);
        a.step(0);
        a.step(100_000);
        a.set_current_position(0);
        assert_eq!(a.distance_to_go(), 0);
        assert_eq!(a.speed(), 0.0);
        assert_eq!(a.state(), AxisState::Idle);
    }

    #[test]
    fn test_move_by_is_relative() {
        let mut a = axis(1000.0, 500.0);
        a.set_current_position(100);
        a.move_by(-40);
        assert_eq!(a.target_position(), 60);
        assert_eq!(a.distance_to_go(), -40);
    }

    #[test]
    fn test_lower_max_speed_mid_motion_still_lands() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(3000);
        let mut now = 0;
        while now < 1_500_000 {
            a.step(now);
            now += 50;
        }
        a.set_max_speed(200.0);
        assert!(a.speed().abs() <= 200.0);
        while a.is_running() {
            a.step(now);
            assert!(a.speed().abs() <= 200.0);
            now += 50;
        }
        assert_eq!(a.current_position(), 3000);
    }

    #[test]
    fn test_set_acceleration_keeps_speed() {
        let mut a = axis(1000.0, 500.0);
        a.set_target(3000);
        let mut now = 0;
        while now < 500_000 {
            a.step(now);
            now += 50;
        }
        let before = a.speed();
        a.set_acceleration(250.0);
        assert!((a.speed() - before).abs() < 5.0);
        run_until_idle(&mut a, &mut now, 50);
        assert_eq!(a.current_position(), 3000);
    }

    #[test]
    fn test_invalid_rates_are_clamped() {
        let a = axis(f32::NAN, -3.0);
        assert_eq!(a.max_speed(), MIN_RATE);
        assert_eq!(a.acceleration(), MIN_RATE);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_moves_monotonically_and_lands_on_target(
            start in -1000i64..1000,
            target in -1000i64..1000,
            max_speed in 500.0f32..5000.0,
            acceleration in 500.0f32..5000.0,
            dt in 50u64..200,
        ) {
            let mut a = axis(max_speed, acceleration);
            a.set_current_position(start);
            a.set_target(target);

            let mut now = 0u64;
            let mut prev = start;
            while a.is_running() {
                a.step(now);
                let pos = a.current_position();
                prop_assert!((pos - prev).abs() <= 1);
                prop_assert!((target - pos).abs() <= (target - prev).abs());
                prop_assert!(a.speed().abs() <= max_speed);
                prev = pos;
                now += dt;
            }

            prop_assert_eq!(a.current_position(), target);
            prop_assert_eq!(a.speed(), 0.0);
            prop_assert_eq!(a.driver().steps.len() as i64, (target - start).abs());
        }

        #[test]
        fn prop_step_intervals_respect_speed(
            target in 1i64..400,
            max_speed in 200.0f32..2000.0,
        ) {
            let mut a = axis(max_speed, 1000.0);
            a.set_target(target);

            let mut now = 0u64;
            let mut last: Option<u64> = None;
            let min_interval = (1_000_000.0 / max_speed) as u64;
            while a.is_running() {
                if a.step(now) {
                    if let Some(prev) = last {
                        prop_assert!(now - prev >= min_interval);
                    }
                    last = Some(now);
                }
                now += 25;
            }
        }
    }
}
