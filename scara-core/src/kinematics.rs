//! SCARA inverse kinematics for host-side planning
//!
//! Converts tool positions in millimetres into the absolute step targets
//! carried by a [`MoveCommand`]. Angles are in degrees. The math frame has
//! 0° along +X with positive angles counter-clockwise; the motor frame is
//! the math frame minus the zero offsets, and motor steps count in the
//! opposite sense for Cartesian moves.

use libm::{acosf, atan2f, cosf, fabsf, floorf, sinf, sqrtf};
use scara_protocol::MoveCommand;

use crate::config::KinematicsConfig;

/// Slack added to the reach check so the fully extended pose is accepted
pub const REACH_TOLERANCE_MM: f32 = 0.1;

/// Shoulder angle assumed before the first move (arm straight up)
pub const INITIAL_THETA1: f32 = 90.0;

/// Default jog increment in motor degrees
pub const JOG_STEP_DEG: f32 = 10.0;

/// Kinematics errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KinematicsError {
    /// Coordinate is NaN or infinite
    InvalidInput,
    /// Point is farther than both links can reach
    OutOfReach,
    /// Neither elbow solution keeps the shoulder inside its limits
    JointLimit,
}

/// Joint angles in the math frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointAngles {
    /// Shoulder angle in degrees
    pub theta1: f32,
    /// Elbow angle relative to the first link in degrees
    pub theta2: f32,
}

/// Wrap an angle into [-180, 180)
pub fn normalize_angle(deg: f32) -> f32 {
    ((deg + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}

/// Motor degrees to steps, rounding halves up
pub fn degrees_to_steps(deg: f32, gear_ratio: f32, steps_per_rev: u32) -> i64 {
    floorf(deg / 360.0 * steps_per_rev as f32 * gear_ratio + 0.5) as i64
}

/// Two-link arm geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ScaraKinematics {
    config: KinematicsConfig,
}

impl Default for ScaraKinematics {
    fn default() -> Self {
        Self::new(KinematicsConfig::default())
    }
}

impl ScaraKinematics {
    pub fn new(config: KinematicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    /// Farthest reachable distance from the shoulder axis
    pub fn max_reach(&self) -> f32 {
        self.config.link1_mm + self.config.link2_mm
    }

    /// Solve for the joint angles that put the tool at `(x, y)`
    ///
    /// Both elbow solutions are computed. When both keep the shoulder in
    /// range, the one closer to `current_theta1` wins so the arm does not
    /// swing across.
    pub fn inverse(&self, x: f32, y: f32, current_theta1: f32) -> Result<JointAngles, KinematicsError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(KinematicsError::InvalidInput);
        }

        let l1 = self.config.link1_mm;
        let l2 = self.config.link2_mm;

        let r = sqrtf(x * x + y * y);
        if r > self.max_reach() + REACH_TOLERANCE_MM {
            return Err(KinematicsError::OutOfReach);
        }

        let cos_theta2 = ((x * x + y * y - l1 * l1 - l2 * l2) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
        let theta2 = acosf(cos_theta2);

        // Elbow-down, then elbow-up
        let a = self.solve(x, y, theta2);
        let b = self.solve(x, y, -theta2);

        match (self.shoulder_in_range(&a), self.shoulder_in_range(&b)) {
            (true, false) => Ok(a),
            (false, true) => Ok(b),
            (true, true) => {
                let da = fabsf(normalize_angle(a.theta1 - current_theta1));
                let db = fabsf(normalize_angle(b.theta1 - current_theta1));
                Ok(if da <= db { a } else { b })
            }
            (false, false) => Err(KinematicsError::JointLimit),
        }
    }

    /// Tool position for the given joint angles
    pub fn forward(&self, angles: JointAngles) -> (f32, f32) {
        let t1 = angles.theta1.to_radians();
        let t12 = t1 + angles.theta2.to_radians();
        let x = self.config.link1_mm * cosf(t1) + self.config.link2_mm * cosf(t12);
        let y = self.config.link1_mm * sinf(t1) + self.config.link2_mm * sinf(t12);
        (x, y)
    }

    fn solve(&self, x: f32, y: f32, theta2: f32) -> JointAngles {
        let k1 = self.config.link1_mm + self.config.link2_mm * cosf(theta2);
        let k2 = self.config.link2_mm * sinf(theta2);
        let theta1 = atan2f(y, x) - atan2f(k2, k1);
        JointAngles {
            theta1: normalize_angle(theta1.to_degrees()),
            theta2: normalize_angle(theta2.to_degrees()),
        }
    }

    fn shoulder_in_range(&self, angles: &JointAngles) -> bool {
        angles.theta1 >= self.config.theta1_min && angles.theta1 <= self.config.theta1_max
    }
}

/// Turns Cartesian targets into move commands
///
/// Remembers the last commanded shoulder angle to keep successive
/// solutions on the same side.
#[derive(Debug, Clone)]
pub struct CartesianPlanner {
    kinematics: ScaraKinematics,
    current_theta1: f32,
}

impl Default for CartesianPlanner {
    fn default() -> Self {
        Self::new(KinematicsConfig::default())
    }
}

impl CartesianPlanner {
    pub fn new(config: KinematicsConfig) -> Self {
        Self {
            kinematics: ScaraKinematics::new(config),
            current_theta1: INITIAL_THETA1,
        }
    }

    pub fn kinematics(&self) -> &ScaraKinematics {
        &self.kinematics
    }

    /// Last commanded shoulder angle in the math frame
    pub fn current_theta1(&self) -> f32 {
        self.current_theta1
    }

    /// Command that moves the tool to `(x, y)` millimetres
    pub fn move_to(&mut self, x: f32, y: f32) -> Result<MoveCommand, KinematicsError> {
        let angles = self.kinematics.inverse(x, y, self.current_theta1)?;
        self.current_theta1 = angles.theta1;

        let config = self.kinematics.config();
        let theta1_motor = angles.theta1 - config.theta1_zero_offset;
        let theta2_motor = angles.theta2 - config.theta2_zero_offset;

        Ok(MoveCommand::new(
            degrees_to_steps(-theta1_motor, config.gear_ratio_j1, config.steps_per_rev),
            degrees_to_steps(-theta2_motor, config.gear_ratio_j2, config.steps_per_rev),
        ))
    }

    /// Command that turns both joints to motor-frame angles
    ///
    /// Bypasses kinematics and joint limits.
    pub fn rotate(&self, j1_motor_deg: f32, j2_motor_deg: f32) -> MoveCommand {
        let config = self.kinematics.config();
        MoveCommand::new(
            degrees_to_steps(j1_motor_deg, config.gear_ratio_j1, config.steps_per_rev),
            degrees_to_steps(j2_motor_deg, config.gear_ratio_j2, config.steps_per_rev),
        )
    }

    /// Command back to the fully extended pose straight ahead, `(0, L1 + L2)`
    pub fn home(&mut self) -> Result<MoveCommand, KinematicsError> {
        let reach = self.kinematics.max_reach();
        self.move_to(0.0, reach)
    }
}

/// Jog button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogDirection {
    /// Elbow forward
    Up,
    /// Elbow back
    Down,
    /// Shoulder back
    Left,
    /// Shoulder forward
    Right,
}

/// Accumulates jog presses into motor-frame joint angles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jog {
    increment: f32,
    j1_deg: f32,
    j2_deg: f32,
}

impl Default for Jog {
    fn default() -> Self {
        Self::new(JOG_STEP_DEG)
    }
}

impl Jog {
    pub fn new(increment: f32) -> Self {
        Self {
            increment,
            j1_deg: 0.0,
            j2_deg: 0.0,
        }
    }

    /// Accumulated (shoulder, elbow) motor angles
    pub fn angles(&self) -> (f32, f32) {
        (self.j1_deg, self.j2_deg)
    }

    /// Forget accumulated presses
    pub fn reset(&mut self) {
        self.j1_deg = 0.0;
        self.j2_deg = 0.0;
    }

    /// Apply one press and produce the matching rotate command
    pub fn nudge(&mut self, direction: JogDirection, planner: &CartesianPlanner) -> MoveCommand {
        match direction {
            JogDirection::Up => self.j2_deg += self.increment,
            JogDirection::Down => self.j2_deg -= self.increment,
            JogDirection::Right => self.j1_deg += self.increment,
            JogDirection::Left => self.j1_deg -= self.increment,
        }
        planner.rotate(self.j1_deg, self.j2_deg)
    }
}
