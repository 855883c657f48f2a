//! Two-axis control loop
//!
//! [`ArmController::tick`] is one pass of the firmware's busy loop: take at
//! most one command from the serial link, retarget both joints, then give
//! each joint the chance to step. Nothing in a tick blocks except the
//! bounded per-byte wait while a command is being scanned.

use scara_hal::SerialRx;
use scara_protocol::{CommandReader, MoveCommand};

use crate::config::ArmConfig;
use crate::motion::AxisController;
use crate::traits::StepperDriver;

/// Shoulder and elbow controllers fed by the serial command reader
#[derive(Debug)]
pub struct ArmController<X: StepperDriver, Y: StepperDriver> {
    reader: CommandReader,
    shoulder: AxisController<X>,
    elbow: AxisController<Y>,
}

impl<X: StepperDriver, Y: StepperDriver> ArmController<X, Y> {
    /// Assemble from prepared parts
    pub fn new(reader: CommandReader, shoulder: AxisController<X>, elbow: AxisController<Y>) -> Self {
        Self {
            reader,
            shoulder,
            elbow,
        }
    }

    /// Build both axes and the reader from configuration
    pub fn from_config(config: &ArmConfig, shoulder: X, elbow: Y) -> Self {
        Self::new(
            CommandReader::with_timeout(config.serial.parse_timeout_ms),
            AxisController::from_config(shoulder, &config.shoulder),
            AxisController::from_config(elbow, &config.elbow),
        )
    }

    /// Run one pass of the control loop
    ///
    /// Returns the command accepted during this pass, if any.
    pub fn tick<R: SerialRx + ?Sized>(&mut self, rx: &mut R, now_us: u64) -> Option<MoveCommand> {
        let command = self.reader.poll(rx);
        if let Some(cmd) = command {
            self.apply(cmd);
        }

        self.shoulder.step(now_us);
        self.elbow.step(now_us);

        command
    }

    /// Retarget both joints
    pub fn apply(&mut self, cmd: MoveCommand) {
        self.shoulder.set_target(cmd.shoulder);
        self.elbow.set_target(cmd.elbow);
    }

    /// Check if both joints are at rest on their targets
    pub fn is_idle(&self) -> bool {
        !self.shoulder.is_running() && !self.elbow.is_running()
    }

    /// Current joint positions in steps
    pub fn positions(&self) -> MoveCommand {
        MoveCommand::new(
            self.shoulder.current_position(),
            self.elbow.current_position(),
        )
    }

    /// Current joint targets in steps
    pub fn targets(&self) -> MoveCommand {
        MoveCommand::new(
            self.shoulder.target_position(),
            self.elbow.target_position(),
        )
    }

    /// Command reader
    pub fn reader(&self) -> &CommandReader {
        &self.reader
    }

    /// Shoulder axis
    pub fn shoulder(&self) -> &AxisController<X> {
        &self.shoulder
    }

    /// Mutable shoulder axis
    pub fn shoulder_mut(&mut self) -> &mut AxisController<X> {
        &mut self.shoulder
    }

    /// Elbow axis
    pub fn elbow(&self) -> &AxisController<Y> {
        &self.elbow
    }

    /// Mutable elbow axis
    pub fn elbow_mut(&mut self) -> &mut AxisController<Y> {
        &mut self.elbow
    }
}
