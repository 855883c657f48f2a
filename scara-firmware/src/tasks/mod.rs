//! Embassy async tasks

pub mod control;

pub use control::{control_task, Arm};
