//! SCARA serial move-command protocol
//!
//! The host drives the arm over a plain ASCII serial link. There is a
//! single command:
//!
//! ```text
//! M <shoulder> <elbow>
//! ```
//!
//! `M` is followed by two signed decimal step targets separated by any
//! non-digit characters (`M 1200 -800`, `M,1200,-800\n`). Every other
//! leading byte is noise. Nothing is ever sent back unless the optional
//! debug echo is enabled by the firmware.
//!
//! - [`CommandReader`] turns a [`scara_hal::SerialRx`] byte stream into
//!   [`MoveCommand`]s, one per poll.
//! - [`MoveCommand::encode`] produces the line a sender writes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod reader;

pub use command::{MoveCommand, ECHO_LINE_LEN, MAX_LINE_LEN, MOVE_MARKER};
pub use reader::{CommandReader, ReaderStats, DEFAULT_PARSE_TIMEOUT_MS};
