//! RP2040-specific HAL for the SCARA arm firmware
//!
//! This crate provides RP2040 implementations of the shared `scara-hal`
//! traits on top of embassy-rp:
//!
//! - Push-pull outputs for the step and direction lines
//! - Buffered UART halves for the command link

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::RpOutput;
pub use uart::{BufferedRx, BufferedTx, UartError};
