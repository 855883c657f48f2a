//! SCARA Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the arm firmware
//! is written against. Chip-specific HALs implement them, which keeps the
//! command reader and motion code testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (scara-firmware, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scara-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  scara-hal-   │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (step and direction lines)
//! - [`uart::SerialRx`], [`uart::UartTx`] - Serial command link

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use uart::{SerialRx, UartConfig, UartTx};
