//! Configuration types
//!
//! Board-agnostic configuration structures and the TOML reader that fills
//! them from the embedded `arm.toml`.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
