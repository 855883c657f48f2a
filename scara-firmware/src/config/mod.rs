//! Configuration loading
//!
//! The configuration is `arm.toml`, embedded at build time and parsed at
//! boot by the no_std reader in scara-core.

pub mod loader;

pub use loader::load_config;
