//! # Keystone Probe
//!
//! Command-line inspection of a Redis cache through the keystone cache
//! facade, logging through the keystone logger.

pub mod commands;
pub mod config;

pub use commands::{Command, run};
pub use config::{Config, Overrides};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
