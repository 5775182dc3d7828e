//! Hourly dispatch simulator for hybrid Solar PV + Battery + Diesel systems.

/// Command-line parsing for the binary.
pub mod cli;
/// TOML scenarios and built-in presets.
pub mod config;
pub mod devices;
pub mod error;
/// Templates, controller, dispatch step, driver, and summaries.
pub mod sim;

pub use error::{ConfigError, DispatchError, DispatchResult};
