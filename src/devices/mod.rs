//! Physical assets and synthetic hourly profile sources.

/// Synthetic load profile generator.
pub mod baseload;
/// Battery energy storage model.
pub mod battery;
/// Full-output diesel generator.
pub mod generator;
/// Synthetic solar PV profile generator.
pub mod solar;
pub mod types;

// Re-export the main types for convenience
pub use baseload::LoadProfile;
pub use battery::{Battery, ChargeOutcome};
pub use generator::Generator;
pub use solar::SolarProfile;
pub use types::HourlySource;
