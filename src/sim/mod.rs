/// Per-hour energy balance residuals.
pub mod balance;
/// Whole-run memoization.
pub mod cache;
/// Hour clock for horizon and calendar tracking.
pub mod clock;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod kpi;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use engine::{Engine, simulate};
pub use template::Template;
pub use types::{DispatchConfig, HourlyRecord, Profiles};
