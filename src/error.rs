//! Error taxonomy for configuration and simulation input problems.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A single failed configuration constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_soc_pct"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that prevent a simulation run from starting.
///
/// Nothing here is raised mid-run: once a run starts, every hour produces
/// a record.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error("{profile} profile has {len} hours but the horizon needs {horizon}")]
    ProfileTooShort {
        profile: &'static str,
        len: usize,
        horizon: usize,
    },

    #[error("simulation horizon must cover at least one hour")]
    EmptyHorizon,

    #[error(transparent)]
    Scenario(#[from] ConfigError),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
