//! Per-hour energy balance residuals.
//!
//! Every residual is `inputs - outputs` for one record and should be zero
//! up to floating-point noise. The load residual may reach the unserved
//! epsilon, since shortfalls below it are snapped to zero.

use super::types::HourlyRecord;

/// Load minus everything that served it (including unserved).
///
/// `load - (solar_to_load + generator_to_load + battery_to_load + unserved)`
pub fn load_residual(r: &HourlyRecord) -> f64 {
    r.load_mw - (r.solar_to_load + r.generator_to_load + r.battery_to_load + r.unserved)
}

/// Solar minus its three destinations.
///
/// `solar - (solar_to_load + solar_to_battery + solar_curtailed)`
pub fn solar_residual(r: &HourlyRecord) -> f64 {
    r.solar_mw - (r.solar_to_load + r.solar_to_battery + r.solar_curtailed)
}

/// Rated generator output minus its three destinations.
///
/// Zero when the generator is OFF and every output is zero; when ON, the
/// destinations must add up to `capacity_mw`.
pub fn generator_residual(r: &HourlyRecord, capacity_mw: f64) -> f64 {
    let rated = if r.generator_on { capacity_mw } else { 0.0 };
    rated - r.generator_output()
}

/// Whether all residuals of `r` are within `tolerance`.
pub fn is_balanced(r: &HourlyRecord, generator_capacity_mw: f64, tolerance: f64) -> bool {
    load_residual(r).abs() <= tolerance
        && solar_residual(r).abs() <= tolerance
        && generator_residual(r, generator_capacity_mw).abs() <= tolerance
}
