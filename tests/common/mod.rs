//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use hybrid_dispatch::sim::Template;
use hybrid_dispatch::sim::types::{
    BatteryParams, DispatchConfig, DispatchRules, GeneratorParams, HourlyRecord, Profiles,
    one_way_efficiency,
};

/// Horizon of the reference regression scenario.
pub const REFERENCE_HOURS: usize = 48;

/// Tolerance for per-hour energy balance checks (MWh).
pub const BALANCE_TOLERANCE: f64 = 1e-3;

/// Reference battery (40 MWh, 10/10 MW, 87% round trip, SOC 10-90%, start 50%).
pub fn reference_battery() -> BatteryParams {
    BatteryParams {
        capacity_mwh: 40.0,
        charge_power_mw: 10.0,
        discharge_power_mw: 10.0,
        efficiency: one_way_efficiency(0.87),
        min_soc_pct: 10.0,
        max_soc_pct: 90.0,
        initial_soc_pct: 50.0,
        daily_cycle_limit: 1.0,
        enforce_cycle_limit: false,
    }
}

/// Reference generator (27 MW, no battery charging).
pub fn reference_generator() -> GeneratorParams {
    GeneratorParams {
        enabled: true,
        capacity_mw: 27.0,
        charges_battery: false,
    }
}

/// Reference system under the given template with default windows.
pub fn reference_config(template: Template) -> DispatchConfig {
    DispatchConfig {
        battery: reference_battery(),
        generator: reference_generator(),
        rules: DispatchRules::default(),
        template,
    }
}

/// Flat 25 MW load with a clear-sky 60 MW solar day (06:00-18:00).
pub fn reference_profiles(hours: usize) -> Profiles {
    let solar = (0..hours)
        .map(|h| {
            let hod = (h % 24) as f64;
            if (6.0..18.0).contains(&hod) {
                60.0 * (std::f64::consts::PI * (hod - 6.0 + 0.5) / 12.0).sin()
            } else {
                0.0
            }
        })
        .collect();
    Profiles::new(vec![25.0; hours], solar)
}

/// Constant load and solar.
pub fn flat_profiles(load_mw: f64, solar_mw: f64, hours: usize) -> Profiles {
    Profiles::new(vec![load_mw; hours], vec![solar_mw; hours])
}

pub fn total_unserved(records: &[HourlyRecord]) -> f64 {
    records.iter().map(|r| r.unserved).sum()
}
