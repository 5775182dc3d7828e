//! Shared unit-test fixtures.

use super::template::Template;
use super::types::{
    BatteryParams, DispatchConfig, DispatchRules, GeneratorParams, HourInput, one_way_efficiency,
};

/// 40 MWh / 10 MW battery at 87% round trip, 27 MW generator.
pub(crate) fn reference_config(template: Template) -> DispatchConfig {
    DispatchConfig {
        battery: BatteryParams {
            capacity_mwh: 40.0,
            charge_power_mw: 10.0,
            discharge_power_mw: 10.0,
            efficiency: one_way_efficiency(0.87),
            min_soc_pct: 10.0,
            max_soc_pct: 90.0,
            initial_soc_pct: 50.0,
            daily_cycle_limit: 1.0,
            enforce_cycle_limit: false,
        },
        generator: GeneratorParams {
            enabled: true,
            capacity_mw: 27.0,
            charges_battery: false,
        },
        rules: DispatchRules::default(),
        template,
    }
}

pub(crate) fn hour(hour: usize, solar_mw: f64, load_mw: f64) -> HourInput {
    HourInput {
        hour,
        day: hour / 24,
        hour_of_day: (hour % 24) as u32,
        solar_mw,
        load_mw,
    }
}
