//! Core simulation types: run configuration, carried state, and hourly records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::devices::{Battery, Generator};
use crate::error::ConfigError;

use super::template::Template;

/// Unserved energy below this many MWh counts as fully served.
pub const UNSERVED_EPSILON_MWH: f64 = 1e-3;

/// Smallest hysteresis deadband (percentage points) that does not warn.
pub const MIN_DEADBAND_PCT: f64 = 20.0;

/// Default simulation horizon: one non-leap year of hours.
pub const HOURS_PER_YEAR: usize = 8760;

/// Converts a round-trip efficiency into the symmetric one-way efficiency.
///
/// ```
/// use hybrid_dispatch::sim::types::one_way_efficiency;
///
/// let eta = one_way_efficiency(0.87);
/// assert!((eta * eta - 0.87).abs() < 1e-12);
/// ```
pub fn one_way_efficiency(round_trip: f64) -> f64 {
    round_trip.max(0.0).sqrt()
}

/// An hour-of-day interval `[start, end)`.
///
/// When `start > end` the window wraps past midnight, so `[22, 6)` covers
/// 22:00 through 05:59. A window with `start == end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns true if `hour_of_day` falls inside the window.
    pub fn contains(&self, hour_of_day: u32) -> bool {
        if self.start <= self.end {
            (self.start..self.end).contains(&hour_of_day)
        } else {
            hour_of_day >= self.start || hour_of_day < self.end
        }
    }

    /// Number of hours per day covered by the window.
    pub fn len(&self) -> u32 {
        (0..24).filter(|&h| self.contains(h)).count() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for HourWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02}:00, {:02}:00)", self.start, self.end)
    }
}

/// Which dispatchable source serves residual load first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPriority {
    #[default]
    BatteryFirst,
    GeneratorFirst,
}

/// Battery nameplate and operating limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryParams {
    /// Nameplate energy capacity (MWh).
    pub capacity_mwh: f64,
    /// Maximum charging power (MW).
    pub charge_power_mw: f64,
    /// Maximum discharging power (MW).
    pub discharge_power_mw: f64,
    /// One-way efficiency (0..=1), applied on both legs.
    pub efficiency: f64,
    /// Lower SOC bound (% of capacity).
    pub min_soc_pct: f64,
    /// Upper SOC bound (% of capacity).
    pub max_soc_pct: f64,
    /// SOC at hour 0 (% of capacity).
    pub initial_soc_pct: f64,
    /// Equivalent full cycles allowed per calendar day.
    pub daily_cycle_limit: f64,
    /// Whether `daily_cycle_limit` is enforced.
    pub enforce_cycle_limit: bool,
}

/// Diesel generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub enabled: bool,
    /// Rated output (MW). The generator runs at full output or not at all.
    pub capacity_mw: f64,
    /// Whether surplus generator output may charge the battery.
    pub charges_battery: bool,
}

/// Time windows, thresholds, and priority shared by all templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRules {
    pub load_priority: LoadPriority,
    pub day_window: HourWindow,
    pub night_window: HourWindow,
    pub blackout_window: HourWindow,
    /// Generator turns ON at or below this SOC (%).
    pub soc_on_pct: f64,
    /// Generator turns OFF at or above this SOC (%).
    pub soc_off_pct: f64,
}

impl Default for DispatchRules {
    fn default() -> Self {
        Self {
            load_priority: LoadPriority::BatteryFirst,
            day_window: HourWindow::new(6, 18),
            night_window: HourWindow::new(18, 6),
            blackout_window: HourWindow::new(22, 6),
            soc_on_pct: 30.0,
            soc_off_pct: 80.0,
        }
    }
}

/// Immutable configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub battery: BatteryParams,
    pub generator: GeneratorParams,
    pub rules: DispatchRules,
    pub template: Template,
}

impl DispatchConfig {
    /// Checks every physical and logical constraint and returns all failures.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let b = &self.battery;

        if !(b.capacity_mwh > 0.0) {
            errors.push(ConfigError::new("battery.capacity_mwh", "must be > 0"));
        }
        if !(b.charge_power_mw > 0.0) {
            errors.push(ConfigError::new("battery.charge_power_mw", "must be > 0"));
        }
        if !(b.discharge_power_mw > 0.0) {
            errors.push(ConfigError::new("battery.discharge_power_mw", "must be > 0"));
        }
        if !(b.efficiency > 0.0 && b.efficiency <= 1.0) {
            errors.push(ConfigError::new("battery.efficiency", "must be in (0, 1]"));
        }
        for (field, value) in [
            ("battery.min_soc_pct", b.min_soc_pct),
            ("battery.max_soc_pct", b.max_soc_pct),
            ("battery.initial_soc_pct", b.initial_soc_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 100]"));
            }
        }
        if b.min_soc_pct >= b.max_soc_pct {
            errors.push(ConfigError::new(
                "battery.min_soc_pct",
                "must be < battery.max_soc_pct",
            ));
        } else if !(b.min_soc_pct..=b.max_soc_pct).contains(&b.initial_soc_pct) {
            errors.push(ConfigError::new(
                "battery.initial_soc_pct",
                "must lie within [battery.min_soc_pct, battery.max_soc_pct]",
            ));
        }
        if b.enforce_cycle_limit && !(b.daily_cycle_limit > 0.0) {
            errors.push(ConfigError::new(
                "battery.daily_cycle_limit",
                "must be > 0 when enforced",
            ));
        }

        let g = &self.generator;
        if g.capacity_mw < 0.0 || !g.capacity_mw.is_finite() {
            errors.push(ConfigError::new("generator.capacity_mw", "must be >= 0"));
        } else if g.enabled && self.template.uses_generator() && g.capacity_mw <= 0.0 {
            errors.push(ConfigError::new(
                "generator.capacity_mw",
                "must be > 0 when the generator is enabled",
            ));
        }

        let r = &self.rules;
        let mut thresholds_in_range = true;
        for (field, value) in [
            ("rules.soc_on_pct", r.soc_on_pct),
            ("rules.soc_off_pct", r.soc_off_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 100]"));
                thresholds_in_range = false;
            }
        }
        if thresholds_in_range && r.soc_on_pct >= r.soc_off_pct {
            errors.push(ConfigError::new(
                "rules.soc_on_pct",
                "must be < rules.soc_off_pct",
            ));
        }
        for (field, window) in [
            ("rules.day_window", r.day_window),
            ("rules.night_window", r.night_window),
            ("rules.blackout_window", r.blackout_window),
        ] {
            if window.start >= 24 || window.end >= 24 {
                errors.push(ConfigError::new(field, "hours must be in 0..24"));
            }
        }
        if r.blackout_window.is_empty() {
            errors.push(ConfigError::new(
                "rules.blackout_window",
                "start and end cannot be the same",
            ));
        }

        errors
    }

    /// Soft problems that do not stop a run but usually indicate a mistake.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.template.uses_soc_hysteresis() {
            return warnings;
        }
        let r = &self.rules;
        let deadband = r.soc_off_pct - r.soc_on_pct;
        if deadband > 0.0 && deadband < MIN_DEADBAND_PCT {
            warnings.push(format!(
                "small SOC deadband ({deadband:.0} points) may cause frequent generator cycling"
            ));
        }
        if r.soc_on_pct < self.battery.min_soc_pct {
            warnings.push(format!(
                "SOC-on threshold {:.0}% is below the battery minimum {:.0}% and can never trigger",
                r.soc_on_pct, self.battery.min_soc_pct
            ));
        }
        if r.soc_off_pct > self.battery.max_soc_pct {
            warnings.push(format!(
                "SOC-off threshold {:.0}% is above the battery maximum {:.0}%; the generator only stops when its window closes",
                r.soc_off_pct, self.battery.max_soc_pct
            ));
        }
        warnings
    }

    /// Whether the generator can ever run under this configuration.
    pub fn generator_available(&self) -> bool {
        self.generator.enabled && self.generator.capacity_mw > 0.0 && self.template.uses_generator()
    }
}

/// Hourly load and solar series, both in MW (equivalently MWh per hour).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profiles {
    pub load_mw: Vec<f64>,
    pub solar_mw: Vec<f64>,
}

impl Profiles {
    pub fn new(load_mw: Vec<f64>, solar_mw: Vec<f64>) -> Self {
        Self { load_mw, solar_mw }
    }

    /// Shortest usable horizon across both series.
    pub fn len(&self) -> usize {
        self.load_mw.len().min(self.solar_mw.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exogenous inputs for one simulated hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourInput {
    pub hour: usize,
    pub day: usize,
    pub hour_of_day: u32,
    pub solar_mw: f64,
    pub load_mw: f64,
}

/// State carried from one hour to the next. Owned by a single run.
#[derive(Debug, Clone)]
pub struct RunState {
    pub battery: Battery,
    pub generator: Generator,
    pub generator_on: bool,
    pub day: usize,
}

impl RunState {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            battery: Battery::new(&config.battery),
            generator: Generator::new(&config.generator),
            generator_on: false,
            day: 0,
        }
    }

    /// Rolls the per-hour battery budget and, at midnight, the daily
    /// cycle counter. Called by the driver before each dispatch step.
    pub fn begin_hour(&mut self, input: &HourInput) {
        if input.hour_of_day == 0 {
            self.battery.begin_day();
        }
        self.day = input.day;
        self.battery.begin_hour();
    }
}

/// Battery operating state over one hour, classified by net power.
///
/// An hour that discharges to load and recharges from surplus in the same
/// step reports the sign of the net flow; `battery_to_load` and the two
/// charging legs of [`HourlyRecord`] keep the gross amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryMode {
    Charging,
    Discharging,
    Idle,
}

impl fmt::Display for BatteryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::Idle => "Idle",
        };
        f.write_str(s)
    }
}

/// Complete record of one simulated hour. Energies are in MWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Hour index from the start of the run.
    pub hour: usize,
    /// Day index (0-based).
    pub day: usize,
    /// Hour of day (0..24).
    pub hour_of_day: u32,
    /// Solar generation available this hour.
    pub solar_mw: f64,
    /// Load requirement this hour.
    pub load_mw: f64,
    /// Net battery power (positive = discharge, negative = charge).
    ///
    /// Discharge and recharge can both happen in one hour, so this may be
    /// near zero while SOC still drops by the round-trip loss.
    pub battery_mw: f64,
    /// Stored energy after the hour.
    pub stored_mwh: f64,
    /// SOC after the hour (% of capacity).
    pub soc_pct: f64,
    pub battery_mode: BatteryMode,
    pub generator_on: bool,
    pub solar_to_load: f64,
    pub generator_to_load: f64,
    pub battery_to_load: f64,
    pub solar_to_battery: f64,
    pub generator_to_battery: f64,
    pub generator_curtailed: f64,
    pub solar_curtailed: f64,
    pub unserved: f64,
}

impl HourlyRecord {
    /// True when the whole load was served this hour.
    pub fn delivered(&self) -> bool {
        self.unserved == 0.0
    }

    /// Total generator output (load + battery + curtailed).
    pub fn generator_output(&self) -> f64 {
        self.generator_to_load + self.generator_to_battery + self.generator_curtailed
    }
}

impl fmt::Display for HourlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>4} d={:>3} {:02}:00 | load={:>6.2} solar={:>6.2} | \
             bat={:>6.2} ({:<11} SoC={:>5.1}%) dg={} | \
             to_load(pv={:.2} dg={:.2} bat={:.2}) unmet={:.2} curt(pv={:.2} dg={:.2})",
            self.hour,
            self.day,
            self.hour_of_day,
            self.load_mw,
            self.solar_mw,
            self.battery_mw,
            self.battery_mode,
            self.soc_pct,
            if self.generator_on { "ON " } else { "OFF" },
            self.solar_to_load,
            self.generator_to_load,
            self.battery_to_load,
            self.unserved,
            self.solar_curtailed,
            self.generator_curtailed,
        )
    }
}
