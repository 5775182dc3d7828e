//! TOML-based scenario configuration and preset definitions.
//!
//! A scenario bundles the dispatch configuration with the parameters of
//! the synthetic load and solar profiles it runs against. Profiles loaded
//! from real data bypass this module and go straight to
//! [`simulate`](crate::sim::engine::simulate).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::devices::{HourlySource, LoadProfile, SolarProfile};
use crate::error::{ConfigError, DispatchError, DispatchResult};
use crate::sim::template::{GeneratorTiming, GeneratorTrigger, Template, infer_template};
use crate::sim::types::{
    BatteryParams, DispatchConfig, DispatchRules, GeneratorParams, HOURS_PER_YEAR, HourWindow,
    LoadPriority, Profiles, one_way_efficiency,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the reference system (40 MWh battery,
/// 27 MW generator, 25 MW flat load). Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or start from a preset with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, seed, and template selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Diesel generator parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Dispatch windows, thresholds, and priority.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Synthetic load profile parameters.
    #[serde(default)]
    pub load: LoadConfig,
    /// Synthetic solar profile parameters.
    #[serde(default)]
    pub solar: SolarConfig,
}

/// Horizon, seed, and template selection.
///
/// When `template` is absent it is inferred from `generator.enabled`,
/// `generator_timing`, and `generator_trigger`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of hours to simulate (must be > 0).
    pub hours: usize,
    /// Master random seed for the synthetic profiles.
    pub seed: u64,
    /// Explicit template id (0 to 6).
    pub template: Option<u8>,
    /// When the generator may run, used for template inference.
    pub generator_timing: GeneratorTiming,
    /// What starts the generator, used for template inference.
    pub generator_trigger: GeneratorTrigger,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hours: HOURS_PER_YEAR,
            seed: 42,
            template: None,
            generator_timing: GeneratorTiming::Anytime,
            generator_trigger: GeneratorTrigger::Reactive,
        }
    }
}

/// Battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nameplate capacity (MWh).
    pub capacity_mwh: f64,
    /// Maximum charging power (MW).
    pub charge_power_mw: f64,
    /// Maximum discharging power (MW).
    pub discharge_power_mw: f64,
    /// Round-trip efficiency (0.0-1.0); split evenly over both legs.
    pub round_trip_efficiency: f64,
    /// Lower SOC bound (%).
    pub min_soc_pct: f64,
    /// Upper SOC bound (%).
    pub max_soc_pct: f64,
    /// SOC at hour 0 (%).
    pub initial_soc_pct: f64,
    /// Equivalent full cycles per day.
    pub daily_cycle_limit: f64,
    pub enforce_cycle_limit: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_mwh: 40.0,
            charge_power_mw: 10.0,
            discharge_power_mw: 10.0,
            round_trip_efficiency: 0.87,
            min_soc_pct: 10.0,
            max_soc_pct: 90.0,
            initial_soc_pct: 50.0,
            daily_cycle_limit: 1.0,
            enforce_cycle_limit: false,
        }
    }
}

/// Diesel generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub enabled: bool,
    /// Rated output (MW).
    pub capacity_mw: f64,
    /// Route surplus generator output into the battery.
    pub charges_battery: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity_mw: 27.0,
            charges_battery: false,
        }
    }
}

/// Dispatch windows, thresholds, and priority.
///
/// Windows are `[start, end)` hours of day and wrap past midnight when
/// `start > end`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// `"battery_first"` or `"generator_first"`.
    pub load_priority: LoadPriority,
    pub day_start: u32,
    pub day_end: u32,
    pub night_start: u32,
    pub night_end: u32,
    pub blackout_start: u32,
    pub blackout_end: u32,
    /// Generator ON at or below this SOC (%).
    pub soc_on_pct: f64,
    /// Generator OFF at or above this SOC (%).
    pub soc_off_pct: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = DispatchRules::default();
        Self {
            load_priority: rules.load_priority,
            day_start: rules.day_window.start,
            day_end: rules.day_window.end,
            night_start: rules.night_window.start,
            night_end: rules.night_window.end,
            blackout_start: rules.blackout_window.start,
            blackout_end: rules.blackout_window.end,
            soc_on_pct: rules.soc_on_pct,
            soc_off_pct: rules.soc_off_pct,
        }
    }
}

/// Synthetic load profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Baseline demand (MW).
    pub base_mw: f64,
    /// Sinusoidal daily amplitude (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_mw: 25.0,
            amp_mw: 0.0,
            phase_rad: 0.0,
            noise_std: 0.0,
        }
    }
}

/// Synthetic solar profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Clear-sky output at solar noon (MW).
    pub peak_mw: f64,
    /// Hour of day when generation starts (inclusive).
    pub sunrise: u32,
    /// Hour of day when generation stops (exclusive).
    pub sunset: u32,
    /// Relative noise standard deviation.
    pub noise_std: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            peak_mw: 60.0,
            sunrise: 6,
            sunset: 18,
            noise_std: 0.0,
        }
    }
}

impl ScenarioConfig {
    /// 48-hour regression scenario under T1: reactive generator, flat 25 MW load.
    pub fn reference() -> Self {
        Self {
            simulation: SimulationConfig {
                hours: 48,
                template: Some(1),
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Solar and battery only, one year with a swinging, noisy load.
    pub fn solar_only() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(0),
                ..SimulationConfig::default()
            },
            generator: GeneratorConfig {
                enabled: false,
                ..GeneratorConfig::default()
            },
            load: Self::varying_load(),
            solar: Self::cloudy_solar(),
            ..Self::default()
        }
    }

    /// Generator runs all night and tops up the battery.
    pub fn night_charge() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(2),
                ..SimulationConfig::default()
            },
            generator: GeneratorConfig {
                charges_battery: true,
                ..GeneratorConfig::default()
            },
            rules: RulesConfig {
                load_priority: LoadPriority::GeneratorFirst,
                ..RulesConfig::default()
            },
            load: Self::varying_load(),
            solar: Self::cloudy_solar(),
            ..Self::default()
        }
    }

    /// Reactive generator with a 22:00-06:00 blackout.
    pub fn blackout() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(3),
                ..SimulationConfig::default()
            },
            load: Self::varying_load(),
            solar: Self::cloudy_solar(),
            ..Self::default()
        }
    }

    /// SOC-triggered generator at any hour.
    pub fn emergency() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(4),
                ..SimulationConfig::default()
            },
            generator: GeneratorConfig {
                charges_battery: true,
                ..GeneratorConfig::default()
            },
            load: Self::varying_load(),
            solar: Self::cloudy_solar(),
            ..Self::default()
        }
    }

    /// SOC-triggered generator, day window only.
    pub fn day_charge() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(5),
                ..SimulationConfig::default()
            },
            ..Self::emergency()
        }
    }

    /// SOC-triggered generator, night window only.
    pub fn night_soc() -> Self {
        Self {
            simulation: SimulationConfig {
                template: Some(6),
                ..SimulationConfig::default()
            },
            ..Self::emergency()
        }
    }

    fn varying_load() -> LoadConfig {
        LoadConfig {
            base_mw: 22.0,
            amp_mw: 4.0,
            phase_rad: 1.2,
            noise_std: 1.0,
        }
    }

    fn cloudy_solar() -> SolarConfig {
        SolarConfig {
            noise_std: 0.15,
            ..SolarConfig::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "reference",
        "solar_only",
        "night_charge",
        "blackout",
        "emergency",
        "day_charge",
        "night_soc",
    ];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reference" => Ok(Self::reference()),
            "solar_only" => Ok(Self::solar_only()),
            "night_charge" => Ok(Self::night_charge()),
            "blackout" => Ok(Self::blackout()),
            "emergency" => Ok(Self::emergency()),
            "day_charge" => Ok(Self::day_charge()),
            "night_soc" => Ok(Self::night_soc()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// The template this scenario runs: explicit id, or inferred.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an id outside 0..=6.
    pub fn template(&self) -> Result<Template, ConfigError> {
        match self.simulation.template {
            Some(id) => Template::try_from(id).map_err(|e| ConfigError {
                field: "simulation.template".into(),
                ..e
            }),
            None => Ok(infer_template(
                self.generator.enabled,
                self.simulation.generator_timing,
                self.simulation.generator_trigger,
            )),
        }
    }

    /// Converts the scenario into an engine configuration.
    ///
    /// Round-trip efficiency becomes one-way efficiency here. The result is
    /// not validated; see [`ScenarioConfig::validate`].
    pub fn to_dispatch_config(&self) -> Result<DispatchConfig, ConfigError> {
        let b = &self.battery;
        let g = &self.generator;
        let r = &self.rules;

        Ok(DispatchConfig {
            battery: BatteryParams {
                capacity_mwh: b.capacity_mwh,
                charge_power_mw: b.charge_power_mw,
                discharge_power_mw: b.discharge_power_mw,
                efficiency: one_way_efficiency(b.round_trip_efficiency),
                min_soc_pct: b.min_soc_pct,
                max_soc_pct: b.max_soc_pct,
                initial_soc_pct: b.initial_soc_pct,
                daily_cycle_limit: b.daily_cycle_limit,
                enforce_cycle_limit: b.enforce_cycle_limit,
            },
            generator: GeneratorParams {
                enabled: g.enabled,
                capacity_mw: g.capacity_mw,
                charges_battery: g.charges_battery,
            },
            rules: DispatchRules {
                load_priority: r.load_priority,
                day_window: HourWindow::new(r.day_start, r.day_end),
                night_window: HourWindow::new(r.night_start, r.night_end),
                blackout_window: HourWindow::new(r.blackout_start, r.blackout_end),
                soc_on_pct: r.soc_on_pct,
                soc_off_pct: r.soc_off_pct,
            },
            template: self.template()?,
        })
    }

    /// Generates the seeded load and solar series for the horizon.
    ///
    /// Call only after [`ScenarioConfig::validate`] returns no errors.
    pub fn profiles(&self) -> Profiles {
        let hours = self.simulation.hours;
        let seed = self.simulation.seed;
        let l = &self.load;
        let s = &self.solar;

        let mut load = LoadProfile::new(l.base_mw, l.amp_mw, l.phase_rad, l.noise_std, seed);
        let mut solar = SolarProfile::new(
            s.peak_mw,
            s.sunrise,
            s.sunset,
            s.noise_std,
            seed.wrapping_add(1),
        );
        Profiles::new(load.series(hours), solar.series(hours))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Covers the scenario-only fields plus every engine constraint from
    /// [`DispatchConfig::validate`]. Returns an empty vector if the
    /// scenario is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.hours == 0 {
            errors.push(ConfigError::new("simulation.hours", "must be > 0"));
        }

        let rte = self.battery.round_trip_efficiency;
        if !(rte > 0.0 && rte <= 1.0) {
            errors.push(ConfigError::new(
                "battery.round_trip_efficiency",
                "must be in (0, 1]",
            ));
        }

        let sol = &self.solar;
        if sol.sunrise >= sol.sunset {
            errors.push(ConfigError::new("solar.sunrise", "must be < solar.sunset"));
        }
        if sol.sunset > 24 {
            errors.push(ConfigError::new("solar.sunset", "must be <= 24"));
        }
        if !(sol.peak_mw >= 0.0) {
            errors.push(ConfigError::new("solar.peak_mw", "must be >= 0"));
        }
        if !(sol.noise_std >= 0.0) {
            errors.push(ConfigError::new("solar.noise_std", "must be >= 0"));
        }
        if !(self.load.noise_std >= 0.0) {
            errors.push(ConfigError::new("load.noise_std", "must be >= 0"));
        }

        match self.to_dispatch_config() {
            Ok(config) => errors.extend(
                config
                    .validate()
                    .into_iter()
                    .filter(|e| e.field != "battery.efficiency"),
            ),
            Err(e) => errors.push(e),
        }

        errors
    }

    /// Non-fatal warnings for the resolved configuration.
    pub fn warnings(&self) -> Vec<String> {
        self.to_dispatch_config()
            .map(|c| c.warnings())
            .unwrap_or_default()
    }

    /// Validates the scenario and produces everything a run needs.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfig`] listing every problem.
    pub fn build(&self) -> DispatchResult<(DispatchConfig, Profiles)> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(DispatchError::InvalidConfig(errors));
        }
        let config = self.to_dispatch_config()?;
        Ok((config, self.profiles()))
    }
}
