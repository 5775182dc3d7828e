//! Simulation driver that threads run state through the dispatch step.

use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};

use super::clock::{HourClock, Tick};
use super::dispatch::dispatch_hour;
use super::types::{DispatchConfig, HourInput, HourlyRecord, Profiles, RunState};

/// Running totals for the per-day debug line.
#[derive(Debug, Default, Clone, Copy)]
struct DayTally {
    unserved: f64,
    generator_hours: usize,
    solar_curtailed: f64,
}

/// Simulation driver for one run.
///
/// Owns the run's mutable state (battery and generator flag), borrows the
/// immutable configuration and profiles, and walks the horizon strictly
/// forward. Construction validates everything up front, so once an
/// `Engine` exists every hour produces a record.
pub struct Engine<'a> {
    config: &'a DispatchConfig,
    profiles: &'a Profiles,
    state: RunState,
    clock: HourClock,
    horizon: usize,
    tally: DayTally,
}

impl<'a> Engine<'a> {
    /// Creates a driver for `horizon` hours.
    ///
    /// # Errors
    ///
    /// * [`DispatchError::EmptyHorizon`] if `horizon == 0`
    /// * [`DispatchError::InvalidConfig`] with every failed constraint
    /// * [`DispatchError::ProfileTooShort`] if either profile has fewer than
    ///   `horizon` values; longer profiles are read only up to the horizon
    pub fn new(
        config: &'a DispatchConfig,
        profiles: &'a Profiles,
        horizon: usize,
    ) -> DispatchResult<Self> {
        if horizon == 0 {
            return Err(DispatchError::EmptyHorizon);
        }

        let errors = config.validate();
        if !errors.is_empty() {
            return Err(DispatchError::InvalidConfig(errors));
        }

        for (profile, series) in [("load", &profiles.load_mw), ("solar", &profiles.solar_mw)] {
            if series.len() < horizon {
                return Err(DispatchError::ProfileTooShort {
                    profile,
                    len: series.len(),
                    horizon,
                });
            }
        }

        for warning in config.warnings() {
            warn!("{warning}");
        }

        Ok(Self {
            config,
            profiles,
            state: RunState::new(config),
            clock: HourClock::new(horizon),
            horizon,
            tally: DayTally::default(),
        })
    }

    /// Simulates the next hour, or returns `None` once the horizon is done.
    pub fn step(&mut self) -> Option<HourlyRecord> {
        let tick = self.clock.tick()?;
        let input = self.input_at(tick);

        self.state.begin_hour(&input);
        let record = dispatch_hour(self.config, &mut self.state, &input);
        self.record_day(&record);

        Some(record)
    }

    /// Lazily yields the remaining hours.
    ///
    /// Dropping the iterator early simply stops the run; records already
    /// yielded stay valid.
    pub fn records(&mut self) -> impl Iterator<Item = HourlyRecord> + '_ {
        std::iter::from_fn(move || self.step())
    }

    /// Simulates every remaining hour and returns the records in order.
    pub fn run(mut self) -> Vec<HourlyRecord> {
        info!(
            template = %self.config.template,
            hours = self.horizon,
            "starting dispatch run"
        );

        let records: Vec<HourlyRecord> = self.records().collect();

        let unserved: f64 = records.iter().map(|r| r.unserved).sum();
        let generator_hours = records.iter().filter(|r| r.generator_on).count();
        info!(
            hours = records.len(),
            unserved_mwh = unserved,
            generator_hours,
            final_soc_pct = self.state.battery.soc_pct(),
            "dispatch run complete"
        );

        records
    }

    /// Carried state after the last simulated hour.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn config(&self) -> &DispatchConfig {
        self.config
    }

    /// Hours left in the horizon.
    pub fn remaining(&self) -> usize {
        self.clock.remaining()
    }

    fn input_at(&self, tick: Tick) -> HourInput {
        HourInput {
            hour: tick.hour,
            day: tick.day,
            hour_of_day: tick.hour_of_day,
            solar_mw: self.profiles.solar_mw[tick.hour],
            load_mw: self.profiles.load_mw[tick.hour],
        }
    }

    fn record_day(&mut self, record: &HourlyRecord) {
        self.tally.unserved += record.unserved;
        self.tally.solar_curtailed += record.solar_curtailed;
        if record.generator_on {
            self.tally.generator_hours += 1;
        }

        if record.hour_of_day == 23 || self.clock.remaining() == 0 {
            debug!(
                day = record.day,
                unserved_mwh = self.tally.unserved,
                generator_hours = self.tally.generator_hours,
                solar_curtailed_mwh = self.tally.solar_curtailed,
                soc_pct = record.soc_pct,
                "day complete"
            );
            self.tally = DayTally::default();
        }
    }
}

/// Validates inputs and simulates the whole horizon in one call.
///
/// ```
/// use hybrid_dispatch::config::ScenarioConfig;
/// use hybrid_dispatch::sim::engine::simulate;
///
/// let scenario = ScenarioConfig::from_preset("reference").unwrap();
/// let (config, profiles) = scenario.build().unwrap();
/// let records = simulate(&config, &profiles, scenario.simulation.hours).unwrap();
/// assert_eq!(records.len(), 48);
/// assert!(records.iter().all(|r| r.delivered()));
/// ```
pub fn simulate(
    config: &DispatchConfig,
    profiles: &Profiles,
    horizon: usize,
) -> DispatchResult<Vec<HourlyRecord>> {
    Ok(Engine::new(config, profiles, horizon)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixtures::reference_config;
    use crate::sim::template::Template;

    fn flat(load: f64, solar: f64, hours: usize) -> Profiles {
        Profiles::new(vec![load; hours], vec![solar; hours])
    }

    #[test]
    fn rejects_empty_horizon() {
        let cfg = reference_config(Template::GreenPriority);
        let profiles = flat(25.0, 0.0, 24);
        assert!(matches!(
            Engine::new(&cfg, &profiles, 0),
            Err(DispatchError::EmptyHorizon)
        ));
    }

    #[test]
    fn rejects_short_profile() {
        let cfg = reference_config(Template::GreenPriority);
        let profiles = Profiles::new(vec![25.0; 48], vec![0.0; 24]);
        match Engine::new(&cfg, &profiles, 48) {
            Err(DispatchError::ProfileTooShort {
                profile,
                len,
                horizon,
            }) => {
                assert_eq!(profile, "solar");
                assert_eq!(len, 24);
                assert_eq!(horizon, 48);
            }
            other => panic!("expected ProfileTooShort, got {:?}", other.err()),
        }
    }

    #[test]
    fn rejects_invalid_config_before_running() {
        let mut cfg = reference_config(Template::GreenPriority);
        cfg.battery.capacity_mwh = 0.0;
        cfg.rules.soc_on_pct = 90.0;
        let profiles = flat(25.0, 0.0, 24);
        match Engine::new(&cfg, &profiles, 24) {
            Err(DispatchError::InvalidConfig(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected InvalidConfig, got {:?}", other.err()),
        }
    }

    #[test]
    fn rejects_nan_soc_threshold() {
        let mut cfg = reference_config(Template::EmergencyOnly);
        cfg.rules.soc_on_pct = f64::NAN;
        let profiles = flat(25.0, 0.0, 24);
        match Engine::new(&cfg, &profiles, 24) {
            Err(DispatchError::InvalidConfig(errors)) => {
                assert!(errors.iter().any(|e| e.field == "rules.soc_on_pct"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other.err()),
        }
    }

    #[test]
    fn longer_profiles_are_truncated_to_horizon() {
        let cfg = reference_config(Template::GreenPriority);
        let profiles = flat(25.0, 0.0, 100);
        let records = simulate(&cfg, &profiles, 30).unwrap();
        assert_eq!(records.len(), 30);
        assert_eq!(records.last().map(|r| r.hour), Some(29));
    }

    #[test]
    fn records_are_in_hour_order_with_calendar() {
        let cfg = reference_config(Template::GreenPriority);
        let profiles = flat(25.0, 0.0, 50);
        let records = simulate(&cfg, &profiles, 50).unwrap();
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.hour, i);
            assert_eq!(r.day, i / 24);
            assert_eq!(r.hour_of_day as usize, i % 24);
        }
    }

    #[test]
    fn early_stop_keeps_partial_records() {
        let cfg = reference_config(Template::GreenPriority);
        let profiles = flat(25.0, 0.0, 48);
        let mut engine = Engine::new(&cfg, &profiles, 48).unwrap();
        let first: Vec<_> = engine.records().take(5).collect();
        assert_eq!(first.len(), 5);
        assert_eq!(engine.remaining(), 43);
        assert_eq!(engine.step().map(|r| r.hour), Some(5));
    }

    #[test]
    fn cycle_counter_resets_each_day() {
        let mut cfg = reference_config(Template::SolarBatteryOnly);
        cfg.battery.enforce_cycle_limit = true;
        cfg.battery.daily_cycle_limit = 0.1;
        let profiles = flat(2.0, 0.0, 48);
        let records = simulate(&cfg, &profiles, 48).unwrap();

        let cap = 40.0 * 0.1;
        let eta = cfg.battery.efficiency;
        for day in 0..2 {
            let drawn: f64 = records
                .iter()
                .filter(|r| r.day == day)
                .map(|r| r.battery_to_load / eta)
                .sum();
            assert!(drawn <= cap + 1e-9, "day {day} drew {drawn}");
            assert!(drawn > cap - 1e-9, "day {day} should hit the cap");
        }
    }

    #[test]
    fn same_inputs_give_identical_runs() {
        let cfg = reference_config(Template::EmergencyOnly);
        let profiles = flat(12.0, 5.0, 72);
        let a = simulate(&cfg, &profiles, 72).unwrap();
        let b = simulate(&cfg, &profiles, 72).unwrap();
        assert_eq!(a, b);
    }
}
