//! Integration tests for the 48-hour reference scenario.

mod common;

use approx::assert_relative_eq;
use hybrid_dispatch::sim::Template;
use hybrid_dispatch::sim::balance::{generator_residual, load_residual, solar_residual};
use hybrid_dispatch::sim::engine::{Engine, simulate};
use hybrid_dispatch::sim::kpi::SummaryReport;
use hybrid_dispatch::sim::types::BatteryMode;

use common::{BALANCE_TOLERANCE, REFERENCE_HOURS};

#[test]
fn green_priority_serves_every_hour() {
    let config = common::reference_config(Template::GreenPriority);
    let profiles = common::reference_profiles(REFERENCE_HOURS);
    let records = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();

    assert_eq!(records.len(), REFERENCE_HOURS);
    assert_eq!(common::total_unserved(&records), 0.0);
    assert!(records.iter().all(|r| r.delivered()));

    let summary = SummaryReport::from_records(&records, config.battery.capacity_mwh);
    assert_eq!(summary.delivery_pct, 100.0);
    assert!(summary.generator_hours > 0);
}

#[test]
fn solar_only_leaves_nights_unserved() {
    let config = common::reference_config(Template::SolarBatteryOnly);
    let profiles = common::reference_profiles(REFERENCE_HOURS);
    let records = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();

    assert!(records.iter().all(|r| !r.generator_on));
    assert!(records.iter().all(|r| r.generator_output() == 0.0));

    let unserved = common::total_unserved(&records);
    assert!(unserved > 0.0);

    let served: f64 = records
        .iter()
        .map(|r| r.solar_to_load + r.battery_to_load)
        .sum();
    let load: f64 = records.iter().map(|r| r.load_mw).sum();
    assert_relative_eq!(unserved, load - served, epsilon = 0.05);
}

#[test]
fn every_record_balances() {
    for template in Template::ALL {
        let config = common::reference_config(template);
        let profiles = common::reference_profiles(REFERENCE_HOURS);
        let records = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();

        for r in &records {
            assert!(
                load_residual(r).abs() <= BALANCE_TOLERANCE,
                "{template}: load residual {} at hour {}",
                load_residual(r),
                r.hour
            );
            assert!(solar_residual(r).abs() <= 1e-9, "{template}: hour {}", r.hour);
            assert!(
                generator_residual(r, config.generator.capacity_mw).abs() <= 1e-9,
                "{template}: hour {}",
                r.hour
            );
        }
    }
}

#[test]
fn soc_stays_inside_window() {
    for template in Template::ALL {
        let config = common::reference_config(template);
        let profiles = common::reference_profiles(REFERENCE_HOURS);
        let records = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();
        let min = config.battery.capacity_mwh * config.battery.min_soc_pct / 100.0;
        let max = config.battery.capacity_mwh * config.battery.max_soc_pct / 100.0;

        for r in &records {
            assert!(
                r.stored_mwh >= min - 1e-9 && r.stored_mwh <= max + 1e-9,
                "{template}: stored {} outside [{min}, {max}] at hour {}",
                r.stored_mwh,
                r.hour
            );
        }
    }
}

#[test]
fn battery_mode_matches_power_sign() {
    let config = common::reference_config(Template::GreenPriority);
    let profiles = common::reference_profiles(REFERENCE_HOURS);
    let records = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();

    for r in &records {
        match r.battery_mode {
            BatteryMode::Charging => assert!(r.battery_mw < 0.0),
            BatteryMode::Discharging => assert!(r.battery_mw > 0.0),
            BatteryMode::Idle => assert!(r.battery_mw.abs() < 1e-6),
        }
    }
    assert!(records.iter().any(|r| r.battery_mode == BatteryMode::Charging));
    assert!(records.iter().any(|r| r.battery_mode == BatteryMode::Discharging));
}

#[test]
fn midday_surplus_is_stored_then_curtailed() {
    let config = common::reference_config(Template::SolarBatteryOnly);
    let profiles = common::reference_profiles(24);
    let records = simulate(&config, &profiles, 24).unwrap();

    let noon = &records[12];
    assert_eq!(noon.solar_to_load, 25.0);
    assert!(noon.solar_to_battery + noon.solar_curtailed > 0.0);
    let curtailed: f64 = records.iter().map(|r| r.solar_curtailed).sum();
    assert!(curtailed > 0.0);
}

#[test]
fn step_by_step_matches_full_run() {
    let config = common::reference_config(Template::EmergencyOnly);
    let profiles = common::reference_profiles(REFERENCE_HOURS);

    let full = simulate(&config, &profiles, REFERENCE_HOURS).unwrap();
    let mut engine = Engine::new(&config, &profiles, REFERENCE_HOURS).unwrap();
    let mut stepped = Vec::new();
    while let Some(r) = engine.step() {
        stepped.push(r);
    }
    assert_eq!(full, stepped);
    assert_relative_eq!(
        engine.state().battery.soc_pct(),
        full.last().map(|r| r.soc_pct).unwrap_or_default(),
        epsilon = 1e-12
    );
}
