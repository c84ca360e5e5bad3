//! End-to-end engine behavior with deterministic stub providers.

use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::{NaiveDateTime, Timelike};
use rstest::rstest;

use solstice::config::SimulationConfig;
use solstice::cooling::CoolingType;
use solstice::engine::SimulationEngine;
use solstice::error::{ConfigError, SummaryError};
use solstice::providers::{CarbonIntensityProvider, WeatherProvider};
use solstice::summary::summarize;
use solstice::workload::WorkloadTrace;

/// Fixed ambient conditions.
struct ConstWeather {
    dry_bulb_c: f64,
    wet_bulb_c: f64,
    humidity_pct: f64,
}

impl WeatherProvider for ConstWeather {
    fn dry_bulb(&self, _: NaiveDateTime) -> f64 {
        self.dry_bulb_c
    }
    fn wet_bulb(&self, _: NaiveDateTime) -> f64 {
        self.wet_bulb_c
    }
    fn humidity(&self, _: NaiveDateTime) -> f64 {
        self.humidity_pct
    }
}

/// Diurnal ambient: cool at night, hot mid-afternoon.
struct DiurnalWeather;

impl WeatherProvider for DiurnalWeather {
    fn dry_bulb(&self, timestamp: NaiveDateTime) -> f64 {
        let h = timestamp.hour() as f64;
        25.0 + 10.0 * ((h - 15.0) * std::f64::consts::PI / 12.0).cos()
    }
    fn wet_bulb(&self, timestamp: NaiveDateTime) -> f64 {
        self.dry_bulb(timestamp) - 8.0
    }
    fn humidity(&self, _: NaiveDateTime) -> f64 {
        45.0
    }
}

struct ConstCarbon(f64);

impl CarbonIntensityProvider for ConstCarbon {
    fn intensity(&self, _: NaiveDateTime) -> f64 {
        self.0
    }
}

fn texas_summer() -> Arc<ConstWeather> {
    Arc::new(ConstWeather {
        dry_bulb_c: 32.0,
        wet_bulb_c: 24.0,
        humidity_pct: 50.0,
    })
}

fn engine_with(config: SimulationConfig) -> SimulationEngine {
    SimulationEngine::new(config, texas_summer(), Arc::new(ConstCarbon(400.0))).unwrap()
}

fn scenario(cooling_type: CoolingType, capacity_mw: f64, days: f64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.cooling_type = cooling_type;
    config.capacity_mw = capacity_mw;
    config.duration_days = days;
    config.start_date = chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    config
}

#[rstest]
#[case(1.0, 24)]
#[case(7.0, 168)]
#[case(0.5, 12)]
#[case(1.02, 25)]
fn record_count_matches_duration(#[case] days: f64, #[case] expected: usize) {
    let mut engine = engine_with(scenario(CoolingType::Air, 1.0, days));
    let result = engine.run(None).unwrap();
    assert_eq!(result.len(), expected);
}

#[test]
fn air_cooling_never_uses_water() {
    let mut engine = engine_with(scenario(CoolingType::Air, 1.0, 3.0));
    let result = engine.run(None).unwrap();
    for record in result.records() {
        assert_eq!(record.water_usage_liters, 0.0);
    }
}

#[test]
fn water_cooling_draws_water_every_loaded_hour() {
    let mut engine = engine_with(scenario(CoolingType::Water, 1.0, 1.0));
    let result = engine.run(None).unwrap();
    for record in result.records() {
        assert!(record.water_usage_liters > 0.0);
    }
}

#[test]
fn total_power_is_it_plus_cooling_times_overhead() {
    let mut config = scenario(CoolingType::Water, 2.0, 2.0);
    config.pue_overhead = 1.15;
    let mut engine = engine_with(config);
    let result = engine.run(None).unwrap();
    for record in result.records() {
        assert_relative_eq!(
            record.total_power_w,
            (record.it_power_w + record.cooling_power_w) * 1.15,
            max_relative = 1e-9
        );
    }
}

#[test]
fn doubling_capacity_doubles_every_series() {
    let workload = WorkloadTrace::synthetic_diurnal(24);
    let mut small = engine_with(scenario(CoolingType::Water, 1.0, 1.0));
    let mut large = engine_with(scenario(CoolingType::Water, 2.0, 1.0));

    let small_result = small.run(Some(&workload)).unwrap().clone();
    let large_result = large.run(Some(&workload)).unwrap().clone();

    for (s, l) in small_result.records().iter().zip(large_result.records()) {
        assert_relative_eq!(l.it_power_w, s.it_power_w * 2.0, max_relative = 1e-9);
        assert_relative_eq!(l.cooling_power_w, s.cooling_power_w * 2.0, max_relative = 1e-9);
        assert_relative_eq!(l.total_power_w, s.total_power_w * 2.0, max_relative = 1e-9);
        assert_relative_eq!(
            l.water_usage_liters,
            s.water_usage_liters * 2.0,
            max_relative = 1e-9
        );
    }
}

#[test]
fn unknown_cooling_type_behaves_like_air() {
    let aliased = scenario(CoolingType::parse_lossy("foo"), 1.0, 1.0);
    let air = scenario(CoolingType::Air, 1.0, 1.0);

    let mut engine_a = engine_with(air);
    let mut engine_b = engine_with(aliased);

    let result_a = engine_a.run(None).unwrap().clone();
    let result_b = engine_b.run(None).unwrap().clone();
    assert_eq!(result_a, result_b);
}

#[test]
fn constant_workload_scenario() {
    // 1 MW, air cooling, one summer day, 75% utilization around the clock.
    let mut config = scenario(CoolingType::Air, 1.0, 1.0);
    config.pue_overhead = 1.1;
    let workload = WorkloadTrace::from_values(vec![0.75; 24], 24).unwrap();

    let mut engine = engine_with(config);
    let result = engine.run(Some(&workload)).unwrap();

    assert_eq!(result.len(), 24);
    let first = &result.records()[0];
    for record in result.records() {
        // Constant weather and workload: the IT series is flat.
        assert_relative_eq!(record.it_power_w, first.it_power_w, max_relative = 1e-9);
        assert_relative_eq!(
            record.total_power_w,
            (record.it_power_w + record.cooling_power_w) * 1.1,
            max_relative = 1e-9
        );
        assert_eq!(record.workload, 0.75);
    }
}

#[test]
fn reruns_are_bit_identical() {
    let workload = WorkloadTrace::synthetic_diurnal(48);
    let mut engine = SimulationEngine::new(
        scenario(CoolingType::Water, 1.5, 2.0),
        Arc::new(DiurnalWeather),
        Arc::new(ConstCarbon(380.0)),
    )
    .unwrap();

    let first = engine.run(Some(&workload)).unwrap().clone();
    let second = engine.run(Some(&workload)).unwrap().clone();
    assert_eq!(first, second);
}

#[test]
fn rerun_replaces_previous_result() {
    let mut engine = engine_with(scenario(CoolingType::Air, 1.0, 1.0));

    let light = WorkloadTrace::from_values(vec![0.2; 24], 24).unwrap();
    let heavy = WorkloadTrace::from_values(vec![0.9; 24], 24).unwrap();

    let light_it = engine.run(Some(&light)).unwrap().records()[0].it_power_w;
    engine.run(Some(&heavy)).unwrap();

    let stored = engine.result().unwrap();
    assert_eq!(stored.records()[0].workload, 0.9);
    assert!(stored.records()[0].it_power_w > light_it);
}

#[test]
fn workload_length_mismatch_is_rejected() {
    let mut engine = engine_with(scenario(CoolingType::Air, 1.0, 1.0));
    let workload = WorkloadTrace::synthetic_diurnal(23);
    assert!(matches!(
        engine.run(Some(&workload)),
        Err(ConfigError::WorkloadLength {
            expected: 24,
            found: 23
        })
    ));
}

#[test]
fn invalid_configs_fail_at_construction() {
    let mut bad_lists = scenario(CoolingType::Air, 1.0, 1.0);
    bad_lists.supply_approach_temps_c.pop();
    assert!(matches!(
        SimulationEngine::new(bad_lists, texas_summer(), Arc::new(ConstCarbon(400.0))),
        Err(ConfigError::ApproachListMismatch { .. })
    ));

    let bad_capacity = scenario(CoolingType::Air, 0.0, 1.0);
    assert!(matches!(
        SimulationEngine::new(bad_capacity, texas_summer(), Arc::new(ConstCarbon(400.0))),
        Err(ConfigError::NonPositiveCapacity(_))
    ));
}

#[test]
fn summary_before_any_run_is_no_data() {
    let engine = engine_with(scenario(CoolingType::Air, 1.0, 1.0));
    assert!(matches!(engine.summary(), Err(SummaryError::NoData)));
}

#[test]
fn summary_water_figures_follow_cooling_type() {
    let mut air_engine = engine_with(scenario(CoolingType::Air, 1.0, 1.0));
    air_engine.run(None).unwrap();
    let air_summary = air_engine.summary().unwrap();
    assert!(air_summary.total_water_usage_liters.is_none());

    let mut water_engine = engine_with(scenario(CoolingType::Water, 1.0, 1.0));
    let result = water_engine.run(None).unwrap().clone();
    let expected: f64 = result.records().iter().map(|r| r.water_usage_liters).sum();
    let water_summary = summarize(&result).unwrap();
    assert_relative_eq!(water_summary.total_water_usage_liters.unwrap(), expected);
}

#[test]
fn carbon_emissions_follow_intensity_and_power() {
    let mut engine = SimulationEngine::new(
        scenario(CoolingType::Air, 1.0, 1.0),
        texas_summer(),
        Arc::new(ConstCarbon(250.0)),
    )
    .unwrap();
    let result = engine.run(None).unwrap();
    for record in result.records() {
        // g/kWh against an hourly W sample: kilograms after the 1e6 divisor.
        assert_relative_eq!(
            record.carbon_emissions_kg,
            record.total_power_w * 250.0 / 1e6,
            max_relative = 1e-12
        );
    }
}

#[test]
fn hotter_ambient_costs_more_cooling() {
    let workload = WorkloadTrace::from_values(vec![0.8; 24], 24).unwrap();
    let cool = Arc::new(ConstWeather {
        dry_bulb_c: 10.0,
        wet_bulb_c: 6.0,
        humidity_pct: 60.0,
    });
    let hot = Arc::new(ConstWeather {
        dry_bulb_c: 40.0,
        wet_bulb_c: 28.0,
        humidity_pct: 30.0,
    });

    let mut cool_engine = SimulationEngine::new(
        scenario(CoolingType::Air, 1.0, 1.0),
        cool,
        Arc::new(ConstCarbon(400.0)),
    )
    .unwrap();
    let mut hot_engine = SimulationEngine::new(
        scenario(CoolingType::Air, 1.0, 1.0),
        hot,
        Arc::new(ConstCarbon(400.0)),
    )
    .unwrap();

    let cool_total: f64 = cool_engine
        .run(Some(&workload))
        .unwrap()
        .records()
        .iter()
        .map(|r| r.cooling_power_w)
        .sum();
    let hot_total: f64 = hot_engine
        .run(Some(&workload))
        .unwrap()
        .records()
        .iter()
        .map(|r| r.cooling_power_w)
        .sum();

    assert!(hot_total > cool_total);
}

#[test]
fn non_air_cooling_includes_heat_rejection_plant() {
    // At equal efficiency the water branch adds tower fans and pumps on
    // top of the CRAC fans and chiller the air branch charges for.
    let workload = WorkloadTrace::from_values(vec![0.8; 24], 24).unwrap();
    let mut air = engine_with(scenario(CoolingType::Air, 1.0, 1.0));
    let mut water = engine_with(scenario(CoolingType::Water, 1.0, 1.0));

    let air_result = air.run(Some(&workload)).unwrap().clone();
    let water_result = water.run(Some(&workload)).unwrap().clone();

    for (a, w) in air_result.records().iter().zip(water_result.records()) {
        assert!(w.cooling_power_w > a.cooling_power_w);
        assert_relative_eq!(w.it_power_w, a.it_power_w, max_relative = 1e-12);
    }
}

#[test]
fn scaling_factor_matches_capacity_ratio() {
    let engine_1mw = engine_with(scenario(CoolingType::Air, 1.0, 1.0));
    let engine_2mw = engine_with(scenario(CoolingType::Air, 2.0, 1.0));
    assert_relative_eq!(
        engine_2mw.scaling_factor(),
        engine_1mw.scaling_factor() * 2.0,
        max_relative = 1e-12
    );
}
