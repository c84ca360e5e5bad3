use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use solstice::config::{AppConfig, SimulationConfig};
use solstice::engine::SimulationEngine;
use solstice::providers::location_info;
use solstice::telemetry::init_tracing;

fn main() -> Result<()> {
    init_tracing();

    let app = AppConfig::load().context("failed to load runtime configuration")?;

    let scenario = match &app.scenario_file {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => {
            info!("no scenario file configured, using built-in defaults");
            SimulationConfig::default()
        }
    };

    let location = location_info(&scenario.location)?;
    info!(
        location = location.name,
        grid_region = location.grid_region,
        cooling = %scenario.cooling_type,
        capacity_mw = scenario.capacity_mw,
        "loading environmental data"
    );
    let (weather, carbon) = location.load_providers(&app.data_dir)?;

    let mut engine = SimulationEngine::new(scenario, Arc::new(weather), Arc::new(carbon))?;
    info!(scaling_factor = engine.scaling_factor(), "datacenter scaled");

    let result = engine.run(None)?.clone();

    if let Some(path) = &app.csv_output {
        result.to_csv_file(path)?;
        info!(path = %path.display(), "wrote CSV results");
    }
    if let Some(path) = &app.json_output {
        result.to_json_file(path)?;
        info!(path = %path.display(), "wrote JSON results");
    }
    if app.csv_output.is_none() && app.json_output.is_none() {
        warn!("no output path configured; results were not persisted");
    }

    let summary = engine.summary()?;
    info!(
        total_energy_kwh = format!("{:.1}", summary.total_energy_kwh),
        average_power_kw = format!("{:.1}", summary.average_power_kw),
        peak_power_kw = format!("{:.1}", summary.peak_power_kw),
        carbon_tons = format!("{:.3}", summary.total_carbon_emissions_tons),
        "simulation summary"
    );
    if let Some(water) = summary.total_water_usage_liters {
        info!(total_water_liters = format!("{:.0}", water), "water usage");
    }

    Ok(())
}
