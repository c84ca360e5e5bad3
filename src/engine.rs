//! The hourly simulation engine.
//!
//! For every simulated hour the engine resolves ambient conditions and grid
//! carbon intensity, derives a CRAC setpoint from the outside temperature,
//! pushes the workload through the IT/thermal model, splits out cooling
//! power by technology, applies the capacity scaling factor and the PUE
//! overhead, and appends one [`TimestepRecord`]. The loop is a pure
//! sequential fold: no I/O beyond the pre-indexed provider lookups, no
//! randomness, and append-only accumulation, so identical inputs always
//! reproduce bit-identical results.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::cooling::CoolingType;
use crate::error::{ConfigError, SummaryError};
use crate::providers::{CarbonIntensityProvider, WeatherProvider};
use crate::result::{SimulationResult, TimestepRecord};
use crate::summary::{summarize, Summary};
use crate::thermal::{ItThermalModel, RackThermalModel};
use crate::workload::WorkloadTrace;

/// CRAC setpoint policy bounds, degrees Celsius.
const CRAC_SETPOINT_MIN_C: f64 = 16.0;
const CRAC_SETPOINT_MAX_C: f64 = 22.0;

/// Supply setpoint tracks the outside temperature with a simple proportional
/// policy: warmer outside means a warmer (less aggressive) supply setpoint,
/// clamped to the operable band. Deliberately open-loop with respect to rack
/// outlet temperatures.
fn crac_setpoint(ambient_c: f64) -> f64 {
    (18.0 + 0.2 * (ambient_c - 20.0)).clamp(CRAC_SETPOINT_MIN_C, CRAC_SETPOINT_MAX_C)
}

/// Hourly datacenter footprint simulator.
///
/// Providers are shared read-only; independent engines can run concurrently
/// over the same tables (a capacity sweep is embarrassingly parallel).
pub struct SimulationEngine {
    config: SimulationConfig,
    weather: Arc<dyn WeatherProvider>,
    carbon: Arc<dyn CarbonIntensityProvider>,
    model: Box<dyn ItThermalModel>,
    scaling_factor: f64,
    result: Option<SimulationResult>,
}

impl SimulationEngine {
    /// Build an engine with the built-in rack thermal model.
    pub fn new(
        config: SimulationConfig,
        weather: Arc<dyn WeatherProvider>,
        carbon: Arc<dyn CarbonIntensityProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = Box::new(RackThermalModel::new(&config));
        Self::with_model(config, weather, carbon, model)
    }

    /// Build an engine around a caller-supplied thermal model.
    pub fn with_model(
        config: SimulationConfig,
        weather: Arc<dyn WeatherProvider>,
        carbon: Arc<dyn CarbonIntensityProvider>,
        model: Box<dyn ItThermalModel>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let design_capacity_w = model.design_capacity_w();
        if !(design_capacity_w > 0.0) {
            return Err(ConfigError::InvalidDesignCapacity(design_capacity_w));
        }
        let scaling_factor = config.capacity_w() / design_capacity_w;
        debug!(scaling_factor, design_capacity_w, "engine initialized");

        Ok(Self {
            config,
            weather,
            carbon,
            model,
            scaling_factor,
            result: None,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Ratio of requested nameplate capacity to the unscaled design
    /// capacity; applied to every power and water quantity the model emits.
    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    /// The most recent completed run, if any.
    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    /// Summarize the most recent run.
    pub fn summary(&self) -> Result<Summary, SummaryError> {
        match &self.result {
            Some(result) => summarize(result),
            None => Err(SummaryError::NoData),
        }
    }

    /// Run the simulation, replacing any previous result.
    ///
    /// `workload`, when given, must contain exactly one utilization fraction
    /// per simulated hour; otherwise the synthetic diurnal pattern is used.
    pub fn run(&mut self, workload: Option<&WorkloadTrace>) -> Result<&SimulationResult, ConfigError> {
        let hours = self.config.num_timesteps();
        let trace = match workload {
            Some(trace) => {
                if trace.len() != hours {
                    return Err(ConfigError::WorkloadLength {
                        expected: hours,
                        found: trace.len(),
                    });
                }
                trace.clone()
            }
            None => WorkloadTrace::synthetic_diurnal(hours),
        };

        info!(
            location = %self.config.location,
            cooling = %self.config.cooling_type,
            capacity_mw = self.config.capacity_mw,
            hours,
            "starting simulation"
        );

        let start = self.config.start();
        let scaled_full_load_w = self.model.design_capacity_w() * self.scaling_factor;
        let num_racks = self.config.topology.num_racks;
        let mut records = Vec::with_capacity(hours);

        for hour in 0..hours {
            let timestamp = start + chrono::Duration::hours(hour as i64);

            let ambient_c = self.weather.dry_bulb(timestamp);
            let carbon_intensity = self.carbon.intensity(timestamp);
            let setpoint_c = crac_setpoint(ambient_c);

            // Uniform load split across racks, in percent.
            let workload_fraction = trace.get(hour);
            let rack_loads = vec![workload_fraction * 100.0; num_racks];

            let load = self.model.compute_load(&rack_loads, setpoint_c);
            let it_power_w = load.total_it_power_w() * self.scaling_factor;

            let return_temp_c = self.model.avg_return_temp(&load.outlet_temp_c);
            let hvac =
                self.model
                    .hvac_power(setpoint_c, return_temp_c, ambient_c, scaled_full_load_w);

            let efficiency = self.config.cooling_efficiency_factor;
            let (cooling_power_w, water_usage_liters) = match self.config.cooling_type {
                CoolingType::Air => {
                    // hvac is already sized for the scaled full load.
                    let cooling = (hvac.crac_fan_w + hvac.chiller_w) * efficiency;
                    (cooling, 0.0)
                }
                _ => {
                    let cooling = (hvac.crac_fan_w
                        + hvac.ct_fan_w
                        + hvac.chiller_w
                        + hvac.cw_pump_w
                        + hvac.ct_pump_w)
                        * efficiency;
                    // The tower sees the CRAC return as its hot side and the
                    // supply setpoint as its cold side.
                    let wet_bulb_c = self.weather.wet_bulb(timestamp);
                    let water = self
                        .model
                        .cooling_tower_water_usage(return_temp_c, setpoint_c, wet_bulb_c)
                        * self.scaling_factor;
                    (cooling, water)
                }
            };

            let total_power_w = (it_power_w + cooling_power_w) * self.config.pue_overhead;
            // One hourly sample in W equals Wh; g/kWh over Wh divided by 1e6
            // yields kilograms of CO2.
            let carbon_emissions_kg = total_power_w * carbon_intensity / 1e6;

            records.push(TimestepRecord {
                timestamp,
                ambient_temp_c: ambient_c,
                carbon_intensity_g_per_kwh: carbon_intensity,
                workload: workload_fraction,
                it_power_w,
                cooling_power_w,
                total_power_w,
                carbon_emissions_kg,
                water_usage_liters,
            });
        }

        let result = SimulationResult {
            location: self.config.location.clone(),
            cooling_type: self.config.cooling_type,
            capacity_mw: self.config.capacity_mw,
            records,
        };

        info!(hours = result.len(), "simulation complete");
        Ok(self.result.insert(result))
    }
}
