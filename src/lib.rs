//! # Solstice
//!
//! Hourly simulation of a datacenter's energy, carbon and water footprint
//! for a configurable size, location and cooling technology.
//!
//! The [`engine::SimulationEngine`] drives a deterministic hourly loop:
//! a workload fraction becomes IT power through the rack thermal model,
//! cooling power branches on the configured technology, a capacity scaling
//! factor and PUE overhead are applied, and carbon emissions and water
//! usage accumulate into one [`result::TimestepRecord`] per hour.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use solstice::config::SimulationConfig;
//! use solstice::engine::SimulationEngine;
//! use solstice::providers::{location_info, WeatherTable, CarbonIntensityTable};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SimulationConfig::default();
//! let info = location_info(&config.location)?;
//! let (weather, carbon) = info.load_providers("data".as_ref())?;
//!
//! let mut engine = SimulationEngine::new(config, Arc::new(weather), Arc::new(carbon))?;
//! let result = engine.run(None)?;
//! result.to_csv_file("simulation_results.csv")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cooling;
pub mod engine;
pub mod error;
pub mod providers;
pub mod result;
pub mod summary;
pub mod telemetry;
pub mod thermal;
pub mod workload;

pub use config::{AppConfig, RackTopology, SimulationConfig};
pub use cooling::{profile_for, CoolingPolicy, CoolingProfile, CoolingType};
pub use engine::SimulationEngine;
pub use error::{ConfigError, DataError, ExportError, SummaryError};
pub use result::{SimulationResult, TimestepRecord};
pub use summary::{query, summarize, Metric, Statistic, Summary};
pub use thermal::{HvacPower, ItThermalModel, RackLoadResult, RackThermalModel};
pub use workload::WorkloadTrace;
