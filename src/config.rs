//! Simulation and runtime configuration.
//!
//! `SimulationConfig` is an immutable value object describing the datacenter
//! and the simulated period. It is passed by reference into every component
//! that needs it; there is no global configuration state. `AppConfig` is the
//! binary's runtime configuration, layered from `config/default.toml` and
//! `SOLSTICE__`-prefixed environment variables.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cooling::{self, CoolingType};
use crate::error::ConfigError;

/// Physical rack and CPU layout of the unscaled reference datacenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RackTopology {
    pub num_racks: usize,
    pub num_rows: usize,
    pub racks_per_row: usize,
    /// Hard per-rack power cap in watts.
    pub max_w_per_rack: f64,
    pub cpus_per_rack: usize,
    /// Per-CPU power draw at 0% load.
    pub cpu_idle_power_w: f64,
    /// Per-CPU power draw at 100% load.
    pub cpu_full_load_power_w: f64,
}

impl Default for RackTopology {
    fn default() -> Self {
        // HP ProLiant class servers: 110 W idle, 170 W at full load per CPU.
        Self {
            num_racks: 20,
            num_rows: 4,
            racks_per_row: 5,
            max_w_per_rack: 10_000.0,
            cpus_per_rack: 48,
            cpu_idle_power_w: 110.0,
            cpu_full_load_power_w: 170.0,
        }
    }
}

/// Immutable description of one simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub topology: RackTopology,
    /// Supply-air approach temperature per rack (rack inlet minus CRAC
    /// setpoint), one entry per rack.
    pub supply_approach_temps_c: Vec<f64>,
    /// Return-air approach temperature per rack (CRAC return minus rack
    /// outlet), one entry per rack.
    pub return_approach_temps_c: Vec<f64>,
    /// Location code, e.g. "TX" or "NY".
    pub location: String,
    #[serde(deserialize_with = "cooling::de_cooling_type_lossy")]
    pub cooling_type: CoolingType,
    /// Nameplate capacity in megawatts.
    pub capacity_mw: f64,
    /// First simulated day; the clock starts at midnight local time.
    pub start_date: NaiveDate,
    pub duration_days: f64,
    /// Multiplier on cooling power, below 1.0 for better-than-baseline plants.
    pub cooling_efficiency_factor: f64,
    /// Multiplier on (IT + cooling) power covering lighting, distribution
    /// losses and other miscellaneous facility draw.
    pub pue_overhead: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let topology = RackTopology::default();
        let n = topology.num_racks;
        Self {
            topology,
            supply_approach_temps_c: vec![5.0; n],
            return_approach_temps_c: vec![-2.0; n],
            location: "TX".to_string(),
            cooling_type: CoolingType::Air,
            capacity_mw: 1.0,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            duration_days: 7.0,
            cooling_efficiency_factor: 1.0,
            pue_overhead: 1.1,
        }
    }
}

impl SimulationConfig {
    /// Load a simulation config from a JSON, YAML or TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?,
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                    path: display.clone(),
                    message: e.to_string(),
                })?
            }
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let racks = self.topology.num_racks;
        if self.supply_approach_temps_c.len() != racks {
            return Err(ConfigError::ApproachListMismatch {
                which: "supply",
                expected: racks,
                found: self.supply_approach_temps_c.len(),
            });
        }
        if self.return_approach_temps_c.len() != racks {
            return Err(ConfigError::ApproachListMismatch {
                which: "return",
                expected: racks,
                found: self.return_approach_temps_c.len(),
            });
        }
        if self.topology.num_rows * self.topology.racks_per_row != racks {
            return Err(ConfigError::RackGridMismatch {
                rows: self.topology.num_rows,
                per_row: self.topology.racks_per_row,
                racks,
            });
        }
        if !(self.capacity_mw > 0.0) {
            return Err(ConfigError::NonPositiveCapacity(self.capacity_mw));
        }
        if !(self.duration_days > 0.0) {
            return Err(ConfigError::NonPositiveDuration(self.duration_days));
        }
        if self.pue_overhead < 1.0 {
            return Err(ConfigError::InvalidPueOverhead(self.pue_overhead));
        }
        if !(self.cooling_efficiency_factor > 0.0) {
            return Err(ConfigError::InvalidEfficiencyFactor(
                self.cooling_efficiency_factor,
            ));
        }
        Ok(())
    }

    /// Requested nameplate capacity in watts.
    pub fn capacity_w(&self) -> f64 {
        self.capacity_mw * 1e6
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_days * 24.0
    }

    /// Number of hourly timesteps: `ceil(duration_hours)`.
    pub fn num_timesteps(&self) -> usize {
        self.duration_hours().ceil() as usize
    }

    /// Simulation clock origin (midnight on the start date).
    pub fn start(&self) -> NaiveDateTime {
        self.start_date.and_time(NaiveTime::MIN)
    }
}

/// Runtime configuration for the CLI binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding `weather/` (EPW) and `carbon/` (CSV) data files.
    pub data_dir: PathBuf,
    /// Simulation scenario file; built-in defaults when absent.
    #[serde(default)]
    pub scenario_file: Option<PathBuf>,
    #[serde(default)]
    pub csv_output: Option<PathBuf>,
    #[serde(default)]
    pub json_output: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("SOLSTICE__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn mismatched_supply_list_is_rejected() {
        let mut config = SimulationConfig::default();
        config.supply_approach_temps_c.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ApproachListMismatch { which: "supply", .. })
        ));
    }

    #[test]
    fn mismatched_return_list_is_rejected() {
        let mut config = SimulationConfig::default();
        config.return_approach_temps_c.push(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ApproachListMismatch { which: "return", .. })
        ));
    }

    #[test]
    fn non_positive_capacity_is_rejected() {
        let mut config = SimulationConfig::default();
        config.capacity_mw = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCapacity(_))
        ));

        config.capacity_mw = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCapacity(_))
        ));
    }

    #[test]
    fn pue_overhead_below_one_is_rejected() {
        let mut config = SimulationConfig::default();
        config.pue_overhead = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPueOverhead(_))
        ));
    }

    #[test]
    fn timestep_count_rounds_up() {
        let mut config = SimulationConfig::default();
        config.duration_days = 1.0;
        assert_eq!(config.num_timesteps(), 24);

        config.duration_days = 0.5;
        assert_eq!(config.num_timesteps(), 12);

        config.duration_days = 1.02;
        assert_eq!(config.num_timesteps(), 25);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{"location": "NY", "cooling_type": "water", "capacity_mw": 2.5}"#,
        )
        .unwrap();
        assert_eq!(config.location, "NY");
        assert_eq!(config.cooling_type, CoolingType::Water);
        assert_eq!(config.capacity_mw, 2.5);
        assert_eq!(config.duration_days, 7.0);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_cooling_string_deserializes_as_air() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"cooling_type": "cryogenic"}"#).unwrap();
        assert_eq!(config.cooling_type, CoolingType::Air);
    }

    #[test]
    fn start_is_midnight() {
        let config = SimulationConfig::default();
        assert_eq!(config.start().time(), NaiveTime::MIN);
    }
}
