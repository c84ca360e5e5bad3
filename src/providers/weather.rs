//! Weather data table backed by EPW (EnergyPlus Weather) files.
//!
//! EPW files carry one year of hourly observations: 8 header lines followed
//! by comma-separated data rows where column 7 is dry-bulb temperature (C),
//! column 9 relative humidity (%) and column 10 atmospheric pressure (Pa).
//! EPW hours run 1-24 and are shifted to 0-23 on load.
//!
//! Lookups key on (month, day, hour); the year is ignored so a typical
//! meteorological year answers queries for any simulated year. A missing
//! hour falls back to the monthly mean, then to fixed defaults.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::WeatherProvider;
use crate::error::DataError;

const DEFAULT_DRY_BULB_C: f64 = 20.0;
const DEFAULT_WET_BULB_C: f64 = 15.0;
const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// One hourly weather observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub month: u32,
    pub day: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub dry_bulb_c: f64,
    pub humidity_pct: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Sample {
    dry_bulb_sum: f64,
    wet_bulb_sum: f64,
    humidity_sum: f64,
    count: u32,
}

impl Sample {
    fn push(&mut self, dry_bulb: f64, wet_bulb: f64, humidity: f64) {
        self.dry_bulb_sum += dry_bulb;
        self.wet_bulb_sum += wet_bulb;
        self.humidity_sum += humidity;
        self.count += 1;
    }

    fn dry_bulb(&self) -> f64 {
        self.dry_bulb_sum / self.count as f64
    }

    fn wet_bulb(&self) -> f64 {
        self.wet_bulb_sum / self.count as f64
    }

    fn humidity(&self) -> f64 {
        self.humidity_sum / self.count as f64
    }
}

/// Pre-indexed weather lookup table.
#[derive(Debug, Clone)]
pub struct WeatherTable {
    by_hour: HashMap<(u32, u32, u32), Sample>,
    by_month: HashMap<u32, Sample>,
}

impl WeatherTable {
    /// Build the table from observations.
    ///
    /// Duplicate (month, day, hour) keys are averaged, matching how a
    /// multi-year file collapses onto the day-of-year grid.
    pub fn from_records(records: &[WeatherRecord]) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty {
                path: "<records>".to_string(),
            });
        }

        let mut by_hour: HashMap<(u32, u32, u32), Sample> = HashMap::new();
        let mut by_month: HashMap<u32, Sample> = HashMap::new();
        for r in records {
            let wet_bulb = wet_bulb_stull(r.dry_bulb_c, r.humidity_pct);
            by_hour
                .entry((r.month, r.day, r.hour))
                .or_default()
                .push(r.dry_bulb_c, wet_bulb, r.humidity_pct);
            by_month
                .entry(r.month)
                .or_default()
                .push(r.dry_bulb_c, wet_bulb, r.humidity_pct);
        }

        Ok(Self { by_hour, by_month })
    }

    /// Load and parse an EPW weather file.
    pub fn from_epw_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_epw_reader(BufReader::new(file), &display)
    }

    /// Parse EPW data from any buffered reader. `origin` labels errors.
    pub fn from_epw_reader<R: BufRead>(reader: R, origin: &str) -> Result<Self, DataError> {
        let mut records = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| DataError::Io {
                path: origin.to_string(),
                source,
            })?;
            // Lines 1-8 are header metadata.
            if line_no < 8 {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 10 {
                continue;
            }
            let parsed = (
                fields[1].trim().parse::<u32>(),
                fields[2].trim().parse::<u32>(),
                fields[3].trim().parse::<u32>(),
                fields[6].trim().parse::<f64>(),
                fields[8].trim().parse::<f64>(),
            );
            // Rows with unparseable values are skipped, not fatal.
            if let (Ok(month), Ok(day), Ok(hour), Ok(dry_bulb), Ok(humidity)) = parsed {
                if !(1..=24).contains(&hour) {
                    continue;
                }
                records.push(WeatherRecord {
                    month,
                    day,
                    hour: hour - 1,
                    dry_bulb_c: dry_bulb,
                    humidity_pct: humidity,
                });
            }
        }

        if records.is_empty() {
            return Err(DataError::Empty {
                path: origin.to_string(),
            });
        }
        debug!(records = records.len(), origin, "loaded EPW weather data");
        Self::from_records(&records)
    }

    fn sample(&self, timestamp: NaiveDateTime) -> Option<&Sample> {
        self.by_hour
            .get(&(timestamp.month(), timestamp.day(), timestamp.hour()))
            .or_else(|| self.by_month.get(&timestamp.month()))
    }
}

impl WeatherProvider for WeatherTable {
    fn dry_bulb(&self, timestamp: NaiveDateTime) -> f64 {
        self.sample(timestamp)
            .map(Sample::dry_bulb)
            .unwrap_or(DEFAULT_DRY_BULB_C)
    }

    fn wet_bulb(&self, timestamp: NaiveDateTime) -> f64 {
        self.sample(timestamp)
            .map(Sample::wet_bulb)
            .unwrap_or(DEFAULT_WET_BULB_C)
    }

    fn humidity(&self, timestamp: NaiveDateTime) -> f64 {
        self.sample(timestamp)
            .map(Sample::humidity)
            .unwrap_or(DEFAULT_HUMIDITY_PCT)
    }
}

/// Wet-bulb temperature from dry-bulb and relative humidity, after
/// Stull (2011). Valid for ordinary atmospheric conditions, which covers
/// every climate a datacenter gets built in.
pub fn wet_bulb_stull(dry_bulb_c: f64, humidity_pct: f64) -> f64 {
    let t = dry_bulb_c;
    let rh = humidity_pct.clamp(0.0, 100.0);
    t * (0.151_977 * (rh + 8.313_659).sqrt()).atan() + (t + rh).atan() - (rh - 1.676_331).atan()
        + 0.003_918_38 * rh.powf(1.5) * (0.023_101 * rh).atan()
        - 4.686_035
}
