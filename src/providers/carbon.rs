//! Grid carbon intensity table backed by per-region CSV files.
//!
//! Input files carry a timestamp column followed by one or more value
//! columns; the intensity column is picked by header name (anything
//! containing "CI" or "carbon", case-insensitive) with the second column as
//! a fallback. Values are grams CO2 per kWh.
//!
//! Lookups key on (date, hour). A missing slot falls back to the mean for
//! that hour of day across the whole dataset, then to the overall mean, so
//! a simulated date outside the recorded range still resolves.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::CarbonIntensityProvider;
use crate::error::DataError;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// One carbon intensity observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonRecord {
    pub timestamp: NaiveDateTime,
    pub intensity_g_per_kwh: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Agg {
    sum: f64,
    count: u32,
}

impl Agg {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Pre-indexed carbon intensity lookup table.
#[derive(Debug, Clone)]
pub struct CarbonIntensityTable {
    by_slot: HashMap<(chrono::NaiveDate, u32), Agg>,
    by_hour_of_day: HashMap<u32, Agg>,
    overall_mean: f64,
}

impl CarbonIntensityTable {
    pub fn from_records(records: &[CarbonRecord]) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty {
                path: "<records>".to_string(),
            });
        }

        let mut by_slot: HashMap<(chrono::NaiveDate, u32), Agg> = HashMap::new();
        let mut by_hour_of_day: HashMap<u32, Agg> = HashMap::new();
        let mut total = Agg::default();
        for r in records {
            by_slot
                .entry((r.timestamp.date(), r.timestamp.hour()))
                .or_default()
                .push(r.intensity_g_per_kwh);
            by_hour_of_day
                .entry(r.timestamp.hour())
                .or_default()
                .push(r.intensity_g_per_kwh);
            total.push(r.intensity_g_per_kwh);
        }

        Ok(Self {
            by_slot,
            by_hour_of_day,
            overall_mean: total.mean(),
        })
    }

    /// Load and parse a carbon intensity CSV file.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_csv_reader(file, &display)
    }

    /// Parse CSV data from any reader. `origin` labels errors.
    pub fn from_csv_reader<R: Read>(reader: R, origin: &str) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DataError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?
            .clone();

        // Pick the intensity column by header name, else the second column.
        let value_col = headers
            .iter()
            .position(|h| {
                let h = h.to_ascii_lowercase();
                h.contains("ci") || h.contains("carbon")
            })
            .filter(|&i| i > 0)
            .unwrap_or(1);

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row.map_err(|e| DataError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
            let (Some(ts_field), Some(value_field)) = (row.get(0), row.get(value_col)) else {
                continue;
            };
            let Some(timestamp) = parse_timestamp(ts_field.trim()) else {
                continue;
            };
            let Ok(value) = value_field.trim().parse::<f64>() else {
                continue;
            };
            records.push(CarbonRecord {
                timestamp,
                intensity_g_per_kwh: value,
            });
        }

        if records.is_empty() {
            return Err(DataError::Empty {
                path: origin.to_string(),
            });
        }
        debug!(records = records.len(), origin, "loaded carbon intensity data");
        Self::from_records(&records)
    }
}

impl CarbonIntensityProvider for CarbonIntensityTable {
    fn intensity(&self, timestamp: NaiveDateTime) -> f64 {
        if let Some(agg) = self.by_slot.get(&(timestamp.date(), timestamp.hour())) {
            return agg.mean();
        }
        if let Some(agg) = self.by_hour_of_day.get(&timestamp.hour()) {
            return agg.mean();
        }
        self.overall_mean
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
