//! Simulation output: per-hour records and the completed result.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cooling::CoolingType;
use crate::error::ExportError;

/// One hour of simulated operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestepRecord {
    pub timestamp: NaiveDateTime,
    pub ambient_temp_c: f64,
    pub carbon_intensity_g_per_kwh: f64,
    /// Utilization fraction driving this hour, in [0, 1].
    pub workload: f64,
    /// IT equipment power (CPUs + IT fans), W. One hourly sample in W is
    /// numerically the energy for the hour in Wh.
    pub it_power_w: f64,
    pub cooling_power_w: f64,
    /// Facility power after the PUE overhead multiplier, W.
    pub total_power_w: f64,
    pub carbon_emissions_kg: f64,
    pub water_usage_liters: f64,
}

/// The ordered output of one engine run. Immutable once the run completes;
/// a new run replaces it entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub location: String,
    pub cooling_type: CoolingType,
    pub capacity_mw: f64,
    pub records: Vec<TimestepRecord>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TimestepRecord] {
        &self.records
    }

    /// Write one CSV row per hour with columns matching [`TimestepRecord`].
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Write the full result (metadata plus records) as pretty JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write_json(BufWriter::new(file))
    }
}
