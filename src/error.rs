//! Error taxonomy for the simulator.
//!
//! Three fault classes exist: configuration problems surface at construction
//! and are fatal; missing location/weather/carbon data surfaces when the
//! backing tables are loaded; summary queries before any run are recoverable
//! by running a simulation first. The engine itself never retries anything.

use thiserror::Error;

/// Invalid or inconsistent simulation configuration. Fatal at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{which} approach temperature list has {found} entries, expected {expected} (one per rack)")]
    ApproachListMismatch {
        which: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("rack grid is inconsistent: {rows} rows x {per_row} racks/row != {racks} racks")]
    RackGridMismatch {
        rows: usize,
        per_row: usize,
        racks: usize,
    },

    #[error("datacenter capacity must be positive, got {0} MW")]
    NonPositiveCapacity(f64),

    #[error("simulation duration must be positive, got {0} days")]
    NonPositiveDuration(f64),

    #[error("PUE overhead must be >= 1.0, got {0}")]
    InvalidPueOverhead(f64),

    #[error("cooling efficiency factor must be positive, got {0}")]
    InvalidEfficiencyFactor(f64),

    #[error("workload trace has {found} entries, expected {expected}")]
    WorkloadLength { expected: usize, found: usize },

    #[error("workload value {value} at hour {index} is outside [0, 1]")]
    WorkloadRange { index: usize, value: f64 },

    #[error("thermal model design capacity must be positive, got {0} W")]
    InvalidDesignCapacity(f64),

    #[error("unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// A provider cannot resolve its backing data. Unknown cooling types are
/// masked by the documented air fallback; unknown locations are not.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown location code: {0}")]
    UnknownLocation(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{path} contains no usable records")]
    Empty { path: String },
}

/// Summary queried before any timestep has been recorded.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("no simulation data available; run a simulation first")]
    NoData,
}

/// Failure while exporting a result to CSV or JSON.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
