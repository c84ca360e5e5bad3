//! Registry of supported datacenter locations.
//!
//! Maps short location codes to their display name, grid operator region,
//! and the weather/carbon data files under the data directory. Unknown
//! codes are an error: silently defaulting to some arbitrary location would
//! invalidate every downstream number.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{CarbonIntensityTable, WeatherTable};
use crate::error::DataError;

/// Static metadata for one supported location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationInfo {
    pub code: &'static str,
    pub name: &'static str,
    /// Balancing authority / ISO region for the local grid.
    pub grid_region: &'static str,
    /// EPW weather file under `<data_dir>/weather/`.
    pub weather_file: &'static str,
    /// Carbon intensity CSV under `<data_dir>/carbon/`.
    pub carbon_file: &'static str,
}

static LOCATIONS: Lazy<HashMap<&'static str, LocationInfo>> = Lazy::new(|| {
    let entries = [
        ("TX", "Texas", "ERCO", "USA_TX_Dallas-Fort.Worth.epw", "TX_NG_&_avgCI.csv"),
        ("NY", "New York", "NYIS", "USA_NY_New.York-LaGuardia.epw", "NY_NG_&_avgCI.csv"),
        ("CA", "California", "CISO", "USA_CA_San.Jose-Mineta.epw", "CA_NG_&_avgCI.csv"),
        ("AZ", "Arizona", "AZPS", "USA_AZ_Phoenix-Sky.Harbor.epw", "AZ_NG_&_avgCI.csv"),
        ("IL", "Illinois", "MISO", "USA_IL_Chicago.OHare.epw", "IL_NG_&_avgCI.csv"),
        ("GA", "Georgia", "SOCO", "USA_GA_Atlanta-Hartsfield-Jackson.epw", "GA_NG_&_avgCI.csv"),
        ("WA", "Washington", "BPAT", "USA_WA_Seattle-Tacoma.epw", "WA_NG_&_avgCI.csv"),
        ("VA", "Virginia", "PJM", "USA_VA_Leesburg.Exec.epw", "VA_NG_&_avgCI.csv"),
    ];
    entries
        .into_iter()
        .map(|(code, name, grid_region, weather_file, carbon_file)| {
            (
                code,
                LocationInfo {
                    code,
                    name,
                    grid_region,
                    weather_file,
                    carbon_file,
                },
            )
        })
        .collect()
});

/// Resolve a location code to its registry entry.
pub fn location_info(code: &str) -> Result<&'static LocationInfo, DataError> {
    LOCATIONS
        .get(code.to_ascii_uppercase().as_str())
        .ok_or_else(|| DataError::UnknownLocation(code.to_string()))
}

/// All registered location codes, sorted.
pub fn location_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = LOCATIONS.keys().copied().collect();
    codes.sort_unstable();
    codes
}

impl LocationInfo {
    pub fn weather_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("weather").join(self.weather_file)
    }

    pub fn carbon_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("carbon").join(self.carbon_file)
    }

    /// Load both provider tables for this location from the data directory.
    pub fn load_providers(
        &self,
        data_dir: &Path,
    ) -> Result<(WeatherTable, CarbonIntensityTable), DataError> {
        let weather = WeatherTable::from_epw_file(self.weather_path(data_dir))?;
        let carbon = CarbonIntensityTable::from_csv_file(self.carbon_path(data_dir))?;
        Ok((weather, carbon))
    }
}
