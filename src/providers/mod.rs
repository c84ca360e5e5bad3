//! Environmental data providers.
//!
//! Providers resolve time-varying inputs (weather, grid carbon intensity)
//! for the simulation clock. Lookups are point queries pre-indexed at
//! construction time, so the engine's hot loop stays O(1) per hour, and they
//! always resolve for an in-range date: a missing hour falls back to a
//! documented aggregate (monthly mean for weather, hour-of-day mean for
//! carbon intensity) instead of erroring. Construction is the only fallible
//! step. Tables are read-only after construction and safe to share across
//! concurrently running engines.

pub mod carbon;
pub mod locations;
pub mod weather;

pub use carbon::{CarbonIntensityTable, CarbonRecord};
pub use locations::{location_info, LocationInfo};
pub use weather::{WeatherRecord, WeatherTable};

use chrono::NaiveDateTime;

/// Ambient weather conditions for a timestamp.
pub trait WeatherProvider: Send + Sync {
    /// Dry-bulb (ordinary) air temperature in degrees Celsius.
    fn dry_bulb(&self, timestamp: NaiveDateTime) -> f64;

    /// Wet-bulb temperature in degrees Celsius.
    fn wet_bulb(&self, timestamp: NaiveDateTime) -> f64;

    /// Relative humidity in percent (0-100).
    fn humidity(&self, timestamp: NaiveDateTime) -> f64;
}

/// Grid carbon intensity for a timestamp, in grams CO2 per kWh.
pub trait CarbonIntensityProvider: Send + Sync {
    fn intensity(&self, timestamp: NaiveDateTime) -> f64;
}
