//! Cooling technology profiles and the cooling policy.
//!
//! Each supported cooling technology carries a constant parameter set
//! (coefficient of performance, fan/water factors, typical PUE range). The
//! policy computes PUE and water-usage estimates from those parameters.
//! An unrecognized cooling type string deliberately falls back to air
//! cooling instead of erroring; that mirrors how operators tend to configure
//! these systems and is relied on by callers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString};

/// Supported cooling technologies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CoolingType {
    Air,
    Water,
    Immersion,
    Hybrid,
}

impl CoolingType {
    /// Parse a cooling type string, falling back to air for unknown values.
    ///
    /// The fallback is a documented policy choice, not an error path.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or(CoolingType::Air)
    }

    /// Whether this technology rejects heat through an evaporative loop and
    /// therefore consumes water at the cooling tower.
    pub fn uses_water(self) -> bool {
        !matches!(self, CoolingType::Air)
    }
}

impl Default for CoolingType {
    fn default() -> Self {
        CoolingType::Air
    }
}

/// Serde helper for config files: unknown cooling strings map to air.
pub(crate) fn de_cooling_type_lossy<'de, D>(deserializer: D) -> Result<CoolingType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(CoolingType::parse_lossy(&s))
}

/// Constant parameter set for one cooling technology.
#[derive(Debug, Clone, Serialize)]
pub struct CoolingProfile {
    pub name: &'static str,
    /// Chiller coefficient of performance for this technology.
    pub coefficient_of_performance: f64,
    /// Relative fan power compared to the air-cooled baseline.
    pub fan_power_factor: f64,
    /// Relative water draw compared to the water-cooled baseline.
    pub water_usage_factor: f64,
    /// Cooling power multiplier relative to the air-cooled baseline.
    pub efficiency_factor: f64,
    /// Typical facility PUE range for this technology.
    pub pue_range: (f64, f64),
    pub description: &'static str,
}

static PROFILES: Lazy<HashMap<CoolingType, CoolingProfile>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        CoolingType::Air,
        CoolingProfile {
            name: "Air-Cooled",
            coefficient_of_performance: 3.0,
            fan_power_factor: 1.0,
            water_usage_factor: 0.0,
            efficiency_factor: 1.0,
            pue_range: (1.4, 1.8),
            description: "Traditional air cooling with CRAC units and chillers",
        },
    );
    m.insert(
        CoolingType::Water,
        CoolingProfile {
            name: "Water-Cooled",
            coefficient_of_performance: 5.0,
            fan_power_factor: 0.7,
            water_usage_factor: 1.0,
            efficiency_factor: 0.7,
            pue_range: (1.2, 1.5),
            description: "Water cooling with cooling towers",
        },
    );
    m.insert(
        CoolingType::Immersion,
        CoolingProfile {
            name: "Immersion Cooling",
            coefficient_of_performance: 7.0,
            fan_power_factor: 0.3,
            water_usage_factor: 0.3,
            efficiency_factor: 0.5,
            pue_range: (1.05, 1.2),
            description: "Servers immersed in dielectric fluid",
        },
    );
    m.insert(
        CoolingType::Hybrid,
        CoolingProfile {
            name: "Hybrid Cooling",
            coefficient_of_performance: 4.5,
            fan_power_factor: 0.8,
            water_usage_factor: 0.5,
            efficiency_factor: 0.8,
            pue_range: (1.3, 1.6),
            description: "Combination of air and water cooling approaches",
        },
    );
    m
});

/// Look up the constant profile for a cooling technology.
pub fn profile_for(cooling_type: CoolingType) -> &'static CoolingProfile {
    // The table covers every variant; the air entry doubles as the safety net.
    PROFILES
        .get(&cooling_type)
        .unwrap_or_else(|| &PROFILES[&CoolingType::Air])
}

/// Cooling policy bound to one technology.
#[derive(Debug, Clone)]
pub struct CoolingPolicy {
    cooling_type: CoolingType,
    profile: &'static CoolingProfile,
}

impl CoolingPolicy {
    pub fn new(cooling_type: CoolingType) -> Self {
        Self {
            cooling_type,
            profile: profile_for(cooling_type),
        }
    }

    /// Policy for a cooling type given as a string; unknown values fall back
    /// to air cooling.
    pub fn from_name(name: &str) -> Self {
        Self::new(CoolingType::parse_lossy(name))
    }

    pub fn cooling_type(&self) -> CoolingType {
        self.cooling_type
    }

    pub fn profile(&self) -> &'static CoolingProfile {
        self.profile
    }

    /// Power usage effectiveness: total facility power over IT power.
    ///
    /// Defined as exactly 1.0 when there is no IT power to divide by.
    pub fn pue(&self, it_power_w: f64, cooling_power_w: f64, other_power_w: f64) -> f64 {
        if it_power_w > 0.0 {
            (it_power_w + cooling_power_w + other_power_w) / it_power_w
        } else {
            1.0
        }
    }

    /// Estimate water usage in liters for a given amount of rejected heat.
    ///
    /// Only the technologies with an evaporative water loop (water, hybrid)
    /// draw water here; everything else returns zero. The base estimate is
    /// 1.8 L per kWh of rejected heat, adjusted up for hot ambient air and
    /// down for humid air, then weighted by the technology's water factor.
    pub fn water_usage(&self, heat_rejected_w: f64, ambient_c: f64, humidity_pct: f64) -> f64 {
        match self.cooling_type {
            CoolingType::Water | CoolingType::Hybrid => {
                let base = heat_rejected_w * 1.8 / 1000.0;
                let temp_factor = 1.0 + ((ambient_c - 20.0) / 100.0).max(0.0);
                let humidity_factor = 1.0 - (humidity_pct / 100.0).min(0.3);
                base * temp_factor * humidity_factor * self.profile.water_usage_factor
            }
            _ => 0.0,
        }
    }
}
