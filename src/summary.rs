//! Aggregation over a completed simulation result.

use serde::Serialize;

use crate::cooling::CoolingType;
use crate::error::SummaryError;
use crate::result::SimulationResult;

/// Key figures for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_energy_kwh: f64,
    pub average_power_kw: f64,
    pub peak_power_kw: f64,
    pub total_carbon_emissions_kg: f64,
    pub total_carbon_emissions_tons: f64,
    /// Share of total energy drawn by IT equipment, percent.
    pub datacenter_percent: f64,
    /// Share of total energy drawn by the cooling plant, percent.
    pub cooling_percent: f64,
    pub simulation_duration_hours: usize,
    pub location: String,
    pub cooling_type: CoolingType,
    pub capacity_mw: f64,
    /// Present only for water-involving cooling technologies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_water_usage_liters: Option<f64>,
}

/// Series available for scalar queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ItPower,
    CoolingPower,
    TotalPower,
    CarbonEmissions,
    WaterUsage,
    CarbonIntensity,
}

/// Aggregation applied to a [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Average,
    Peak,
    Total,
}

fn ensure_data(result: &SimulationResult) -> Result<(), SummaryError> {
    // An all-zero IT series means nothing was actually simulated.
    if result.is_empty() || result.records().iter().all(|r| r.it_power_w == 0.0) {
        return Err(SummaryError::NoData);
    }
    Ok(())
}

/// Summarize a completed run.
///
/// Powers are reported in kW; since samples are hourly, a summed power
/// series in W doubles as total energy in Wh.
pub fn summarize(result: &SimulationResult) -> Result<Summary, SummaryError> {
    ensure_data(result)?;
    let records = result.records();

    let total_energy_wh: f64 = records.iter().map(|r| r.total_power_w).sum();
    let it_energy_wh: f64 = records.iter().map(|r| r.it_power_w).sum();
    let cooling_energy_wh: f64 = records.iter().map(|r| r.cooling_power_w).sum();
    let peak_power_w = records
        .iter()
        .map(|r| r.total_power_w)
        .fold(f64::NEG_INFINITY, f64::max);
    let total_carbon_kg: f64 = records.iter().map(|r| r.carbon_emissions_kg).sum();

    let total_water_usage_liters = if result.cooling_type.uses_water() {
        Some(records.iter().map(|r| r.water_usage_liters).sum())
    } else {
        None
    };

    Ok(Summary {
        total_energy_kwh: total_energy_wh / 1000.0,
        average_power_kw: total_energy_wh / records.len() as f64 / 1000.0,
        peak_power_kw: peak_power_w / 1000.0,
        total_carbon_emissions_kg: total_carbon_kg,
        total_carbon_emissions_tons: total_carbon_kg / 1000.0,
        datacenter_percent: it_energy_wh / total_energy_wh * 100.0,
        cooling_percent: cooling_energy_wh / total_energy_wh * 100.0,
        simulation_duration_hours: records.len(),
        location: result.location.clone(),
        cooling_type: result.cooling_type,
        capacity_mw: result.capacity_mw,
        total_water_usage_liters,
    })
}

/// Scalar aggregate of one series from a completed run.
pub fn query(
    result: &SimulationResult,
    statistic: Statistic,
    metric: Metric,
) -> Result<f64, SummaryError> {
    ensure_data(result)?;
    let values = result.records().iter().map(|r| match metric {
        Metric::ItPower => r.it_power_w,
        Metric::CoolingPower => r.cooling_power_w,
        Metric::TotalPower => r.total_power_w,
        Metric::CarbonEmissions => r.carbon_emissions_kg,
        Metric::WaterUsage => r.water_usage_liters,
        Metric::CarbonIntensity => r.carbon_intensity_g_per_kwh,
    });

    Ok(match statistic {
        Statistic::Total => values.sum(),
        Statistic::Average => values.sum::<f64>() / result.len() as f64,
        Statistic::Peak => values.fold(f64::NEG_INFINITY, f64::max),
    })
}
