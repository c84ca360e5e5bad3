//! IT and cooling-plant thermal model.
//!
//! The engine consumes this model through the [`ItThermalModel`] trait: a
//! per-rack load calculation, a CRAC return-temperature aggregate, the HVAC
//! subsystem power split, and the cooling-tower water draw. All quantities
//! are for the *unscaled* reference datacenter; the engine applies the
//! capacity scaling factor on top.
//!
//! [`RackThermalModel`] is the built-in reference implementation. CPU power
//! is linear between idle and full load, fans follow the cubic fan affinity
//! law, and air-side heat balances use sensible heat at constant density.

use serde::Serialize;

use crate::config::SimulationConfig;

/// Specific heat of air at constant pressure, J/(kg K).
const C_AIR: f64 = 1006.0;
/// Air density at sea level, kg/m3.
const RHO_AIR: f64 = 1.225;
/// Water density, kg/m3.
const RHO_WATER: f64 = 1000.0;
/// Specific heat of water, J/(kg K).
const C_WATER: f64 = 4186.0;

/// Reference power of one rack's IT fan bank at full airflow, W.
const ITFAN_REF_P: f64 = 600.0;
/// IT fan airflow ratio at idle; fans never fully stop.
const ITFAN_AIRFLOW_RATIO_LB: f64 = 0.6;
/// Full-load volumetric airflow per rack, m3/s.
const IT_FAN_FULL_LOAD_V: f64 = 0.8;

/// CRAC supply airflow per watt of facility full load, m3/(s W).
const CRAC_SUPPLY_AIR_FLOW_RATE_PU: f64 = 5.0e-5;
/// CRAC fan power per watt of facility full load at reference airflow.
const CRAC_FAN_REF_P_PU: f64 = 0.02;
/// Cooling-tower fan power per watt of rejected heat.
const CT_FAN_REF_P_PU: f64 = 0.01;
/// Chiller coefficient of performance at the 15 C reference ambient.
const CHILLER_COP: f64 = 4.0;
/// Chilled/condenser water loop design temperature rise, K.
const CW_DELTA_T_DESIGN: f64 = 5.0;
/// Chilled-water loop pressure drop, Pa.
const CW_PRESSURE_DROP: f64 = 300_000.0;
/// Condenser/cooling-tower loop pressure drop, Pa.
const CT_PRESSURE_DROP: f64 = 200_000.0;
const CW_PUMP_EFFICIENCY: f64 = 0.87;
const CT_PUMP_EFFICIENCY: f64 = 0.87;

/// Per-rack outcome of one load calculation.
#[derive(Debug, Clone, Serialize)]
pub struct RackLoadResult {
    pub cpu_power_w: Vec<f64>,
    pub fan_power_w: Vec<f64>,
    pub outlet_temp_c: Vec<f64>,
}

impl RackLoadResult {
    /// Total IT power (CPUs plus IT fans) across all racks.
    pub fn total_it_power_w(&self) -> f64 {
        self.cpu_power_w.iter().sum::<f64>() + self.fan_power_w.iter().sum::<f64>()
    }
}

/// HVAC subsystem power split, W.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HvacPower {
    pub crac_fan_w: f64,
    pub ct_fan_w: f64,
    pub chiller_w: f64,
    pub cw_pump_w: f64,
    pub ct_pump_w: f64,
}

/// Narrow interface between the engine and the rack/plant physics.
pub trait ItThermalModel: Send + Sync {
    /// Per-rack CPU power, fan power and outlet temperature for a load
    /// vector (percent per rack) and a CRAC supply setpoint.
    fn compute_load(&self, rack_load_pct: &[f64], crac_setpoint_c: f64) -> RackLoadResult;

    /// Average CRAC return temperature from per-rack outlet temperatures and
    /// the configured return approach temperatures.
    fn avg_return_temp(&self, outlet_temps_c: &[f64]) -> f64;

    /// HVAC subsystem powers for the given temperatures, sized for
    /// `full_load_w` (the *scaled* facility full-load capacity).
    fn hvac_power(
        &self,
        crac_setpoint_c: f64,
        return_temp_c: f64,
        ambient_c: f64,
        full_load_w: f64,
    ) -> HvacPower;

    /// Cooling-tower evaporative water draw in liters per hour for the
    /// unscaled reference plant, given hot/cold loop temperatures and the
    /// ambient wet-bulb temperature.
    fn cooling_tower_water_usage(&self, hot_c: f64, cold_c: f64, wet_bulb_c: f64) -> f64;

    /// Unscaled full-load design capacity of the reference datacenter, W.
    fn design_capacity_w(&self) -> f64;
}

/// Built-in reference model parameterized by the simulation config.
#[derive(Debug, Clone)]
pub struct RackThermalModel {
    num_racks: usize,
    cpus_per_rack: usize,
    cpu_idle_power_w: f64,
    cpu_full_load_power_w: f64,
    max_w_per_rack: f64,
    supply_approach_temps_c: Vec<f64>,
    return_approach_temps_c: Vec<f64>,
    design_capacity_w: f64,
}

impl RackThermalModel {
    pub fn new(config: &SimulationConfig) -> Self {
        let t = &config.topology;
        let rack_full_load =
            (t.cpus_per_rack as f64 * t.cpu_full_load_power_w + ITFAN_REF_P).min(t.max_w_per_rack);
        Self {
            num_racks: t.num_racks,
            cpus_per_rack: t.cpus_per_rack,
            cpu_idle_power_w: t.cpu_idle_power_w,
            cpu_full_load_power_w: t.cpu_full_load_power_w,
            max_w_per_rack: t.max_w_per_rack,
            supply_approach_temps_c: config.supply_approach_temps_c.clone(),
            return_approach_temps_c: config.return_approach_temps_c.clone(),
            design_capacity_w: t.num_racks as f64 * rack_full_load,
        }
    }

    /// IT fan airflow ratio for a load fraction: fans idle at the lower
    /// bound and reach full airflow at full load.
    fn fan_airflow_ratio(load_fraction: f64) -> f64 {
        ITFAN_AIRFLOW_RATIO_LB + (1.0 - ITFAN_AIRFLOW_RATIO_LB) * load_fraction
    }
}

impl ItThermalModel for RackThermalModel {
    fn compute_load(&self, rack_load_pct: &[f64], crac_setpoint_c: f64) -> RackLoadResult {
        let n = rack_load_pct.len().min(self.num_racks);
        let mut cpu_power_w = Vec::with_capacity(n);
        let mut fan_power_w = Vec::with_capacity(n);
        let mut outlet_temp_c = Vec::with_capacity(n);

        for (i, &pct) in rack_load_pct.iter().take(n).enumerate() {
            let load = (pct / 100.0).clamp(0.0, 1.0);
            let cpus = self.cpus_per_rack as f64;

            let cpu = cpus
                * (self.cpu_idle_power_w
                    + (self.cpu_full_load_power_w - self.cpu_idle_power_w) * load);

            let airflow_ratio = Self::fan_airflow_ratio(load);
            let fan = ITFAN_REF_P * airflow_ratio.powi(3);

            // Rack power cap: shed CPU power first, fans keep spinning.
            let (cpu, fan) = if cpu + fan > self.max_w_per_rack {
                ((self.max_w_per_rack - fan).max(0.0), fan)
            } else {
                (cpu, fan)
            };

            let inlet = crac_setpoint_c + self.supply_approach_temps_c[i];
            let airflow = IT_FAN_FULL_LOAD_V * airflow_ratio;
            let outlet = inlet + (cpu + fan) / (RHO_AIR * C_AIR * airflow);

            cpu_power_w.push(cpu);
            fan_power_w.push(fan);
            outlet_temp_c.push(outlet);
        }

        RackLoadResult {
            cpu_power_w,
            fan_power_w,
            outlet_temp_c,
        }
    }

    fn avg_return_temp(&self, outlet_temps_c: &[f64]) -> f64 {
        if outlet_temps_c.is_empty() {
            return 0.0;
        }
        let sum: f64 = outlet_temps_c
            .iter()
            .zip(&self.return_approach_temps_c)
            .map(|(outlet, approach)| outlet + approach)
            .sum();
        sum / outlet_temps_c.len() as f64
    }

    fn hvac_power(
        &self,
        crac_setpoint_c: f64,
        return_temp_c: f64,
        ambient_c: f64,
        full_load_w: f64,
    ) -> HvacPower {
        // Constant-volume CRAC sized proportionally to facility full load.
        let supply_airflow = CRAC_SUPPLY_AIR_FLOW_RATE_PU * full_load_w;
        let crac_fan_w = CRAC_FAN_REF_P_PU * full_load_w;

        // Sensible cooling load removed by the CRAC coil.
        let cooling_load_w =
            (RHO_AIR * C_AIR * supply_airflow * (return_temp_c - crac_setpoint_c)).max(0.0);

        // Chillers lose efficiency as the ambient rises above 15 C.
        let ambient_derate = 1.0 + ((ambient_c - 15.0) / 50.0).max(0.0);
        let chiller_w = cooling_load_w / CHILLER_COP * ambient_derate;

        // The tower rejects the coil load plus chiller compressor heat.
        let heat_rejected_w = cooling_load_w + chiller_w;
        let ct_fan_w = CT_FAN_REF_P_PU * heat_rejected_w * (1.0 + ((ambient_c - 25.0) / 30.0).max(0.0));

        // Pump power: volumetric flow times pressure drop over efficiency.
        let cw_flow = cooling_load_w / (RHO_WATER * C_WATER * CW_DELTA_T_DESIGN);
        let ct_flow = heat_rejected_w / (RHO_WATER * C_WATER * CW_DELTA_T_DESIGN);
        let cw_pump_w = cw_flow * CW_PRESSURE_DROP / CW_PUMP_EFFICIENCY;
        let ct_pump_w = ct_flow * CT_PRESSURE_DROP / CT_PUMP_EFFICIENCY;

        HvacPower {
            crac_fan_w,
            ct_fan_w,
            chiller_w,
            cw_pump_w,
            ct_pump_w,
        }
    }

    fn cooling_tower_water_usage(&self, hot_c: f64, cold_c: f64, wet_bulb_c: f64) -> f64 {
        let range = (hot_c - cold_c).max(0.0);
        // Condenser loop design flow for the unscaled plant.
        let water_flow_m3_s = self.design_capacity_w / (RHO_WATER * C_WATER * CW_DELTA_T_DESIGN);
        // Evaporation rule of thumb: 0.153% of circulated flow per kelvin of
        // range, with drier air (low wet bulb) evaporating slightly more.
        let evaporation_m3_s = 0.00085 * 1.8 * range * water_flow_m3_s;
        let wet_bulb_factor = 1.0 + ((cold_c - wet_bulb_c).max(0.0)) / 100.0;
        evaporation_m3_s * wet_bulb_factor * 3600.0 * 1000.0
    }

    fn design_capacity_w(&self) -> f64 {
        self.design_capacity_w
    }
}
