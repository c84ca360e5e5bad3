//! Workload traces.
//!
//! A trace holds one fractional utilization value per simulated hour. Traces
//! either come from the caller (validated for length and range) or are
//! synthesized as a smooth diurnal pattern: higher during business hours
//! (08:00-20:00) with sinusoidal transitions, a lower baseline otherwise.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::ConfigError;

/// Ordered sequence of hourly utilization fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTrace(Vec<f64>);

impl WorkloadTrace {
    /// Build a trace from caller-provided values.
    ///
    /// Fails when the length differs from the simulated hour count or any
    /// value leaves `[0, 1]`.
    pub fn from_values(values: Vec<f64>, expected_hours: usize) -> Result<Self, ConfigError> {
        if values.len() != expected_hours {
            return Err(ConfigError::WorkloadLength {
                expected: expected_hours,
                found: values.len(),
            });
        }
        for (index, &value) in values.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::WorkloadRange { index, value });
            }
        }
        Ok(Self(values))
    }

    /// Synthesize the default diurnal pattern for the given number of hours.
    ///
    /// Hour `h` of each day maps to `0.7 + 0.2 * sin(pi * (h - 8) / 12)`
    /// during business hours and `0.4 + 0.1 * sin(pi * (h - 20) / 12)`
    /// otherwise. The pattern repeats every 24 hours and assumes the
    /// simulation clock starts at midnight.
    pub fn synthetic_diurnal(hours: usize) -> Self {
        let day_pattern: Vec<f64> = (0..24).map(Self::diurnal_value).collect();
        Self((0..hours).map(|i| day_pattern[i % 24]).collect())
    }

    fn diurnal_value(hour: usize) -> f64 {
        let h = hour as f64;
        if (8..20).contains(&hour) {
            0.7 + 0.2 * (PI * (h - 8.0) / 12.0).sin()
        } else {
            0.4 + 0.1 * (PI * (h - 20.0) / 12.0).sin()
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, hour: usize) -> f64 {
        self.0[hour]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn synthetic_trace_has_requested_length() {
        assert_eq!(WorkloadTrace::synthetic_diurnal(24).len(), 24);
        assert_eq!(WorkloadTrace::synthetic_diurnal(168).len(), 168);
        assert_eq!(WorkloadTrace::synthetic_diurnal(25).len(), 25);
    }

    #[test]
    fn synthetic_trace_peaks_in_afternoon() {
        let trace = WorkloadTrace::synthetic_diurnal(24);
        // Peak of the business-hours sinusoid is at hour 14.
        assert_relative_eq!(trace.get(14), 0.9, max_relative = 1e-12);
        // Start of business hours.
        assert_relative_eq!(trace.get(8), 0.7, max_relative = 1e-12);
        // Baseline right after business hours.
        assert_relative_eq!(trace.get(20), 0.4, max_relative = 1e-12);
    }

    #[test]
    fn synthetic_trace_repeats_daily() {
        let trace = WorkloadTrace::synthetic_diurnal(72);
        for hour in 0..24 {
            assert_eq!(trace.get(hour), trace.get(hour + 24));
            assert_eq!(trace.get(hour), trace.get(hour + 48));
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = WorkloadTrace::from_values(vec![0.5; 23], 24).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ConfigError::WorkloadLength {
                expected: 24,
                found: 23
            }
        ));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let mut values = vec![0.5; 24];
        values[7] = 1.2;
        let err = WorkloadTrace::from_values(values, 24).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ConfigError::WorkloadRange { index: 7, .. }
        ));
    }

    proptest! {
        #[test]
        fn synthetic_values_stay_in_unit_interval(hours in 1usize..1000) {
            let trace = WorkloadTrace::synthetic_diurnal(hours);
            prop_assert_eq!(trace.len(), hours);
            for &v in trace.as_slice() {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
