//! Monotonic voltage-vs-SOC lookup table.

use crate::error::{VoltError, VoltResult};
use vf_core::units::{Voltage, volts};

/// Open-circuit-voltage curve consumed by battery models.
///
/// Implementations must be deterministic: the same `soc` input always yields
/// the same voltage, with no observable side effects.
pub trait VocCurve: Send + Sync {
    /// Open-circuit voltage at the given state of charge (0..1).
    ///
    /// Inputs outside the table domain are clamped, never extrapolated.
    fn evaluate(&self, soc: f64) -> Voltage;
}

/// Piecewise-linear monotonic table from SOC breakpoints to voltage.
///
/// Breakpoints are validated once at construction; evaluation is a binary
/// search plus one linear interpolation, with clamping at both ends.
#[derive(Clone, Debug)]
pub struct VocTable {
    soc: Vec<f64>,
    voltage_v: Vec<f64>,
}

impl VocTable {
    /// Build a table from `(soc, voltage)` breakpoints.
    ///
    /// # Errors
    /// - fewer than two breakpoints
    /// - SOC breakpoints not strictly increasing or outside [0, 1]
    /// - voltages decreasing, negative, or non-finite
    pub fn from_points(points: &[(f64, f64)]) -> VoltResult<Self> {
        if points.len() < 2 {
            return Err(VoltError::TooShort {
                what: "voc table needs at least two breakpoints",
            });
        }
        for window in points.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(VoltError::NotMonotonic {
                    what: "soc breakpoints must be strictly increasing",
                });
            }
            if window[1].1 < window[0].1 {
                return Err(VoltError::NotMonotonic {
                    what: "voltage breakpoints must be non-decreasing",
                });
            }
        }
        for &(soc, voltage) in points {
            if !soc.is_finite() || !voltage.is_finite() {
                return Err(VoltError::NonFinite {
                    what: "table breakpoint",
                });
            }
            if !(0.0..=1.0).contains(&soc) {
                return Err(VoltError::OutOfRange {
                    what: "soc breakpoints must lie in [0, 1]",
                });
            }
            if voltage < 0.0 {
                return Err(VoltError::OutOfRange {
                    what: "voltage breakpoints must be non-negative",
                });
            }
        }

        Ok(Self {
            soc: points.iter().map(|p| p.0).collect(),
            voltage_v: points.iter().map(|p| p.1).collect(),
        })
    }

    /// Convenience: a straight line from `v_empty` at SOC 0 to `v_full` at SOC 1.
    pub fn linear(v_empty: f64, v_full: f64) -> VoltResult<Self> {
        Self::from_points(&[(0.0, v_empty), (1.0, v_full)])
    }

    fn interpolate(&self, soc: f64) -> f64 {
        let n = self.soc.len();
        if soc <= self.soc[0] {
            return self.voltage_v[0];
        }
        if soc >= self.soc[n - 1] {
            return self.voltage_v[n - 1];
        }
        // First breakpoint strictly above soc; lower neighbor exists since
        // soc > soc[0].
        let hi = self.soc.partition_point(|&s| s <= soc);
        let lo = hi - 1;
        let frac = (soc - self.soc[lo]) / (self.soc[hi] - self.soc[lo]);
        self.voltage_v[lo] + frac * (self.voltage_v[hi] - self.voltage_v[lo])
    }
}

impl VocCurve for VocTable {
    fn evaluate(&self, soc: f64) -> Voltage {
        volts(self.interpolate(soc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_table() -> VocTable {
        // Shape typical of a Li-ion cell string: steep knee near empty,
        // flat plateau, slight rise at full.
        VocTable::from_points(&[
            (0.0, 0.0),
            (0.1, 110.0),
            (0.5, 120.0),
            (0.9, 126.0),
            (1.0, 130.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_short_table() {
        assert!(matches!(
            VocTable::from_points(&[(0.0, 0.0)]),
            Err(VoltError::TooShort { .. })
        ));
    }

    #[test]
    fn rejects_non_monotonic_soc() {
        let err = VocTable::from_points(&[(0.0, 0.0), (0.5, 10.0), (0.5, 11.0)]).unwrap_err();
        assert!(matches!(err, VoltError::NotMonotonic { .. }));
    }

    #[test]
    fn rejects_decreasing_voltage() {
        let err = VocTable::from_points(&[(0.0, 5.0), (1.0, 4.0)]).unwrap_err();
        assert!(matches!(err, VoltError::NotMonotonic { .. }));
    }

    #[test]
    fn rejects_soc_outside_unit_interval() {
        let err = VocTable::from_points(&[(-0.1, 0.0), (1.0, 5.0)]).unwrap_err();
        assert!(matches!(err, VoltError::OutOfRange { .. }));
    }

    #[test]
    fn endpoints_exact_and_clamped() {
        let table = pack_table();
        assert_eq!(table.evaluate(0.0).value, 0.0);
        assert_eq!(table.evaluate(1.0).value, 130.0);
        // Out-of-domain inputs clamp to the nearest breakpoint
        assert_eq!(table.evaluate(-0.5).value, 0.0);
        assert_eq!(table.evaluate(1.5).value, 130.0);
    }

    #[test]
    fn interior_interpolation() {
        let table = pack_table();
        // Midpoint of the (0.1, 110) - (0.5, 120) segment
        let v = table.evaluate(0.3).value;
        assert!((v - 115.0).abs() < 1e-12);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let table = pack_table();
        let a = table.evaluate(0.73).value;
        let b = table.evaluate(0.73).value;
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
