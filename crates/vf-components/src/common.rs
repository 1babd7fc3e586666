//! Shared numeric guards for link calculations.

use crate::error::{ComponentError, ComponentResult};
use vf_core::numeric::ensure_finite;

/// One floor for every structural division in this crate.
///
/// Resistance and conductance denominators, capacity denominators, and the
/// active-cell SOC threshold all share this constant so the divide-by-zero
/// protections stay in one testable place.
pub const MIN_DIVISOR: f64 = 1e-6;

/// Resistance presented by a short-circuited cell (Ω).
pub const SHORT_RESISTANCE_OHM: f64 = MIN_DIVISOR;

/// Resistance presented by an open or runaway-isolated cell (Ω).
pub const OPEN_RESISTANCE_OHM: f64 = 1.0 / MIN_DIVISOR;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_open_are_reciprocal() {
        assert_eq!(SHORT_RESISTANCE_OHM * OPEN_RESISTANCE_OHM, 1.0);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }
}
