use crate::VfError;

/// Floating point type used throughout the engine
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, VfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(VfError::NonFinite { what, value: v })
    }
}

/// Clamp a value to the unit interval [0, 1].
///
/// Used for state-of-charge and blockage fractions, which are hard-bounded
/// regardless of what the integration step produced.
pub fn clamp_fraction(v: Real) -> Real {
    v.clamp(0.0, 1.0)
}

/// True if `v` lies in [0, 1] (closed on both ends).
pub fn is_fraction(v: Real) -> bool {
    (0.0..=1.0).contains(&v)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamp_fraction_always_a_fraction(v in -1e12_f64..1e12) {
            prop_assert!(is_fraction(clamp_fraction(v)));
        }
    }
}
