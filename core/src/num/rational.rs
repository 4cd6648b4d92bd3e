//! Exact rational arithmetic substrate.
//!
//! Dimensional exponents and basis-transform matrix entries must be exact
//! (§9 "Exact rational arithmetic") — fractions like 3/2 occur routinely in
//! electromagnetic derivations, and repeated composition of transforms
//! would drift under floating point. `BigRational` gives GCD-normalized
//! fractions over arbitrary-precision integers, so composing many matrices
//! never overflows and never loses precision.

use num_bigint::BigInt;
pub use num_rational::BigRational as Rational;
use num_traits::{One, Signed, Zero};

/// Builds an exact rational from two `i64`s.
pub fn ratio(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Builds an exact integer-valued rational.
pub fn int(n: i64) -> Rational {
    Rational::from_integer(BigInt::from(n))
}

/// The additive identity, spelled out for readability at call sites.
pub fn zero() -> Rational {
    Rational::zero()
}

/// The multiplicative identity, spelled out for readability at call sites.
pub fn one() -> Rational {
    Rational::one()
}

/// Best-effort conversion to `f64`, used only where the spec allows
/// non-exact numeric output (cross-base `Scale` snapping, `Map`
/// evaluation).
pub fn to_f64(r: &Rational) -> f64 {
    // `Ratio::to_f64` isn't exposed without the `num-traits::ToPrimitive`
    // bound in scope; BigRational implements it.
    use num_traits::ToPrimitive;
    r.to_f64().unwrap_or_else(|| {
        // Only unrepresentable for values outside f64 range; fall back to
        // a manual division which at least saturates to +/-inf.
        let n = r.numer();
        let d = r.denom();
        n.to_f64().unwrap_or(f64::INFINITY) / d.to_f64().unwrap_or(1.0)
    })
}

/// Absolute value, for pivot-selection and sign-agnostic comparisons.
pub fn abs(r: &Rational) -> Rational {
    r.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_normalizes() {
        assert_eq!(ratio(2, 4), ratio(1, 2));
    }

    #[test]
    fn to_f64_roundtrips() {
        assert!((to_f64(&ratio(3, 2)) - 1.5).abs() < 1e-12);
    }
}
