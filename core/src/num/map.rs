//! The `Map` hierarchy (§4.8): linear, affine, logarithmic, exponential, and
//! composed conversion maps.
//!
//! Grounded on `examples/original_source/ucon/maps.py`'s `Map` class
//! hierarchy and composition-dispatch table. `LogMap`/`ExpMap` add a
//! `reference` parameter the original does not have; SPEC_FULL.md §4.8
//! records the derivation of `ExpMap`'s inverse formula under that
//! addition.

use crate::error::{Error, Result};

/// A closed-form or composed unit-to-unit conversion function (§4.8).
#[derive(Debug, Clone, PartialEq)]
pub enum Map {
    Linear(LinearMap),
    Affine(AffineMap),
    Log(LogMap),
    Exp(ExpMap),
    Composed(Box<ComposedMap>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogMap {
    pub scale: f64,
    pub base: f64,
    pub offset: f64,
    pub reference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpMap {
    pub scale: f64,
    pub base: f64,
    pub offset: f64,
    pub reference: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMap {
    pub outer: Map,
    pub inner: Map,
}

impl LogMap {
    pub fn new(scale: f64, base: f64, offset: f64, reference: f64) -> Self {
        Self {
            scale,
            base,
            offset,
            reference,
        }
    }
}

impl ExpMap {
    pub fn new(scale: f64, base: f64, offset: f64, reference: f64) -> Self {
        Self {
            scale,
            base,
            offset,
            reference,
        }
    }
}

impl Map {
    pub fn linear(a: f64) -> Map {
        Map::Linear(LinearMap { a })
    }

    pub fn affine(a: f64, b: f64) -> Map {
        Map::Affine(AffineMap { a, b })
    }

    pub fn log(scale: f64, base: f64, offset: f64, reference: f64) -> Map {
        Map::Log(LogMap::new(scale, base, offset, reference))
    }

    pub fn exp(scale: f64, base: f64, offset: f64, reference: f64) -> Map {
        Map::Exp(ExpMap::new(scale, base, offset, reference))
    }

    pub fn apply(&self, x: f64) -> Result<f64> {
        match self {
            Map::Linear(m) => Ok(m.a * x),
            Map::Affine(m) => Ok(m.a * x + m.b),
            Map::Log(m) => {
                if x <= 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: format!("LogMap applied to non-positive value {x}"),
                    });
                }
                Ok(m.scale * (x / m.reference).log(m.base) + m.offset)
            }
            Map::Exp(m) => Ok(m.reference * m.base.powf(m.scale * x + m.offset)),
            Map::Composed(c) => c.outer.apply(c.inner.apply(x)?),
        }
    }

    /// Returns the inverse `Map`.
    pub fn inverse(&self) -> Result<Map> {
        match self {
            Map::Linear(m) => {
                if m.a == 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: "LinearMap with a=0 has no inverse".to_string(),
                    });
                }
                Ok(Map::linear(1.0 / m.a))
            }
            Map::Affine(m) => {
                if m.a == 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: "AffineMap with a=0 has no inverse".to_string(),
                    });
                }
                // y = ax + b => x = y/a - b/a
                Ok(Map::affine(1.0 / m.a, -m.b / m.a))
            }
            // x = reference * base^((y-offset)/scale)
            //   = reference * base^((1/scale)*y - offset/scale)
            // matching ExpMap{scale: 1/scale, offset: -offset/scale}.
            Map::Log(m) => {
                if m.scale == 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: "LogMap with scale=0 has no inverse".to_string(),
                    });
                }
                Ok(Map::exp(1.0 / m.scale, m.base, -m.offset / m.scale, m.reference))
            }
            Map::Exp(m) => {
                if m.scale == 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: "ExpMap with scale=0 has no inverse".to_string(),
                    });
                }
                Ok(Map::log(1.0 / m.scale, m.base, -m.offset / m.scale, m.reference))
            }
            Map::Composed(c) => Ok(Map::Composed(Box::new(ComposedMap {
                outer: c.inner.inverse()?,
                inner: c.outer.inverse()?,
            }))),
        }
    }

    /// `self @ g`, i.e. `self(g(x))`. Closes within `Linear`/`Affine` where
    /// possible; falls back to `Composed` otherwise (§4.8).
    pub fn compose(&self, g: &Map) -> Map {
        match (self, g) {
            (Map::Linear(f), Map::Linear(h)) => Map::linear(f.a * h.a),
            (Map::Linear(f), Map::Affine(h)) => Map::affine(f.a * h.a, f.a * h.b),
            (Map::Affine(f), Map::Linear(h)) => Map::affine(f.a * h.a, f.b),
            (Map::Affine(f), Map::Affine(h)) => Map::affine(f.a * h.a, f.a * h.b + f.b),
            _ => Map::Composed(Box::new(ComposedMap {
                outer: self.clone(),
                inner: g.clone(),
            })),
        }
    }

    /// `self ** k` for `k ∈ {1, -1}`; `LinearMap` additionally supports any
    /// exponent (§4.8).
    pub fn pow(&self, k: f64) -> Result<Map> {
        if k == 1.0 {
            return Ok(self.clone());
        }
        if k == -1.0 {
            return self.inverse();
        }
        match self {
            Map::Linear(m) => Ok(Map::linear(m.a.powf(k))),
            _ => Err(Error::NonInvertibleTransform {
                reason: format!("only LinearMap supports exponent {k}; others support only ±1"),
            }),
        }
    }

    pub fn derivative(&self, x: f64) -> Result<f64> {
        match self {
            Map::Linear(m) => Ok(m.a),
            Map::Affine(m) => Ok(m.a),
            Map::Log(m) => {
                if x <= 0.0 {
                    return Err(Error::NonInvertibleTransform {
                        reason: format!("LogMap derivative undefined at non-positive x={x}"),
                    });
                }
                Ok(m.scale / (x * m.base.ln()))
            }
            Map::Exp(m) => {
                let y = self.apply(x)?;
                Ok(m.base.ln() * m.scale * y)
            }
            Map::Composed(c) => {
                let inner_val = c.inner.apply(x)?;
                Ok(c.outer.derivative(inner_val)? * c.inner.derivative(x)?)
            }
        }
    }

    /// `|f(1)-1| < tolerance && |f(0)| < tolerance` — always `false` for
    /// `Log`/`Exp` since they are never the identity (§4.8).
    pub fn is_identity(&self, tolerance: f64) -> bool {
        match self {
            Map::Log(_) | Map::Exp(_) => false,
            _ => {
                let at_one = self.apply(1.0);
                let at_zero = self.apply(0.0);
                match (at_one, at_zero) {
                    (Ok(one), Ok(zero)) => (one - 1.0).abs() < tolerance && zero.abs() < tolerance,
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_inverse_round_trips() {
        let m = Map::linear(2.0);
        let inv = m.inverse().unwrap();
        assert!((inv.apply(m.apply(5.0).unwrap()).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn affine_inverse_round_trips() {
        let m = Map::affine(5.0 / 9.0, -(5.0 / 9.0) * 32.0); // F -> C
        let inv = m.inverse().unwrap();
        assert!((inv.apply(m.apply(98.6).unwrap()).unwrap() - 98.6).abs() < 1e-9);
    }

    #[test]
    fn log_exp_round_trip_with_reference() {
        // dBm: 10*log10(W/0.001) + 0
        let to_dbm = Map::log(10.0, 10.0, 0.0, 0.001);
        let dbm = to_dbm.apply(1.0).unwrap(); // 1 W = 30 dBm
        assert!((dbm - 30.0).abs() < 1e-9);
        let back = to_dbm.inverse().unwrap();
        assert!((back.apply(dbm).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn composed_derivative_uses_chain_rule() {
        let f = Map::linear(3.0);
        let g = Map::affine(2.0, 1.0);
        let composed = f.compose(&g);
        // f(g(x)) = 3*(2x+1) = 6x+3, closes as Affine, derivative 6 everywhere.
        assert!((composed.derivative(10.0).unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn log_is_never_identity() {
        let m = Map::log(1.0, 10.0, 0.0, 1.0);
        assert!(!m.is_identity(1e-6));
    }

    #[test]
    fn compose_matches_apply_composition_for_fallback_case() {
        let log_map = Map::log(1.0, 10.0, 0.0, 1.0);
        let lin = Map::linear(2.0);
        let composed = log_map.compose(&lin);
        let expected = log_map.apply(lin.apply(4.0).unwrap()).unwrap();
        assert!((composed.apply(4.0).unwrap() - expected).abs() < 1e-12);
    }
}
