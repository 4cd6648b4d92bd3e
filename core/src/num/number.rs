//! `Number` (§4.10): a quantity, a unit, and an optional uncertainty.
//!
//! The shape here is the specification's, not `original_source/ucon/core.py`'s
//! stale `Number(unit, scale, quantity)` — that file predates the
//! `UnitProduct`/`Scale` split and its `Ratio` companion type; `graph.py`'s
//! `Number` *usage* (convert via a `Map`, combine uncertainties in
//! quadrature) is what's actually reproduced below, grounded additionally on
//! `dgalbraith-fend`'s `UnitValue` arithmetic (`add`/`sub`/`div` each
//! resolving a conversion factor before combining).

use std::ops::{Add, Div, Mul, Sub};

use crate::error::{Error, Result};
use crate::graph::ConversionGraph;
use crate::num::rational;
use crate::num::unit::UnitProduct;

/// A physical quantity: a magnitude, its unit, and an optional absolute
/// uncertainty (same units as `quantity`).
#[derive(Debug, Clone)]
pub struct Number {
    quantity: f64,
    unit: UnitProduct,
    uncertainty: Option<f64>,
}

impl Number {
    pub fn new(quantity: f64, unit: UnitProduct, uncertainty: Option<f64>) -> Self {
        Self {
            quantity,
            unit,
            uncertainty,
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &UnitProduct {
        &self.unit
    }

    pub fn uncertainty(&self) -> Option<f64> {
        self.uncertainty
    }

    fn relative_uncertainty(&self) -> f64 {
        match self.uncertainty {
            Some(u) if self.quantity != 0.0 => (u / self.quantity).abs(),
            Some(u) => u.abs(),
            None => 0.0,
        }
    }

    /// Converts to `target_unit` along the path `graph` finds between
    /// `self.unit` and `target_unit` (§4.10).
    ///
    /// 1. resolves the conversion map,
    /// 2. applies it to `quantity`,
    /// 3. propagates uncertainty through the map's local derivative.
    pub fn to(&self, target_unit: &UnitProduct, graph: &ConversionGraph) -> Result<Number> {
        let map = graph.convert(&self.unit, target_unit)?;
        let new_quantity = map.apply(self.quantity)?;
        let new_uncertainty = match self.uncertainty {
            Some(u) => Some(map.derivative(self.quantity)?.abs() * u),
            None => None,
        };
        Ok(Number {
            quantity: new_quantity,
            unit: target_unit.clone(),
            uncertainty: new_uncertainty,
        })
    }

    /// Folds all scale prefixes into the quantity, replacing the unit with
    /// its base-scale equivalent (§4.10).
    pub fn simplify(&self) -> Number {
        let factor = self.unit.fold_scale();
        Number {
            quantity: self.quantity * factor,
            unit: self.unit.with_scale_one(),
            uncertainty: self.uncertainty.map(|u| u * factor),
        }
    }

    /// `UnitProduct::dimension()` has no `Basis` to build a `NONE` dimension
    /// from once every factor has cancelled (§4.7), so a genuinely
    /// dimensionless side is recognized via `is_dimensionless()` up front
    /// rather than routed through `dimension()` — this is what makes adding
    /// two bare-number `Number`s (both `UnitProduct::dimensionless()`) work
    /// at all, per spec.md's "dimensionless form uses the distinguished
    /// `none` unit".
    fn require_matching_dimension(&self, other: &Number) -> Result<()> {
        let self_dim = (!self.unit.is_dimensionless())
            .then(|| self.unit.dimension())
            .transpose()?;
        let other_dim = (!other.unit.is_dimensionless())
            .then(|| other.unit.dimension())
            .transpose()?;
        let matches = match (&self_dim, &other_dim) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !matches {
            let none_name = || "none".to_string();
            return Err(Error::DimensionMismatch {
                left: self_dim.map(|d| d.human_name()).unwrap_or_else(none_name),
                right: other_dim.map(|d| d.human_name()).unwrap_or_else(none_name),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Number, graph: &ConversionGraph) -> Result<Number> {
        self.require_matching_dimension(other)?;
        let converted = other.to(&self.unit, graph)?;
        let uncertainty = combine_quadrature_abs(self.uncertainty, converted.uncertainty);
        Ok(Number {
            quantity: self.quantity + converted.quantity,
            unit: self.unit.clone(),
            uncertainty,
        })
    }

    pub fn sub(&self, other: &Number, graph: &ConversionGraph) -> Result<Number> {
        self.require_matching_dimension(other)?;
        let converted = other.to(&self.unit, graph)?;
        let uncertainty = combine_quadrature_abs(self.uncertainty, converted.uncertainty);
        Ok(Number {
            quantity: self.quantity - converted.quantity,
            unit: self.unit.clone(),
            uncertainty,
        })
    }

    pub fn checked_mul(&self, other: &Number) -> Number {
        let quantity = self.quantity * other.quantity;
        let unit = self.unit.mul(&other.unit);
        let relative = combine_quadrature(
            self.relative_uncertainty(),
            other.relative_uncertainty(),
            self.uncertainty.is_some() || other.uncertainty.is_some(),
        );
        Number {
            quantity,
            unit,
            uncertainty: relative.map(|r| r * quantity.abs()),
        }
    }

    pub fn checked_div(&self, other: &Number) -> Result<Number> {
        if other.quantity == 0.0 {
            return Err(Error::InvalidInput("division by zero quantity".to_string()));
        }
        let quantity = self.quantity / other.quantity;
        let unit = self.unit.div(&other.unit);
        let relative = combine_quadrature(
            self.relative_uncertainty(),
            other.relative_uncertainty(),
            self.uncertainty.is_some() || other.uncertainty.is_some(),
        );
        Ok(Number {
            quantity,
            unit,
            uncertainty: relative.map(|r| r * quantity.abs()),
        })
    }

    pub fn powf(&self, k: f64) -> Number {
        let exponent = rational::ratio(
            (k * 1_000_000.0).round() as i64,
            1_000_000,
        );
        Number {
            quantity: self.quantity.powf(k),
            unit: self.unit.pow(&exponent),
            uncertainty: self
                .uncertainty
                .map(|_| self.relative_uncertainty() * k.abs() * self.quantity.abs().powf(k)),
        }
    }

    pub fn powi(&self, k: i32) -> Number {
        Number {
            quantity: self.quantity.powi(k),
            unit: self.unit.pow(&rational::int(k as i64)),
            uncertainty: self
                .uncertainty
                .map(|_| self.relative_uncertainty() * (k as f64).abs() * self.quantity.abs().powi(k)),
        }
    }
}

fn combine_quadrature_abs(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => {
            let a = a.unwrap_or(0.0);
            let b = b.unwrap_or(0.0);
            Some((a * a + b * b).sqrt())
        }
    }
}

fn combine_quadrature(a: f64, b: f64, any_present: bool) -> Option<f64> {
    if !any_present {
        return None;
    }
    Some((a * a + b * b).sqrt())
}

impl Mul<f64> for Number {
    type Output = Number;
    fn mul(self, scalar: f64) -> Number {
        Number {
            quantity: self.quantity * scalar,
            unit: self.unit,
            uncertainty: self.uncertainty.map(|u| u * scalar.abs()),
        }
    }
}

impl Div<f64> for Number {
    type Output = Number;
    fn div(self, scalar: f64) -> Number {
        Number {
            quantity: self.quantity / scalar,
            unit: self.unit,
            uncertainty: self.uncertainty.map(|u| u / scalar.abs()),
        }
    }
}

impl Mul for Number {
    type Output = Number;
    fn mul(self, other: Number) -> Number {
        self.checked_mul(&other)
    }
}

impl Add for Number {
    type Output = Result<Number>;
    fn add(self, other: Number) -> Result<Number> {
        let graph = ConversionGraph::new();
        self.add(&other, &graph)
    }
}

impl Sub for Number {
    type Output = Result<Number>;
    fn sub(self, other: Number) -> Result<Number> {
        let graph = ConversionGraph::new();
        self.sub(&other, &graph)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.quantity)?;
        if let Some(u) = self.uncertainty {
            write!(f, " +/- {u}")?;
        }
        if !self.unit.is_dimensionless() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisComponent, Vector};
    use crate::dimension::Dimension;
    use crate::num::map::Map;
    use crate::num::scale::Scale;
    use crate::num::unit::{Unit, UnitFactor};

    fn length_basis() -> Basis {
        Basis::new("test", vec![BasisComponent::new("length", Some("L"))]).unwrap()
    }

    fn meter(b: &Basis) -> UnitProduct {
        let v = Vector::new(b, vec![rational::int(1)]).unwrap();
        let unit = Unit::new("meter", vec!["m".to_string()], Dimension::named(v, "length", Some("L")));
        UnitProduct::single(UnitFactor::new(unit, Scale::ONE), rational::int(1))
    }

    fn foot(b: &Basis) -> UnitProduct {
        let v = Vector::new(b, vec![rational::int(1)]).unwrap();
        let unit = Unit::new("foot", vec!["ft".to_string()], Dimension::named(v, "length", Some("L")));
        UnitProduct::single(UnitFactor::new(unit, Scale::ONE), rational::int(1))
    }

    #[test]
    fn add_sums_quantities_in_same_unit_and_combines_uncertainty_in_quadrature() {
        let b = length_basis();
        let graph = ConversionGraph::new();
        let a = Number::new(2.0, meter(&b), Some(0.2));
        let c = Number::new(3.0, meter(&b), Some(0.3));
        let sum = a.add(&c, &graph).unwrap();
        assert_eq!(sum.quantity(), 5.0);
        assert!((sum.uncertainty().unwrap() - (0.2_f64.powi(2) + 0.3_f64.powi(2)).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sub_subtracts_quantities_in_same_unit() {
        let b = length_basis();
        let graph = ConversionGraph::new();
        let a = Number::new(5.0, meter(&b), None);
        let c = Number::new(2.0, meter(&b), None);
        let diff = a.sub(&c, &graph).unwrap();
        assert_eq!(diff.quantity(), 3.0);
        assert!(diff.uncertainty().is_none());
    }

    #[test]
    fn add_converts_right_operand_to_left_operands_unit_across_a_graph_edge() {
        let b = length_basis();
        let meter_product = meter(&b);
        let foot_product = foot(&b);
        let meter_unit = meter_product.factors()[0].0.unit().clone();
        let foot_unit = foot_product.factors()[0].0.unit().clone();

        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter_unit, &foot_unit, Map::linear(3.28084)).unwrap();

        let a = Number::new(1.0, meter_product, None);
        let c = Number::new(3.28084, foot_product, None);
        let sum = a.add(&c, &graph).unwrap();
        assert!((sum.quantity() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn add_of_two_dimensionless_numbers_succeeds() {
        let graph = ConversionGraph::new();
        let a = Number::new(42.0, UnitProduct::dimensionless(), None);
        let c = Number::new(8.0, UnitProduct::dimensionless(), None);
        let sum = a.add(&c, &graph).unwrap();
        assert_eq!(sum.quantity(), 50.0);
        assert!(sum.unit().is_dimensionless());
    }

    #[test]
    fn sub_of_two_dimensionless_numbers_succeeds() {
        let graph = ConversionGraph::new();
        let a = Number::new(10.0, UnitProduct::dimensionless(), None);
        let c = Number::new(4.0, UnitProduct::dimensionless(), None);
        let diff = a.sub(&c, &graph).unwrap();
        assert_eq!(diff.quantity(), 6.0);
    }

    #[test]
    fn add_rejects_dimensionless_against_a_real_dimension() {
        let b = length_basis();
        let graph = ConversionGraph::new();
        let a = Number::new(1.0, meter(&b), None);
        let c = Number::new(2.0, UnitProduct::dimensionless(), None);
        let err = a.add(&c, &graph).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn add_rejects_mismatched_real_dimensions() {
        let b = Basis::new(
            "test2",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("time", Some("T")),
            ],
        )
        .unwrap();
        let length_v = Vector::new(&b, vec![rational::int(1), rational::int(0)]).unwrap();
        let time_v = Vector::new(&b, vec![rational::int(0), rational::int(1)]).unwrap();
        let meter_unit = Unit::new("meter", vec!["m".to_string()], Dimension::named(length_v, "length", Some("L")));
        let second_unit = Unit::new("second", vec!["s".to_string()], Dimension::named(time_v, "time", Some("T")));
        let graph = ConversionGraph::new();
        let a = Number::new(1.0, UnitProduct::single(UnitFactor::new(meter_unit, Scale::ONE), rational::int(1)), None);
        let c = Number::new(1.0, UnitProduct::single(UnitFactor::new(second_unit, Scale::ONE), rational::int(1)), None);
        let err = a.add(&c, &graph).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn scalar_multiplication_scales_uncertainty() {
        let b = length_basis();
        let n = Number::new(2.0, meter(&b), Some(0.1));
        let scaled = n * 3.0;
        assert_eq!(scaled.quantity(), 6.0);
        assert!((scaled.uncertainty().unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn multiplication_combines_relative_uncertainty_in_quadrature() {
        let b = length_basis();
        let a = Number::new(2.0, meter(&b), Some(0.2)); // 10% relative
        let c = Number::new(3.0, meter(&b), Some(0.3)); // 10% relative
        let product = a.checked_mul(&c);
        assert_eq!(product.quantity(), 6.0);
        let expected_relative = (0.1_f64.powi(2) + 0.1_f64.powi(2)).sqrt();
        assert!((product.uncertainty().unwrap() - expected_relative * 6.0).abs() < 1e-9);
    }

    #[test]
    fn power_scales_relative_uncertainty_by_exponent() {
        let b = length_basis();
        let n = Number::new(2.0, meter(&b), Some(0.2)); // 10% relative
        let squared = n.powi(2);
        assert_eq!(squared.quantity(), 4.0);
        assert!((squared.uncertainty().unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn display_includes_unit_and_uncertainty() {
        let b = length_basis();
        let n = Number::new(5.0, meter(&b), Some(0.5));
        assert_eq!(n.to_string(), "5 +/- 0.5 meter");
    }

    #[test]
    fn display_omits_unit_when_dimensionless() {
        let n = Number::new(5.0, UnitProduct::dimensionless(), None);
        assert_eq!(n.to_string(), "5");
    }
}
