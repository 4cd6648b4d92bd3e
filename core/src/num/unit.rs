//! `Unit`, `UnitFactor`, and `UnitProduct` (§4.7): the atomic and composite
//! unit algebra.
//!
//! Grounded on `dgalbraith-fend`'s `num/unit.rs` for the exponent-map
//! accumulation idiom (`Unit::into_hashmap_and_scale`'s fold-and-cancel
//! loop), generalized from fend's flat base-unit hashmap to the
//! `Dimension`-aware `UnitFactor` this crate's basis/dimension layer
//! requires. The dimension-algebra-driven multiplication comes from
//! `examples/original_source/ucon/unit.py`.

use std::collections::HashMap;
use std::fmt;

use crate::dimension::Dimension;
use crate::error::{Error, Result};
use crate::num::number::Number;
use crate::num::rational::{self, Rational};
use crate::num::scale::Scale;

/// A named atomic unit: a canonical name, ordered aliases, and a dimension.
///
/// Equality and hashing use `(name, dimension)` (§4.7) — two units with the
/// same name but different dimensions are distinct (this never happens in
/// the standard catalog, but custom units defined in different scopes could
/// otherwise collide).
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    aliases: Vec<String>,
    dimension: Dimension,
}

impl Unit {
    pub fn new(name: impl Into<String>, aliases: Vec<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            aliases,
            dimension,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first alias, if any — this unit's preferred shorthand (§4.7).
    pub fn shorthand(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or(&self.name)
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Constructs `Number(quantity, self)` — the "callable unit" form
    /// (§4.7's Rust realization note).
    pub fn call(&self, quantity: f64) -> Number {
        Number::new(
            quantity,
            UnitProduct::single(UnitFactor::new(self.clone(), Scale::ONE), rational::one()),
            None,
        )
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.dimension == other.dimension
    }
}
impl Eq for Unit {}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shorthand())
    }
}

/// A `(Unit, Scale)` pair — e.g. `kilo` + `meter` for `km` (§4.6, §4.7).
#[derive(Debug, Clone)]
pub struct UnitFactor {
    unit: Unit,
    scale: Scale,
}

impl UnitFactor {
    pub fn new(unit: Unit, scale: Scale) -> Self {
        Self { unit, scale }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// A stable key for grouping identical factors in a `UnitProduct`'s
    /// exponent map — name-and-scale identity, not dimension (two factors
    /// with the same name/scale always share a dimension by construction).
    fn key(&self) -> (String, i32, i32) {
        (self.unit.name.clone(), self.scale.base(), self.scale.power())
    }
}

impl fmt::Display for UnitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scale, self.unit)
    }
}

/// A monomial of `UnitFactor`s with rational exponents, canonicalized so
/// that no stored entry has a zero exponent (§4.7).
#[derive(Debug, Clone, Default)]
pub struct UnitProduct {
    /// Keyed by `UnitFactor::key()`; the factor itself travels alongside its
    /// exponent since the key alone doesn't carry the full `Unit`.
    factors: Vec<(UnitFactor, Rational)>,
}

impl UnitProduct {
    pub fn dimensionless() -> Self {
        Self { factors: Vec::new() }
    }

    pub fn single(factor: UnitFactor, exponent: Rational) -> Self {
        let mut product = Self::dimensionless();
        product.insert(factor, exponent);
        product
    }

    pub fn factors(&self) -> &[(UnitFactor, Rational)] {
        &self.factors
    }

    fn insert(&mut self, factor: UnitFactor, exponent: Rational) {
        if exponent == rational::zero() {
            return;
        }
        let key = factor.key();
        if let Some(slot) = self.factors.iter_mut().find(|(f, _)| f.key() == key) {
            slot.1 = &slot.1 + &exponent;
            if slot.1 == rational::zero() {
                self.factors.retain(|(f, _)| f.key() != key);
            }
            return;
        }
        self.factors.push((factor, exponent));
    }

    pub fn mul(&self, other: &UnitProduct) -> UnitProduct {
        let mut result = self.clone();
        for (factor, exponent) in &other.factors {
            result.insert(factor.clone(), exponent.clone());
        }
        result
    }

    pub fn div(&self, other: &UnitProduct) -> UnitProduct {
        let mut result = self.clone();
        for (factor, exponent) in &other.factors {
            result.insert(factor.clone(), -exponent);
        }
        result
    }

    pub fn pow(&self, k: &Rational) -> UnitProduct {
        UnitProduct {
            factors: self
                .factors
                .iter()
                .map(|(f, e)| (f.clone(), e * k))
                .collect(),
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    /// The product's overall dimension: `Π (factor.unit.dimension ** exponent)`
    /// reduced in dimension algebra (§4.7).
    ///
    /// Errors when `factors` is empty: a cancelled-out or never-populated
    /// product retains no `Basis` to build `Dimension::none()` from. Callers
    /// that may legitimately hold a dimensionless product (everything
    /// cancelled, or a bare-number quantity) must check
    /// [`Self::is_dimensionless`] first rather than treat this as the NONE
    /// dimension — see `Number::require_matching_dimension`.
    pub fn dimension(&self) -> Result<Dimension> {
        let Some((first, _)) = self.factors.first() else {
            return Err(Error::InvalidInput(
                "dimensionless UnitProduct has no basis to derive a NONE dimension from"
                    .to_string(),
            ));
        };
        let basis = first.unit.dimension.vector().basis().clone();
        let mut acc = Dimension::none(&basis);
        for (factor, exponent) in &self.factors {
            let term = factor.unit.dimension.pow(exponent);
            acc = acc.mul(&term)?;
        }
        Ok(acc)
    }

    /// The net numeric scale factor across all factors:
    /// `Π scale.evaluated() ** exponent` (§4.7).
    pub fn fold_scale(&self) -> f64 {
        self.factors
            .iter()
            .map(|(f, e)| f.scale.evaluated().powf(rational::to_f64(e)))
            .product()
    }

    /// Groups factors by their effective dimensional vector
    /// (`dim.vector ** exponent`), for factorwise conversion (§4.9). Raises
    /// if two distinct factors land on the same effective vector.
    pub fn factors_by_dimension(&self) -> Result<HashMap<Vec<Rational>, (UnitFactor, Rational)>> {
        let mut grouped = HashMap::new();
        for (factor, exponent) in &self.factors {
            let effective = factor.unit.dimension.vector().pow(exponent);
            let key = effective.components().to_vec();
            if grouped
                .insert(key, (factor.clone(), exponent.clone()))
                .is_some()
            {
                return Err(Error::InvalidInput(format!(
                    "ambiguous unit product: multiple factors share the dimension of '{}'",
                    factor.unit.name()
                )));
            }
        }
        Ok(grouped)
    }

    /// Constructs `Number(quantity, self)` — the "callable product" form
    /// (§4.7's Rust realization note).
    pub fn call(&self, quantity: f64) -> Number {
        Number::new(quantity, self.clone(), None)
    }

    /// The same factors with every `Scale` reset to `Scale::ONE` — used by
    /// `Number::simplify` to fold prefixes into the quantity (§4.10).
    pub fn with_scale_one(&self) -> UnitProduct {
        UnitProduct {
            factors: self
                .factors
                .iter()
                .map(|(f, e)| (UnitFactor::new(f.unit.clone(), Scale::ONE), e.clone()))
                .collect(),
        }
    }

    /// A human-readable rendering, e.g. `kg·m/s²` (§4.7 "shorthand").
    pub fn shorthand(&self) -> String {
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        for (factor, exponent) in &self.factors {
            let magnitude = rational::abs(exponent);
            let part = if magnitude == rational::one() {
                factor.to_string()
            } else {
                format!("{factor}^{magnitude}")
            };
            if *exponent > rational::zero() {
                numerator.push(part);
            } else {
                denominator.push(part);
            }
        }
        let numer_str = if numerator.is_empty() {
            "1".to_string()
        } else {
            numerator.join("·")
        };
        if denominator.is_empty() {
            numer_str
        } else {
            format!("{numer_str}/{}", denominator.join("·"))
        }
    }
}

impl fmt::Display for UnitProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shorthand())
    }
}

/// A unit accessed through a cross-basis transform: `original`'s dimension
/// lives in the source basis, but this wrapper carries the projected
/// dimension in the target basis so the conversion graph can key an edge on
/// it (§4.9 "rebased units").
#[derive(Debug, Clone)]
pub struct RebasedUnit {
    original: Unit,
    rebased_dimension: Dimension,
}

impl RebasedUnit {
    pub fn new(original: Unit, rebased_dimension: Dimension) -> Self {
        Self {
            original,
            rebased_dimension,
        }
    }

    pub fn original(&self) -> &Unit {
        &self.original
    }

    pub fn rebased_dimension(&self) -> &Dimension {
        &self.rebased_dimension
    }

    /// The synthetic name this rebased view is registered under in the
    /// conversion graph's edge tables (`"<original>@<basis>"`).
    pub fn edge_name(&self) -> String {
        format!(
            "{}@{}",
            self.original.name(),
            self.rebased_dimension.vector().basis().name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisComponent, Vector};

    fn basis() -> Basis {
        Basis::new(
            "test",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("time", Some("T")),
            ],
        )
        .unwrap()
    }

    fn length_unit(b: &Basis) -> Unit {
        let v = Vector::new(b, vec![rational::int(1), rational::int(0)]).unwrap();
        Unit::new("meter", vec!["m".to_string()], Dimension::named(v, "length", Some("L")))
    }

    fn time_unit(b: &Basis) -> Unit {
        let v = Vector::new(b, vec![rational::int(0), rational::int(1)]).unwrap();
        Unit::new("second", vec!["s".to_string()], Dimension::named(v, "time", Some("T")))
    }

    #[test]
    fn product_cancels_zero_exponents() {
        let b = basis();
        let meter = UnitFactor::new(length_unit(&b), Scale::ONE);
        let product = UnitProduct::single(meter.clone(), rational::int(1));
        let cancelled = product.div(&UnitProduct::single(meter, rational::int(1)));
        assert!(cancelled.is_dimensionless());
    }

    #[test]
    fn dimension_multiplies_factor_dimensions() {
        let b = basis();
        let meter = UnitFactor::new(length_unit(&b), Scale::ONE);
        let second = UnitFactor::new(time_unit(&b), Scale::ONE);
        let speed = UnitProduct::single(meter, rational::int(1))
            .div(&UnitProduct::single(second, rational::int(1)));
        let dim = speed.dimension().unwrap();
        assert_eq!(
            dim.vector().components(),
            &[rational::int(1), rational::int(-1)]
        );
    }

    #[test]
    fn shorthand_separates_numerator_and_denominator() {
        let b = basis();
        let meter = UnitFactor::new(length_unit(&b), Scale::ONE);
        let second = UnitFactor::new(time_unit(&b), Scale::ONE);
        let speed = UnitProduct::single(meter, rational::int(1))
            .div(&UnitProduct::single(second, rational::int(2)));
        assert_eq!(speed.shorthand(), "m/s^2");
    }

    #[test]
    fn ambiguous_factors_reject_factorwise_grouping() {
        let b = basis();
        let meter = UnitFactor::new(length_unit(&b), Scale::ONE);
        let foot = UnitFactor::new(
            Unit::new("foot", vec!["ft".to_string()], length_unit(&b).dimension().clone()),
            Scale::ONE,
        );
        let product = UnitProduct::single(meter, rational::int(1))
            .mul(&UnitProduct::single(foot, rational::int(1)));
        assert!(product.factors_by_dimension().is_err());
    }
}
