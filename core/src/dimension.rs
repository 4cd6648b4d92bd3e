//! `Dimension` (§4.5): a vector plus optional name/symbol, with the four
//! pseudo-dimension tags layered on top.
//!
//! Grounded on `examples/original_source/ucon/dimension.py`, the canonical
//! reference for the registry's `resolve()` rule, the pseudo-dimension
//! algebra, and the ~40 standard dimension constants (reproduced in
//! `standard.rs`). The SI-basis 8th-component resolution (`information`,
//! not `angle`, as the 8th real basis component) is recorded in
//! SPEC_FULL.md §9.

use std::collections::HashMap;

use crate::basis::{Basis, Vector};
use crate::error::{Error, Result};
use crate::num::rational::{self, Rational};

/// The four dimensionless-but-semantically-distinct tags (§4.5 rule 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoTag {
    Angle,
    SolidAngle,
    Ratio,
    Count,
}

impl PseudoTag {
    pub fn name(self) -> &'static str {
        match self {
            PseudoTag::Angle => "angle",
            PseudoTag::SolidAngle => "solid_angle",
            PseudoTag::Ratio => "ratio",
            PseudoTag::Count => "count",
        }
    }
}

/// An immutable `(Vector, optional name/symbol, optional pseudo-tag)`
/// triple (§3's data model row for `Dimension`).
#[derive(Debug, Clone)]
pub struct Dimension {
    vector: Vector,
    name: Option<String>,
    symbol: Option<String>,
    tag: Option<PseudoTag>,
}

impl Dimension {
    /// Pseudo ⇔ tag is set ⇔ the vector must be zero (§3: "pseudo ⇔ tag ≠
    /// null ⇔ vector is zero but identity is tag-based").
    pub fn new(
        vector: Vector,
        name: Option<String>,
        symbol: Option<String>,
        tag: Option<PseudoTag>,
    ) -> Result<Self> {
        if tag.is_some() && !vector.is_zero() {
            return Err(Error::InvalidInput(
                "a pseudo-dimension's vector must be zero".to_string(),
            ));
        }
        Ok(Self {
            vector,
            name,
            symbol,
            tag,
        })
    }

    /// The distinguished dimensionless, non-pseudo identity dimension.
    pub fn none(basis: &Basis) -> Self {
        Self {
            vector: Vector::zero(basis),
            name: Some("none".to_string()),
            symbol: Some("1".to_string()),
            tag: None,
        }
    }

    pub fn pseudo(tag: PseudoTag, basis: &Basis, name: &str, symbol: &str) -> Self {
        Self {
            vector: Vector::zero(basis),
            name: Some(name.to_string()),
            symbol: Some(symbol.to_string()),
            tag: Some(tag),
        }
    }

    /// A regular named dimension with a nonzero (or zero-but-non-pseudo)
    /// vector, e.g. `length`, `force`.
    pub fn named(vector: Vector, name: &str, symbol: Option<&str>) -> Self {
        Self {
            vector,
            name: Some(name.to_string()),
            symbol: symbol.map(str::to_string),
            tag: None,
        }
    }

    /// An unregistered, unnamed dimension whose name is derived on the fly
    /// from its vector (§4.5 "derived dimension").
    pub fn derived(vector: Vector) -> Self {
        let name = derived_name(&vector);
        Self {
            vector,
            name: Some(name),
            symbol: None,
            tag: None,
        }
    }

    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    pub fn tag(&self) -> Option<PseudoTag> {
        self.tag
    }

    pub fn is_pseudo(&self) -> bool {
        self.tag.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.tag.is_none() && self.vector.is_zero()
    }

    pub fn raw_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A human-readable name for error messages: the registered/derived
    /// name, or the pseudo tag's name when the dimension is a pseudo.
    pub fn human_name(&self) -> String {
        if let Some(tag) = self.tag {
            tag.name().to_string()
        } else {
            self.name
                .clone()
                .unwrap_or_else(|| derived_name(&self.vector))
        }
    }

    fn require_compatible_pseudo(&self, other: &Dimension) -> Result<()> {
        if let (Some(a), Some(b)) = (self.tag, other.tag) {
            if a != b {
                return Err(Error::DimensionMismatch {
                    left: self.human_name(),
                    right: other.human_name(),
                });
            }
        }
        Ok(())
    }

    /// Dimension multiplication (§4.5 rules 1-2).
    pub fn mul(&self, other: &Dimension) -> Result<Dimension> {
        self.require_compatible_pseudo(other)?;
        match (self.tag, other.tag) {
            (Some(_), Some(_)) => Ok(self.clone()), // same tag, idempotent
            (Some(_), None) => {
                if other.is_none() {
                    Ok(self.clone())
                } else {
                    Ok(other.clone())
                }
            }
            (None, Some(_)) => other.mul(self),
            (None, None) => {
                let v = self.vector.mul(&other.vector)?;
                Ok(Dimension::derived(v))
            }
        }
    }

    /// Dimension division (§4.5 rules 1-2).
    pub fn div(&self, other: &Dimension) -> Result<Dimension> {
        self.require_compatible_pseudo(other)?;
        match (self.tag, other.tag) {
            (Some(_), Some(_)) => Ok(Dimension::none(self.vector.basis())),
            (Some(_), None) => {
                if other.is_none() {
                    Ok(self.clone())
                } else {
                    // Pseudo / non-pseudo-non-NONE: the pseudo contributes
                    // the zero vector, so the result is the non-pseudo's
                    // inverse dimension.
                    let zero = Vector::zero(other.vector.basis());
                    Ok(Dimension::derived(zero.div(&other.vector)?))
                }
            }
            (None, Some(_)) => {
                // Dividing any non-pseudo (NONE included) by a pseudo drops
                // the pseudo's zero-vector contribution; the non-pseudo side
                // passes through unchanged, matching `dimension.py`'s
                // `if other.is_pseudo: return self`.
                Ok(self.clone())
            }
            (None, None) => {
                let v = self.vector.div(&other.vector)?;
                Ok(Dimension::derived(v))
            }
        }
    }

    /// Dimension exponentiation. Pseudo-dimensions are unchanged by any
    /// nonzero power and collapse to `NONE` at power zero (§4.5 rule 2:
    /// "Exponentiating a pseudo by any nonzero power yields the pseudo
    /// unchanged").
    pub fn pow(&self, k: &Rational) -> Dimension {
        if let Some(_tag) = self.tag {
            if *k == rational::zero() {
                return Dimension::none(self.vector.basis());
            }
            return self.clone();
        }
        Dimension::derived(self.vector.pow(k))
    }
}

impl PartialEq for Dimension {
    /// "Equality: if either side is pseudo, compare by tag AND vector;
    /// derived dimensions compare equal on vectors alone" (§3, §4.5 rule
    /// 3).
    fn eq(&self, other: &Self) -> bool {
        if self.tag.is_some() || other.tag.is_some() {
            self.tag == other.tag && self.vector == other.vector
        } else {
            self.vector == other.vector
        }
    }
}

/// Encodes `vector` in numerator/denominator form, exponent-1 implicit
/// (§4.5, §9 "Derived-dimension naming").
fn derived_name(vector: &Vector) -> String {
    let basis = vector.basis();
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (component, exponent) in basis.components().iter().zip(vector.components()) {
        if *exponent == rational::zero() {
            continue;
        }
        let magnitude = rational::abs(exponent);
        let part = if magnitude == rational::one() {
            component.name().to_string()
        } else {
            format!("{}^{}", component.name(), magnitude)
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
        numerator.join("*")
    };
    if denominator.is_empty() {
        format!("derived({numer_str})")
    } else {
        format!("derived({numer_str}/{})", denominator.join("*"))
    }
}

/// The named registry mapping `(basis, vector)` to a canonical
/// `Dimension` (§4.5).
#[derive(Debug, Default)]
pub struct DimensionRegistry {
    by_vector: HashMap<(String, Vec<Rational>), Dimension>,
    by_name: HashMap<String, Dimension>,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, dim: Dimension) {
        let key = (
            dim.vector.basis().name().to_string(),
            dim.vector.components().to_vec(),
        );
        if let Some(name) = dim.raw_name() {
            self.by_name.insert(name.to_string(), dim.clone());
        }
        self.by_vector.insert(key, dim);
    }

    /// Resolves a vector to its canonical registered dimension, or
    /// synthesizes a derived one.
    pub fn resolve(&self, vector: &Vector) -> Dimension {
        let key = (
            vector.basis().name().to_string(),
            vector.components().to_vec(),
        );
        if let Some(d) = self.by_vector.get(&key) {
            return d.clone();
        }
        if vector.is_zero() {
            return Dimension::none(vector.basis());
        }
        Dimension::derived(vector.clone())
    }

    pub fn by_name(&self, name: &str) -> Result<Dimension> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDimension {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisComponent;

    fn basis() -> Basis {
        Basis::new(
            "SI",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("mass", Some("M")),
                BasisComponent::new("time", Some("T")),
            ],
        )
        .unwrap()
    }

    fn length(b: &Basis) -> Dimension {
        let v = Vector::new(
            b,
            vec![rational::int(1), rational::int(0), rational::int(0)],
        )
        .unwrap();
        Dimension::named(v, "length", Some("L"))
    }

    #[test]
    fn none_is_identity_for_mul_and_div() {
        let b = basis();
        let length = length(&b);
        let none = Dimension::none(&b);
        assert_eq!(length.mul(&none).unwrap(), length);
        assert_eq!(length.div(&length).unwrap(), none);
    }

    #[test]
    fn pseudo_algebra() {
        let b = basis();
        let angle = Dimension::pseudo(PseudoTag::Angle, &b, "angle", "rad");
        let ratio = Dimension::pseudo(PseudoTag::Ratio, &b, "ratio", "");
        let length = length(&b);
        let none = Dimension::none(&b);

        assert_eq!(angle.mul(&length).unwrap(), length);
        assert_eq!(angle.pow(&rational::int(2)), angle);
        assert_eq!(angle.div(&angle).unwrap(), none);
        assert_ne!(angle, none);
        assert_ne!(angle, ratio);
        assert!(angle.mul(&ratio).is_err());
    }

    #[test]
    fn derived_naming_matches_numerator_denominator_form() {
        let b = basis();
        let force = Vector::new(
            &b,
            vec![rational::int(1), rational::int(1), rational::int(-2)],
        )
        .unwrap();
        let dim = Dimension::derived(force);
        assert_eq!(dim.human_name(), "derived(length*mass/time^2)");
    }

    #[test]
    fn registry_resolves_registered_and_derived() {
        let b = basis();
        let mut registry = DimensionRegistry::new();
        let length_dim = length(&b);
        registry.register(length_dim.clone());

        let resolved = registry.resolve(length_dim.vector());
        assert_eq!(resolved.human_name(), "length");

        let mass = Vector::new(
            &b,
            vec![rational::int(0), rational::int(1), rational::int(0)],
        )
        .unwrap();
        let derived = registry.resolve(&mass);
        assert_eq!(derived.human_name(), "derived(mass)");
    }
}
