//! Basis & Vector algebra (§4.1).
//!
//! A [`Basis`] is an ordered, named set of independent dimension
//! generators. A [`Vector`] is a tuple of exact rational exponents tied to
//! one particular `Basis` instance. Grounded on
//! `examples/original_source/ucon/basis.py`'s `BasisComponent`/`Basis`/
//! `Vector` classes, the only place in the retrieval pack that models a
//! basis as a first-class coordinate system (`dgalbraith-fend` converts
//! directly through a flat base-unit hashmap and has no basis concept).

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::num::rational::{self, Rational};

/// A single generator of a [`Basis`]: a name and an optional short symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasisComponent {
    name: String,
    symbol: Option<String>,
}

impl BasisComponent {
    pub fn new(name: impl Into<String>, symbol: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.map(Into::into),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// The symbol if present, else the name — used when rendering compact
    /// transform tables (§4.2 "Rendering").
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug)]
struct BasisInner {
    name: String,
    components: Vec<BasisComponent>,
    /// Shared name/symbol -> index namespace (§4.1 "name and symbol
    /// namespaces share one index").
    index: HashMap<String, usize>,
}

/// An ordered, named coordinate system of independent dimensions.
///
/// Cheap to clone (an `Rc` handle). Two `Basis` values are the *same*
/// basis, for the purposes of vector/transform compatibility checks, iff
/// they share the same underlying allocation — matching how the standard
/// SI/CGS/CGS-ESU bases are constructed once (`standard.rs`) and shared by
/// reference everywhere else.
#[derive(Debug, Clone)]
pub struct Basis(Rc<BasisInner>);

impl Basis {
    /// Builds a basis from its ordered components. Raises an error if any
    /// component's name equals another component's name *or* symbol.
    pub fn new(
        name: impl Into<String>,
        components: impl IntoIterator<Item = BasisComponent>,
    ) -> Result<Self> {
        let components: Vec<BasisComponent> = components.into_iter().collect();
        let mut index = HashMap::with_capacity(components.len() * 2);
        for (i, c) in components.iter().enumerate() {
            for key in std::iter::once(c.name.clone()).chain(c.symbol.clone()) {
                if index.insert(key.clone(), i).is_some() {
                    return Err(Error::InvalidInput(format!(
                        "basis component name/symbol '{key}' is not unique within basis"
                    )));
                }
            }
        }
        Ok(Self(Rc::new(BasisInner {
            name: name.into(),
            components,
            index,
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn components(&self) -> &[BasisComponent] {
        &self.0.components
    }

    pub fn len(&self) -> usize {
        self.0.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.components.is_empty()
    }

    /// Resolves a component name or symbol to its index. Never coerces
    /// between name and symbol namespaces beyond the shared lookup table
    /// built at construction (§4.1 "Indexing").
    pub fn index(&self, key: &str) -> Result<usize> {
        self.0
            .index
            .get(key)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("no such basis component '{key}'")))
    }

    /// Identity comparison: true iff `self` and `other` are the same
    /// allocation (i.e. literally the same basis instance).
    pub fn is_same_basis(&self, other: &Basis) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Basis {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_basis(other)
    }
}
impl Eq for Basis {}

/// A tuple of exact rational exponents tied to one `Basis`.
#[derive(Debug, Clone)]
pub struct Vector {
    basis: Basis,
    components: Vec<Rational>,
}

/// What [`Vector::get`] accepts: an integer index, a component name, or a
/// component symbol — these never coerce into one another (§4.1).
pub enum VectorKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl Vector {
    pub fn zero(basis: &Basis) -> Self {
        Self {
            basis: basis.clone(),
            components: vec![rational::zero(); basis.len()],
        }
    }

    pub fn new(basis: &Basis, components: Vec<Rational>) -> Result<Self> {
        if components.len() != basis.len() {
            return Err(Error::InvalidInput(format!(
                "vector has {} components but basis '{}' has {}",
                components.len(),
                basis.name(),
                basis.len()
            )));
        }
        Ok(Self {
            basis: basis.clone(),
            components,
        })
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn components(&self) -> &[Rational] {
        &self.components
    }

    pub fn get(&self, key: VectorKey<'_>) -> Result<&Rational> {
        let i = match key {
            VectorKey::Index(i) => i,
            VectorKey::Name(name) => self.basis.index(name)?,
        };
        self.components
            .get(i)
            .ok_or_else(|| Error::InvalidInput(format!("vector index {i} out of range")))
    }

    fn require_same_basis(&self, other: &Vector) -> Result<()> {
        if !self.basis.is_same_basis(&other.basis) {
            return Err(Error::InvalidInput(format!(
                "vectors belong to different bases ('{}' vs '{}')",
                self.basis.name(),
                other.basis.name()
            )));
        }
        Ok(())
    }

    /// Componentwise addition of exponents (`a * b` in dimension algebra).
    pub fn mul(&self, other: &Vector) -> Result<Vector> {
        self.require_same_basis(other)?;
        let components = self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Vector {
            basis: self.basis.clone(),
            components,
        })
    }

    /// Componentwise subtraction of exponents (`a / b` in dimension algebra).
    pub fn div(&self, other: &Vector) -> Result<Vector> {
        self.require_same_basis(other)?;
        let components = self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Vector {
            basis: self.basis.clone(),
            components,
        })
    }

    /// Scalar multiplication of every exponent by `k` (`a ** k`).
    pub fn pow(&self, k: &Rational) -> Vector {
        Vector {
            basis: self.basis.clone(),
            components: self.components.iter().map(|c| c * k).collect(),
        }
    }

    pub fn neg(&self) -> Vector {
        Vector {
            basis: self.basis.clone(),
            components: self.components.iter().map(|c| -c).collect(),
        }
    }

    pub fn is_zero(&self) -> bool {
        use num_traits::Zero;
        self.components.iter().all(Rational::is_zero)
    }

    /// Alias for [`Vector::is_zero`], matching §4.1's naming.
    pub fn is_dimensionless(&self) -> bool {
        self.is_zero()
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.basis.is_same_basis(&other.basis) && self.components == other.components
    }
}
