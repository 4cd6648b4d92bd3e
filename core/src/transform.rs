//! `BasisTransform` and `ConstantAwareBasisTransform` (§4.2, §4.3).
//!
//! Grounded on `examples/original_source/ucon/basis.py`'s `BasisTransform`/
//! `ConstantBinding`/`ConstantAwareBasisTransform` classes: the Gauss-Jordan
//! inversion routine, the clean-projection embedding check, and the
//! constant-binding non-square inverse construction are all ported
//! algorithm-for-algorithm, re-expressed over exact `BigRational` matrices.

use crate::basis::{Basis, Vector};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::num::rational::{self, Rational};

/// A rational matrix mapping `source`-basis vectors to `target`-basis
/// vectors. `matrix[i][j]` is the coefficient of source component `i` in
/// target component `j` (rows = source, cols = target, per §3's data
/// model).
#[derive(Debug, Clone)]
pub struct BasisTransform {
    source: Basis,
    target: Basis,
    matrix: Vec<Vec<Rational>>,
}

impl BasisTransform {
    pub fn new(source: Basis, target: Basis, matrix: Vec<Vec<Rational>>) -> Result<Self> {
        if matrix.len() != source.len() {
            return Err(Error::InvalidInput(format!(
                "transform matrix has {} rows but source basis '{}' has {} components",
                matrix.len(),
                source.name(),
                source.len()
            )));
        }
        for row in &matrix {
            if row.len() != target.len() {
                return Err(Error::InvalidInput(format!(
                    "transform matrix row has {} columns but target basis '{}' has {} components",
                    row.len(),
                    target.name(),
                    target.len()
                )));
            }
        }
        Ok(Self {
            source,
            target,
            matrix,
        })
    }

    pub fn source(&self) -> &Basis {
        &self.source
    }

    pub fn target(&self) -> &Basis {
        &self.target
    }

    pub fn matrix(&self) -> &[Vec<Rational>] {
        &self.matrix
    }

    pub fn identity(basis: &Basis) -> Self {
        let n = basis.len();
        let mut matrix = vec![vec![rational::zero(); n]; n];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = rational::one();
        }
        Self {
            source: basis.clone(),
            target: basis.clone(),
            matrix,
        }
    }

    /// Applies the transform to a source-basis vector, yielding a
    /// target-basis vector. Row `i` entirely zero while `v[i] != 0` is a
    /// lossy projection unless `config.allow_projection`.
    pub fn apply(&self, v: &Vector, config: &Config) -> Result<Vector> {
        if !v.basis().is_same_basis(&self.source) {
            return Err(Error::InvalidInput(format!(
                "vector basis '{}' does not match transform source basis '{}'",
                v.basis().name(),
                self.source.name()
            )));
        }
        if !config.allow_projection {
            for (i, row) in self.matrix.iter().enumerate() {
                let row_is_zero = row.iter().all(|c| c == &rational::zero());
                if row_is_zero && v.components()[i] != rational::zero() {
                    return Err(Error::LossyProjection {
                        component: self.source.components()[i].name().to_string(),
                        source_basis: self.source.name().to_string(),
                        target_basis: self.target.name().to_string(),
                    });
                }
            }
        }
        let n = self.target.len();
        let mut out = vec![rational::zero(); n];
        for (j, slot) in out.iter_mut().enumerate() {
            let mut acc = rational::zero();
            for (i, vi) in v.components().iter().enumerate() {
                acc = acc + vi * &self.matrix[i][j];
            }
            *slot = acc;
        }
        Vector::new(&self.target, out)
    }

    /// Exact Gauss-Jordan inversion of a square matrix with partial
    /// pivoting. Requires `source.len() == target.len()`.
    pub fn inverse(&self) -> Result<Self> {
        let n = self.source.len();
        if n != self.target.len() {
            return Err(Error::NonInvertibleTransform {
                reason: format!(
                    "matrix is {}x{}, not square",
                    self.source.len(),
                    self.target.len()
                ),
            });
        }
        // Augmented matrix [A | I].
        let mut aug: Vec<Vec<Rational>> = (0..n)
            .map(|i| {
                let mut row = self.matrix[i].clone();
                row.resize(2 * n, rational::zero());
                row[n + i] = rational::one();
                row
            })
            .collect();

        for col in 0..n {
            let pivot_row = (col..n)
                .filter(|&r| aug[r][col] != rational::zero())
                .max_by(|&a, &b| rational::abs(&aug[a][col]).cmp(&rational::abs(&aug[b][col])))
                .ok_or_else(|| Error::NonInvertibleTransform {
                    reason: format!("singular pivot in column {col}"),
                })?;
            aug.swap(col, pivot_row);

            let pivot = aug[col][col].clone();
            for v in aug[col].iter_mut() {
                *v = &*v / &pivot;
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = aug[r][col].clone();
                if factor == rational::zero() {
                    continue;
                }
                for c in 0..2 * n {
                    let adj = &aug[col][c] * &factor;
                    aug[r][c] = &aug[r][c] - &adj;
                }
            }
        }

        let inv_matrix: Vec<Vec<Rational>> = aug
            .into_iter()
            .map(|row| row[n..2 * n].to_vec())
            .collect();

        BasisTransform::new(self.target.clone(), self.source.clone(), inv_matrix)
    }

    /// Target→source embedding, valid only when each source row has at
    /// most one nonzero entry and that entry is exactly 1 (a "clean
    /// projection").
    pub fn embedding(&self) -> Result<Self> {
        let m = self.source.len();
        let n = self.target.len();
        let mut inv_matrix = vec![vec![rational::zero(); m]; n];
        for (i, row) in self.matrix.iter().enumerate() {
            let nonzero: Vec<(usize, &Rational)> = row
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != rational::zero())
                .collect();
            match nonzero.as_slice() {
                [] => { /* dropped dimension: embedding column stays zero */ }
                [(j, coeff)] if **coeff == rational::one() => {
                    inv_matrix[*j][i] = rational::one();
                }
                _ => {
                    return Err(Error::NonInvertibleTransform {
                        reason: format!(
                            "row {i} ('{}') is not a clean projection",
                            self.source.components()[i].name()
                        ),
                    });
                }
            }
        }
        BasisTransform::new(self.target.clone(), self.source.clone(), inv_matrix)
    }

    /// `f.compose(g)` where `f == self`, producing `g.source -> f.target`
    /// with `(f @ g)(x) == f(g(x))`. Requires `g.target == f.source`.
    pub fn compose(&self, g: &BasisTransform) -> Result<BasisTransform> {
        if !g.target.is_same_basis(&self.source) {
            return Err(Error::InvalidInput(format!(
                "cannot compose: g.target '{}' != f.source '{}'",
                g.target.name(),
                self.source.name()
            )));
        }
        let rows = g.source.len();
        let cols = self.target.len();
        let inner = self.source.len();
        let mut matrix = vec![vec![rational::zero(); cols]; rows];
        for (i, row) in matrix.iter_mut().enumerate() {
            for (j, slot) in row.iter_mut().enumerate() {
                let mut acc = rational::zero();
                for k in 0..inner {
                    acc = acc + &g.matrix[i][k] * &self.matrix[k][j];
                }
                *slot = acc;
            }
        }
        BasisTransform::new(g.source.clone(), self.target.clone(), matrix)
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        if !self.source.is_same_basis(&self.target) {
            return false;
        }
        for (i, row) in self.matrix.iter().enumerate() {
            for (j, c) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                if (rational::to_f64(c) - expected).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

impl std::fmt::Display for BasisTransform {
    /// Header row of target symbols, then per source component the symbol
    /// plus each coefficient right-aligned; zero prints as a dot (§4.2
    /// "Rendering").
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "     ")?;
        for c in self.target.components() {
            write!(f, "{:>8}", c.display_symbol())?;
        }
        writeln!(f)?;
        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "{:>4} ", self.source.components()[i].display_symbol())?;
            for c in row {
                if *c == rational::zero() {
                    write!(f, "{:>8}", ".")?;
                } else {
                    write!(f, "{:>8}", c.to_string())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Associates a source component with a target expression via an opaque
/// physical-constant symbol, enabling inversion of non-square transforms
/// (§4.3). The constant symbol is never evaluated numerically.
#[derive(Debug, Clone)]
pub struct ConstantBinding {
    pub source_component: String,
    pub target_expression: Vector,
    pub constant_symbol: String,
    pub exponent: Rational,
}

/// A [`BasisTransform`] extended with [`ConstantBinding`]s, enabling
/// inversion even when the forward matrix is non-square.
#[derive(Debug, Clone)]
pub struct ConstantAwareBasisTransform {
    inner: BasisTransform,
    bindings: Vec<ConstantBinding>,
}

impl ConstantAwareBasisTransform {
    pub fn new(inner: BasisTransform, bindings: Vec<ConstantBinding>) -> Self {
        Self { inner, bindings }
    }

    pub fn apply(&self, v: &Vector, config: &Config) -> Result<Vector> {
        self.inner.apply(v, config)
    }

    pub fn source(&self) -> &Basis {
        self.inner.source()
    }

    pub fn target(&self) -> &Basis {
        self.inner.target()
    }

    /// Inverts a (possibly non-square) transform using the recorded
    /// constant bindings to fill in rows that have no clean `(1,0,...,0)`
    /// column in the forward matrix.
    pub fn inverse(&self) -> Result<ConstantAwareBasisTransform> {
        let n_source = self.inner.source().len();
        let n_target = self.inner.target().len();
        let mut inv_matrix = vec![vec![rational::zero(); n_source]; n_target];

        let mut bound_sources = std::collections::HashSet::new();
        for binding in &self.bindings {
            let s = self.inner.source().index(&binding.source_component)?;
            bound_sources.insert(s);
            for (j, coeff) in binding.target_expression.components().iter().enumerate() {
                if *coeff != rational::zero() {
                    inv_matrix[j][s] = rational::one() / coeff;
                }
            }
        }

        for (i, row) in self.inner.matrix().iter().enumerate() {
            if bound_sources.contains(&i) {
                continue;
            }
            let nonzero: Vec<(usize, &Rational)> = row
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != rational::zero())
                .collect();
            if let [(j, coeff)] = nonzero.as_slice() {
                if **coeff != rational::zero() {
                    inv_matrix[*j][i] = rational::one() / *coeff;
                }
            }
            // Entirely-zero rows (dropped dimensions) and unbound
            // non-clean rows remain dropped columns, per §4.3.
        }

        let inverse_bindings = self
            .bindings
            .iter()
            .map(|b| -> Result<ConstantBinding> {
                let (primary_j, _) = b
                    .target_expression
                    .components()
                    .iter()
                    .enumerate()
                    .find(|(_, c)| **c != rational::zero())
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "constant binding for '{}' has an all-zero target expression",
                            b.source_component
                        ))
                    })?;
                let primary_name = self.inner.target().components()[primary_j]
                    .name()
                    .to_string();
                let s = self.inner.source().index(&b.source_component)?;
                let mut components = vec![rational::zero(); self.inner.source().len()];
                components[s] = rational::one();
                let back = Vector::new(self.inner.source(), components)?;
                Ok(ConstantBinding {
                    source_component: primary_name,
                    target_expression: back,
                    constant_symbol: b.constant_symbol.clone(),
                    exponent: -b.exponent.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let inner = BasisTransform::new(
            self.inner.target().clone(),
            self.inner.source().clone(),
            inv_matrix,
        )?;
        Ok(ConstantAwareBasisTransform::new(inner, inverse_bindings))
    }

    pub fn bindings(&self) -> &[ConstantBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisComponent;

    fn si_basis() -> Basis {
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

    #[test]
    fn identity_round_trips() {
        let basis = si_basis();
        let t = BasisTransform::identity(&basis);
        let v = Vector::new(
            &basis,
            vec![rational::int(1), rational::int(2), rational::int(-3)],
        )
        .unwrap();
        let applied = t.apply(&v, &Config::default()).unwrap();
        assert_eq!(applied.components(), v.components());
    }

    #[test]
    fn inverse_of_permutation_is_transpose() {
        let basis = si_basis();
        // Swap length and mass.
        let matrix = vec![
            vec![rational::zero(), rational::one(), rational::zero()],
            vec![rational::one(), rational::zero(), rational::zero()],
            vec![rational::zero(), rational::zero(), rational::one()],
        ];
        let t = BasisTransform::new(basis.clone(), basis.clone(), matrix.clone()).unwrap();
        let inv = t.inverse().unwrap();
        // Transpose of a permutation matrix equals its inverse.
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(inv.matrix()[i][j], matrix[j][i]);
            }
        }
    }

    #[test]
    fn lossy_projection_without_permission() {
        let source = si_basis();
        let target = Basis::new(
            "reduced",
            vec![BasisComponent::new("length", Some("L"))],
        )
        .unwrap();
        let matrix = vec![
            vec![rational::one()],
            vec![rational::zero()],
            vec![rational::zero()],
        ];
        let t = BasisTransform::new(source.clone(), target, matrix).unwrap();
        let v = Vector::new(
            &source,
            vec![rational::int(0), rational::int(1), rational::int(0)],
        )
        .unwrap();
        let result = t.apply(&v, &Config::default());
        assert!(matches!(result, Err(Error::LossyProjection { .. })));

        let allowed = Config {
            allow_projection: true,
            ..Config::default()
        };
        assert!(t.apply(&v, &allowed).is_ok());
    }

    #[test]
    fn compose_matches_matrix_product() {
        let basis = si_basis();
        let scale2 = BasisTransform::new(
            basis.clone(),
            basis.clone(),
            vec![
                vec![rational::int(2), rational::zero(), rational::zero()],
                vec![rational::zero(), rational::one(), rational::zero()],
                vec![rational::zero(), rational::zero(), rational::one()],
            ],
        )
        .unwrap();
        let scale3 = BasisTransform::new(
            basis.clone(),
            basis.clone(),
            vec![
                vec![rational::int(3), rational::zero(), rational::zero()],
                vec![rational::zero(), rational::one(), rational::zero()],
                vec![rational::zero(), rational::zero(), rational::one()],
            ],
        )
        .unwrap();
        // (scale2 @ scale3)(v) == scale2(scale3(v))
        let composed = scale2.compose(&scale3).unwrap();
        let v = Vector::new(
            &basis,
            vec![rational::one(), rational::zero(), rational::zero()],
        )
        .unwrap();
        let direct = scale2
            .apply(&scale3.apply(&v, &Config::default()).unwrap(), &Config::default())
            .unwrap();
        let via_compose = composed.apply(&v, &Config::default()).unwrap();
        assert_eq!(direct.components(), via_compose.components());
    }
}
