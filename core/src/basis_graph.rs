//! `BasisGraph` (§4.4): a directed graph of bases connected by transforms,
//! with BFS path composition and caching.
//!
//! Grounded on `examples/original_source/ucon/basis.py`'s `BasisGraph`
//! class (`add_transform`, `add_transform_pair`, the BFS-then-compose
//! `get_transform`, `reachable_from`).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::basis::Basis;
use crate::error::{Error, Result};
use crate::transform::BasisTransform;

/// Keyed by basis name since `Basis` itself isn't `Eq`/`Hash` beyond
/// pointer identity; the graph is expected to hold one canonical `Basis`
/// value per name (see `standard.rs`).
type BasisKey = String;

#[derive(Debug, Default)]
pub struct BasisGraph {
    bases: HashMap<BasisKey, Basis>,
    /// adjacency[source][target] = transform
    adjacency: HashMap<BasisKey, HashMap<BasisKey, BasisTransform>>,
    cache: RefCell<HashMap<(BasisKey, BasisKey), BasisTransform>>,
}

impl BasisGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn register_basis(&mut self, basis: &Basis) {
        self.bases
            .entry(basis.name().to_string())
            .or_insert_with(|| basis.clone());
    }

    /// Stores `transform` as a directed edge. Does **not** register the
    /// inverse edge.
    pub fn add_transform(&mut self, transform: BasisTransform) {
        self.register_basis(transform.source());
        self.register_basis(transform.target());
        self.adjacency
            .entry(transform.source().name().to_string())
            .or_default()
            .insert(transform.target().name().to_string(), transform);
        self.cache.borrow_mut().clear();
    }

    /// Stores both `forward` and `reverse` as directed edges.
    pub fn add_transform_pair(&mut self, forward: BasisTransform, reverse: BasisTransform) {
        self.add_transform(forward);
        self.add_transform(reverse);
    }

    /// Returns the transform from basis `a` to basis `b`, composing a BFS
    /// shortest edge path if there is no direct edge, and caching the
    /// result.
    pub fn get_transform(&self, a: &Basis, b: &Basis) -> Result<BasisTransform> {
        if a.is_same_basis(b) {
            return Ok(BasisTransform::identity(a));
        }
        let key = (a.name().to_string(), b.name().to_string());
        if let Some(cached) = self.cache.borrow().get(&key) {
            log::trace!("basis graph cache hit for {} -> {}", a.name(), b.name());
            return Ok(cached.clone());
        }

        let path = self.bfs_edges(a.name(), b.name())?;
        // Compose left-to-right: path[0] is a->x1, path[1] is x1->x2, ...
        // f @ g means f(g(x)); to go a->x1->x2->b we want edge2 @ edge1,
        // i.e. fold with the later edge as `f` and the running composite
        // as `g`.
        let mut iter = path.into_iter();
        let mut composed = iter.next().expect("bfs_edges returns a non-empty path");
        for edge in iter {
            composed = edge.compose(&composed)?;
        }
        self.cache.borrow_mut().insert(key, composed.clone());
        Ok(composed)
    }

    fn bfs_edges(&self, from: &str, to: &str) -> Result<Vec<BasisTransform>> {
        let mut visited = HashSet::new();
        visited.insert(from.to_string());
        let mut queue = VecDeque::new();
        queue.push_back((from.to_string(), Vec::<BasisTransform>::new()));

        while let Some((node, path)) = queue.pop_front() {
            if node == to {
                return Ok(path);
            }
            if let Some(edges) = self.adjacency.get(&node) {
                for (target, transform) in edges {
                    if visited.insert(target.clone()) {
                        let mut next_path = path.clone();
                        next_path.push(transform.clone());
                        queue.push_back((target.clone(), next_path));
                    }
                }
            }
        }

        Err(Error::NoTransformPath {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// The transitive closure of forward edges reachable from `a`.
    pub fn reachable_from(&self, a: &Basis) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(a.name().to_string());
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node.clone()) {
                continue;
            }
            if let Some(edges) = self.adjacency.get(&node) {
                for target in edges.keys() {
                    queue.push_back(target.clone());
                }
            }
        }
        visited
    }

    pub fn has_path(&self, a: &Basis, b: &Basis) -> bool {
        if a.is_same_basis(b) {
            return true;
        }
        self.bfs_edges(a.name(), b.name()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisComponent;
    use crate::config::Config;
    use crate::num::rational;

    fn basis(name: &str) -> Basis {
        Basis::new(name, vec![BasisComponent::new("x", Some("x"))]).unwrap()
    }

    #[test]
    fn bfs_composes_multi_hop_path() {
        let a = basis("A");
        let b = basis("B");
        let c = basis("C");
        let mut graph = BasisGraph::new();
        let ab = BasisTransform::new(a.clone(), b.clone(), vec![vec![rational::int(2)]]).unwrap();
        let bc = BasisTransform::new(b.clone(), c.clone(), vec![vec![rational::int(3)]]).unwrap();
        graph.add_transform(ab);
        graph.add_transform(bc);

        let ac = graph.get_transform(&a, &c).unwrap();
        let v = crate::basis::Vector::new(&a, vec![rational::int(1)]).unwrap();
        let out = ac.apply(&v, &Config::default()).unwrap();
        assert_eq!(out.components()[0], rational::int(6));
    }

    #[test]
    fn no_path_is_distinct_error() {
        let a = basis("A");
        let b = basis("B");
        let graph = BasisGraph::new();
        assert!(matches!(
            graph.get_transform(&a, &b),
            Err(Error::NoTransformPath { .. })
        ));
    }

    #[test]
    fn same_basis_is_identity() {
        let a = basis("A");
        let graph = BasisGraph::new();
        let t = graph.get_transform(&a, &a).unwrap();
        assert!(t.is_identity(1e-9));
    }
}
