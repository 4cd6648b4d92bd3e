//! `ConversionGraph` (§4.9): per-dimension unit edges, composite product
//! edges, and rebased cross-basis edges, with BFS pathfinding and
//! factorwise decomposition.
//!
//! Grounded on `examples/original_source/ucon/graph.py`'s `ConversionGraph`:
//! `add_edge`'s five-step dispatch, `_add_unit_edge`/`_add_product_edge`'s
//! cyclic-consistency check, `_bfs_convert`/`_bfs_product_path`, and
//! `_convert_factorwise`'s effective-dimensional-vector grouping.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::basis_graph::BasisGraph;
use crate::dimension::Dimension;
use crate::error::{Error, Result};
use crate::num::map::Map;
use crate::num::rational::{self, Rational};
use crate::num::scale::Scale;
use crate::num::unit::{RebasedUnit, Unit, UnitFactor, UnitProduct};
use crate::parser::UnitLookup;

/// A unit name keyed within one dimension's edge partition.
type UnitKey = String;
type DimensionKey = String;

/// `(unit_name, dimension, scale_base, scale_power, exponent)` — a
/// canonicalized identity for one factor within a product key (§4.9).
type FactorKey = (String, String, i32, i32, Rational);
type ProductKey = Vec<FactorKey>;

fn product_key(product: &UnitProduct) -> ProductKey {
    let mut key: ProductKey = product
        .factors()
        .iter()
        .map(|(f, e)| {
            (
                f.unit().name().to_string(),
                f.unit().dimension().human_name(),
                f.scale().base(),
                f.scale().power(),
                e.clone(),
            )
        })
        .collect();
    key.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    key
}

fn dimension_key(dim: &Dimension) -> DimensionKey {
    dim.human_name()
}

#[derive(Debug, Default)]
pub struct ConversionGraph {
    /// `unit_edges[dimension][src][dst] = map`
    unit_edges: HashMap<DimensionKey, HashMap<UnitKey, HashMap<UnitKey, Map>>>,
    /// `product_edges[src_key][dst_key] = map`
    product_edges: HashMap<ProductKey, HashMap<ProductKey, Map>>,
    rebased: HashMap<UnitKey, RebasedUnit>,
    /// name -> (unit, dimension key), for case-sensitive-then-insensitive
    /// resolution (§4.9, mirroring `_name_registry`/`_name_registry_cs`).
    name_registry: HashMap<String, Unit>,
    name_registry_ci: HashMap<String, Unit>,
    basis_graph: Option<BasisGraph>,
    cyclic_consistency_tolerance: f64,
}

impl ConversionGraph {
    pub fn new() -> Self {
        Self {
            cyclic_consistency_tolerance: 1e-9,
            ..Self::default()
        }
    }

    pub fn with_basis_graph(mut self, basis_graph: BasisGraph) -> Self {
        self.basis_graph = Some(basis_graph);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.cyclic_consistency_tolerance = tolerance;
        self
    }

    pub fn register_unit(&mut self, unit: Unit) {
        self.name_registry.insert(unit.name().to_string(), unit.clone());
        self.name_registry_ci
            .insert(unit.name().to_lowercase(), unit.clone());
        for alias in unit.aliases() {
            self.name_registry.insert(alias.clone(), unit.clone());
            self.name_registry_ci.insert(alias.to_lowercase(), unit.clone());
        }
    }

    /// Case-sensitive lookup first, then case-insensitive (§4.9).
    pub fn resolve_unit(&self, name: &str) -> Result<Unit> {
        if let Some(u) = self.name_registry.get(name) {
            return Ok(u.clone());
        }
        if let Some(u) = self.name_registry_ci.get(&name.to_lowercase()) {
            return Ok(u.clone());
        }
        Err(Error::UnknownUnit { name: name.to_string() })
    }

    /// All distinct units known to the graph, optionally filtered to a
    /// single dimension's human name. Backs the `list_units(dimension?)`
    /// RPC surface (§6).
    pub fn registered_units(&self, dimension: Option<&str>) -> Vec<Unit> {
        let mut seen = HashSet::new();
        let mut units: Vec<Unit> = self
            .name_registry
            .values()
            .filter(|u| dimension.map_or(true, |d| u.dimension().human_name() == d))
            .filter(|u| seen.insert(u.name().to_string()))
            .cloned()
            .collect();
        units.sort_by(|a, b| a.name().cmp(b.name()));
        units
    }

    /// Resolves `name` to a `(unit, scale)` pair, trying an unprefixed
    /// match first and falling back to stripping a known SI/IEC prefix
    /// symbol off the front (§4.11). `"kg"` resolves as `(gram, kilo)`;
    /// `"kilogram"` itself is registered outright and resolves as
    /// `(kilogram, Scale::ONE)` without going through the stripping path.
    pub fn resolve_unit_with_scale(&self, name: &str) -> Result<(Unit, Scale)> {
        if let Ok(unit) = self.resolve_unit(name) {
            return Ok((unit, Scale::ONE));
        }
        if let Some((scale, remainder)) = Scale::strip_symbol_prefix(name) {
            if let Ok(unit) = self.resolve_unit(remainder) {
                return Ok((unit, scale));
            }
        }
        Err(Error::UnknownUnit { name: name.to_string() })
    }

    fn unit_edges_mut(&mut self, dimension: &Dimension) -> &mut HashMap<UnitKey, HashMap<UnitKey, Map>> {
        self.unit_edges.entry(dimension_key(dimension)).or_default()
    }

    /// Adds a conversion edge between two single units of the same
    /// dimension (§4.9 step 3/4).
    pub fn add_unit_edge(&mut self, src: &Unit, dst: &Unit, map: Map) -> Result<()> {
        if src.dimension() != dst.dimension() {
            return Err(Error::DimensionMismatch {
                left: src.dimension().human_name(),
                right: dst.dimension().human_name(),
            });
        }
        self.check_cyclic_consistency_unit(src.dimension(), src.name(), dst.name(), &map)?;
        let inverse = map.inverse()?;
        let dim = src.dimension().clone();
        let edges = self.unit_edges_mut(&dim);
        edges
            .entry(src.name().to_string())
            .or_default()
            .insert(dst.name().to_string(), map.clone());
        edges
            .entry(dst.name().to_string())
            .or_default()
            .insert(src.name().to_string(), inverse);
        self.register_unit(src.clone());
        self.register_unit(dst.clone());
        Ok(())
    }

    fn check_cyclic_consistency_unit(
        &self,
        dimension: &Dimension,
        src: &str,
        dst: &str,
        map: &Map,
    ) -> Result<()> {
        if let Some(existing) = self
            .unit_edges
            .get(&dimension_key(dimension))
            .and_then(|e| e.get(dst))
            .and_then(|e| e.get(src))
        {
            let round_trip = existing.compose(map);
            if !round_trip.is_identity(self.cyclic_consistency_tolerance) {
                return Err(Error::CyclicInconsistency {
                    src: src.to_string(),
                    dst: dst.to_string(),
                    deviation: (round_trip.apply(1.0).unwrap_or(f64::NAN) - 1.0).abs(),
                });
            }
        }
        Ok(())
    }

    /// Adds a conversion edge between two composite `UnitProduct`s (§4.9
    /// step 3/4).
    pub fn add_product_edge(&mut self, src: &UnitProduct, dst: &UnitProduct, map: Map) -> Result<()> {
        let src_key = product_key(src);
        let dst_key = product_key(dst);
        if let Some(existing) = self
            .product_edges
            .get(&dst_key)
            .and_then(|e| e.get(&src_key))
        {
            let round_trip = existing.compose(&map);
            if !round_trip.is_identity(self.cyclic_consistency_tolerance) {
                return Err(Error::CyclicInconsistency {
                    src: src.shorthand(),
                    dst: dst.shorthand(),
                    deviation: (round_trip.apply(1.0).unwrap_or(f64::NAN) - 1.0).abs(),
                });
            }
        }
        let inverse = map.inverse()?;
        self.product_edges
            .entry(src_key.clone())
            .or_default()
            .insert(dst_key.clone(), map);
        self.product_edges
            .entry(dst_key)
            .or_default()
            .insert(src_key, inverse);
        for (factor, _) in src.factors().iter().chain(dst.factors()) {
            self.register_unit(factor.unit().clone());
        }
        Ok(())
    }

    /// Registers `src` as reachable from `dst`'s dimension through
    /// `basis_transform`, creating a `RebasedUnit` edge (§4.9 step 2).
    pub fn add_cross_basis_edge(
        &mut self,
        src: &Unit,
        dst: &Unit,
        basis_transform: &crate::transform::BasisTransform,
        config: &crate::config::Config,
    ) -> Result<()> {
        let projected = basis_transform.apply(src.dimension().vector(), config)?;
        if &projected != dst.dimension().vector() {
            return Err(Error::NoTransformPath {
                from: src.dimension().human_name(),
                to: dst.dimension().human_name(),
            });
        }
        let rebased_dim = Dimension::derived(projected);
        let rebased = RebasedUnit::new(src.clone(), rebased_dim.clone());
        let rebased_name = rebased.edge_name();
        self.rebased.insert(rebased_name.clone(), rebased);

        let edges = self.unit_edges_mut(&rebased_dim);
        edges
            .entry(rebased_name.clone())
            .or_default()
            .insert(dst.name().to_string(), Map::linear(1.0));
        edges
            .entry(dst.name().to_string())
            .or_default()
            .insert(rebased_name, Map::linear(1.0));
        self.register_unit(dst.clone());
        Ok(())
    }

    /// Top-level dispatch (§4.9 "Converting").
    pub fn convert(&self, src: &UnitProduct, dst: &UnitProduct) -> Result<Map> {
        if src.factors().len() == 1 && dst.factors().len() == 1 {
            let (src_factor, src_exp) = &src.factors()[0];
            let (dst_factor, dst_exp) = &dst.factors()[0];
            if *src_exp == rational::one() && *dst_exp == rational::one() {
                return self.convert_units(src_factor, dst_factor);
            }
        }
        self.convert_products(src, dst)
    }

    fn convert_units(&self, src: &UnitFactor, dst: &UnitFactor) -> Result<Map> {
        if src.unit() == dst.unit() && src.scale() == dst.scale() {
            return Ok(Map::linear(1.0));
        }
        let scale_map = Map::linear(src.scale().evaluated() / dst.scale().evaluated());

        if src.unit().dimension() == dst.unit().dimension() {
            let unit_map = self.bfs_unit(src.unit().dimension(), src.unit().name(), dst.unit().name())?;
            return Ok(unit_map.compose(&scale_map));
        }

        // Rebased-path lookup: does src (or dst) have a rebased view whose
        // dimension matches the other side?
        for (name, rebased) in &self.rebased {
            if rebased.original().name() == src.unit().name()
                && rebased.rebased_dimension() == dst.unit().dimension()
            {
                let unit_map = self.bfs_unit(rebased.rebased_dimension(), name, dst.unit().name())?;
                return Ok(unit_map.compose(&scale_map));
            }
            if rebased.original().name() == dst.unit().name()
                && rebased.rebased_dimension() == src.unit().dimension()
            {
                let unit_map = self.bfs_unit(rebased.rebased_dimension(), src.unit().name(), name)?;
                return Ok(unit_map.compose(&scale_map));
            }
        }

        let connected = self.basis_graph.as_ref().is_some_and(|bg| {
            bg.has_path(
                src.unit().dimension().vector().basis(),
                dst.unit().dimension().vector().basis(),
            )
        });
        if connected {
            return Err(Error::NoTransformPath {
                from: src.unit().dimension().human_name(),
                to: dst.unit().dimension().human_name(),
            });
        }
        Err(Error::DimensionMismatch {
            left: src.unit().dimension().human_name(),
            right: dst.unit().dimension().human_name(),
        })
    }

    fn bfs_unit(&self, dimension: &Dimension, from: &str, to: &str) -> Result<Map> {
        if from == to {
            return Ok(Map::linear(1.0));
        }
        let edges = self
            .unit_edges
            .get(&dimension_key(dimension))
            .ok_or_else(|| Error::ConversionNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        if let Some(direct) = edges.get(from).and_then(|e| e.get(to)) {
            return Ok(direct.clone());
        }

        let mut visited = HashSet::new();
        visited.insert(from.to_string());
        let mut queue = VecDeque::new();
        queue.push_back((from.to_string(), Map::linear(1.0)));
        while let Some((node, acc)) = queue.pop_front() {
            if node == to {
                return Ok(acc);
            }
            if let Some(neighbors) = edges.get(&node) {
                for (next, edge_map) in neighbors {
                    if visited.insert(next.clone()) {
                        queue.push_back((next.clone(), edge_map.compose(&acc)));
                    }
                }
            }
        }
        Err(Error::ConversionNotFound {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    fn convert_products(&self, src: &UnitProduct, dst: &UnitProduct) -> Result<Map> {
        let src_key = product_key(src);
        let dst_key = product_key(dst);

        if let Some(direct) = self.product_edges.get(&src_key).and_then(|e| e.get(&dst_key)) {
            return Ok(direct.clone());
        }

        if let Some(path) = self.bfs_product_path(&src_key, &dst_key) {
            return Ok(path);
        }

        self.convert_factorwise(src, dst)
    }

    /// BFS over product edges, treating single-factor products as
    /// interchangeable with plain unit edges so a chain like gallon -> liter
    /// -> m^3 can be traversed (§4.9 "BFS over products").
    fn bfs_product_path(&self, from: &ProductKey, to: &ProductKey) -> Option<Map> {
        let mut visited = HashSet::new();
        visited.insert(from.clone());
        let mut queue = VecDeque::new();
        queue.push_back((from.clone(), Map::linear(1.0)));
        while let Some((node, acc)) = queue.pop_front() {
            if &node == to {
                return Some(acc);
            }
            if let Some(neighbors) = self.product_edges.get(&node) {
                for (next, edge_map) in neighbors {
                    if visited.insert(next.clone()) {
                        queue.push_back((next.clone(), edge_map.compose(&acc)));
                    }
                }
            }
        }
        None
    }

    /// Groups factors by effective dimensional vector and converts each
    /// group independently (§4.9 "Factorwise decomposition").
    fn convert_factorwise(&self, src: &UnitProduct, dst: &UnitProduct) -> Result<Map> {
        let src_groups = src.factors_by_dimension()?;
        let dst_groups = dst.factors_by_dimension()?;

        let src_keys: HashSet<_> = src_groups.keys().cloned().collect();
        let dst_keys: HashSet<_> = dst_groups.keys().cloned().collect();
        if src_keys != dst_keys {
            return Err(Error::ConversionNotFound {
                from: src.shorthand(),
                to: dst.shorthand(),
            });
        }

        let mut composite = Map::linear(1.0);
        for (key, (src_factor, src_exp)) in &src_groups {
            let (dst_factor, _dst_exp) = &dst_groups[key];
            if src_factor.unit().dimension().is_pseudo() != dst_factor.unit().dimension().is_pseudo() {
                return Err(Error::ConversionNotFound {
                    from: src_factor.unit().name().to_string(),
                    to: dst_factor.unit().name().to_string(),
                });
            }
            let unit_map = self.convert_units(src_factor, dst_factor)?;
            let exponentiated = unit_map.pow(rational::to_f64(src_exp))?;
            composite = exponentiated.compose(&composite);
        }
        Ok(composite)
    }
}

/// Lets a `ConversionGraph` drive the unit-expression parser directly:
/// `parse_unit_expression("kg*m/s^2", &graph)` resolves each identifier
/// through `resolve_unit_with_scale` (§4.11).
impl UnitLookup for ConversionGraph {
    fn lookup(&self, name: &str) -> Result<(Unit, Scale)> {
        self.resolve_unit_with_scale(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisComponent, Vector};
    use crate::dimension::Dimension;

    fn basis() -> Basis {
        Basis::new("test", vec![BasisComponent::new("length", Some("L"))]).unwrap()
    }

    fn unit(b: &Basis, name: &str) -> Unit {
        let v = Vector::new(b, vec![rational::int(1)]).unwrap();
        Unit::new(name, vec![], Dimension::named(v, "length", Some("L")))
    }

    #[test]
    fn direct_unit_edge_round_trips() {
        let b = basis();
        let meter = unit(&b, "meter");
        let foot = unit(&b, "foot");
        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter, &foot, Map::linear(3.28084)).unwrap();

        let src = UnitProduct::single(UnitFactor::new(meter.clone(), Scale::ONE), rational::int(1));
        let dst = UnitProduct::single(UnitFactor::new(foot.clone(), Scale::ONE), rational::int(1));
        let map = graph.convert(&src, &dst).unwrap();
        assert!((map.apply(1.0).unwrap() - 3.28084).abs() < 1e-9);
    }

    #[test]
    fn bfs_composes_multi_hop_unit_chain() {
        let b = basis();
        let meter = unit(&b, "meter");
        let foot = unit(&b, "foot");
        let inch = unit(&b, "inch");
        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter, &foot, Map::linear(3.28084)).unwrap();
        graph.add_unit_edge(&foot, &inch, Map::linear(12.0)).unwrap();

        let src = UnitProduct::single(UnitFactor::new(meter, Scale::ONE), rational::int(1));
        let dst = UnitProduct::single(UnitFactor::new(inch, Scale::ONE), rational::int(1));
        let map = graph.convert(&src, &dst).unwrap();
        assert!((map.apply(1.0).unwrap() - 3.28084 * 12.0).abs() < 1e-6);
    }

    #[test]
    fn cyclic_inconsistency_is_rejected() {
        let b = basis();
        let meter = unit(&b, "meter");
        let foot = unit(&b, "foot");
        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter, &foot, Map::linear(3.28084)).unwrap();
        // Re-adding with an inconsistent factor should fail the round-trip check.
        let err = graph.add_unit_edge(&meter, &foot, Map::linear(2.0));
        assert!(matches!(err, Err(Error::CyclicInconsistency { .. })));
    }

    #[test]
    fn mismatched_dimension_is_rejected() {
        let b = Basis::new(
            "test2",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("mass", Some("M")),
            ],
        )
        .unwrap();
        let length_v = Vector::new(&b, vec![rational::int(1), rational::int(0)]).unwrap();
        let mass_v = Vector::new(&b, vec![rational::int(0), rational::int(1)]).unwrap();
        let meter = Unit::new("meter", vec![], Dimension::named(length_v, "length", Some("L")));
        let kg = Unit::new("kg", vec![], Dimension::named(mass_v, "mass", Some("M")));
        let mut graph = ConversionGraph::new();
        assert!(graph.add_unit_edge(&meter, &kg, Map::linear(1.0)).is_err());
    }

    #[test]
    fn factorwise_decomposition_converts_each_group() {
        let b = Basis::new(
            "test3",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("time", Some("T")),
            ],
        )
        .unwrap();
        let length_v = Vector::new(&b, vec![rational::int(1), rational::int(0)]).unwrap();
        let time_v = Vector::new(&b, vec![rational::int(0), rational::int(1)]).unwrap();
        let meter = Unit::new("meter", vec![], Dimension::named(length_v.clone(), "length", Some("L")));
        let foot = Unit::new("foot", vec![], Dimension::named(length_v, "length", Some("L")));
        let second = Unit::new("second", vec![], Dimension::named(time_v.clone(), "time", Some("T")));
        let hour = Unit::new("hour", vec![], Dimension::named(time_v, "time", Some("T")));

        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter, &foot, Map::linear(3.28084)).unwrap();
        graph.add_unit_edge(&second, &hour, Map::linear(1.0 / 3600.0)).unwrap();

        let src = UnitProduct::single(UnitFactor::new(meter, Scale::ONE), rational::int(1))
            .div(&UnitProduct::single(UnitFactor::new(second, Scale::ONE), rational::int(1)));
        let dst = UnitProduct::single(UnitFactor::new(foot, Scale::ONE), rational::int(1))
            .div(&UnitProduct::single(UnitFactor::new(hour, Scale::ONE), rational::int(1)));
        let map = graph.convert(&src, &dst).unwrap();
        // 1 m/s = 3.28084 ft / (1/3600 h) = 3.28084*3600 ft/h
        assert!((map.apply(1.0).unwrap() - 3.28084 * 3600.0).abs() < 1e-3);
    }

    #[test]
    fn resolve_unit_with_scale_strips_known_prefix() {
        let b = basis();
        let meter = unit(&b, "meter");
        let mut graph = ConversionGraph::new();
        graph.register_unit(meter.clone());

        let (unit, scale) = graph.resolve_unit_with_scale("kmeter").unwrap();
        assert_eq!(unit, meter);
        assert_eq!(scale, Scale::by_name("kilo").unwrap());

        let (unit, scale) = graph.resolve_unit_with_scale("meter").unwrap();
        assert_eq!(unit, unit.clone());
        assert_eq!(scale, Scale::ONE);

        assert!(graph.resolve_unit_with_scale("xyzmeter").is_err());
    }

    #[test]
    fn unit_lookup_trait_delegates_to_resolve_unit_with_scale() {
        let b = basis();
        let meter = unit(&b, "meter");
        let mut graph = ConversionGraph::new();
        graph.register_unit(meter.clone());

        let (resolved, scale) = UnitLookup::lookup(&graph, "Mmeter").unwrap();
        assert_eq!(resolved, meter);
        assert_eq!(scale, Scale::by_name("mega").unwrap());
    }

    #[test]
    fn registered_units_filters_by_dimension_and_dedupes_aliases() {
        let b = basis();
        let meter = unit(&b, "meter");
        let foot = unit(&b, "foot");
        let mut graph = ConversionGraph::new();
        graph.add_unit_edge(&meter, &foot, Map::linear(3.28084)).unwrap();

        let all = graph.registered_units(None);
        assert_eq!(all.len(), 2);

        let length_only = graph.registered_units(Some(&meter.dimension().human_name()));
        assert_eq!(length_only.len(), 2);

        assert_eq!(graph.registered_units(Some("nonexistent")).len(), 0);
    }
}
