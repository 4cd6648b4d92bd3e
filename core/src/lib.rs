//! `ucon-core`: a dimensional-analysis and unit-conversion engine.
//!
//! The crate is organized around four layers:
//!
//! - [`basis`]/[`basis_graph`]/[`transform`]: the vector-space machinery a
//!   basis (SI, CGS, ...) and the transforms between bases are built on.
//! - [`dimension`]: named/derived/pseudo dimensions resolved against a
//!   basis.
//! - [`num`]: the numeric layer — exact-rational [`num::scale::Scale`]
//!   prefixes, [`num::unit::Unit`]/[`num::unit::UnitProduct`] monomials,
//!   [`num::map::Map`] conversion functions, and [`num::number::Number`]
//!   quantities with uncertainty propagation.
//! - [`graph`]: [`graph::ConversionGraph`] ties units, products, and
//!   cross-basis edges together with BFS pathfinding.
//!
//! [`parser`] turns text into a [`num::number::Number`] against any
//! [`parser::UnitLookup`] (a [`graph::ConversionGraph`] implements it
//! directly). [`scope`] holds the thread-local active basis/graphs so
//! callers don't have to thread them through every call; [`standard`]
//! builds the SI-rooted defaults those scopes start from.

pub mod basis;
pub mod basis_graph;
pub mod config;
pub mod dimension;
pub mod error;
pub mod graph;
pub mod num;
pub mod parser;
pub mod scope;
pub mod standard;
pub mod transform;

pub use basis::{Basis, BasisComponent, Vector};
pub use basis_graph::BasisGraph;
pub use config::Config;
pub use dimension::{Dimension, DimensionRegistry, PseudoTag};
pub use error::{Error, Result};
pub use graph::ConversionGraph;
pub use num::map::Map;
pub use num::number::Number;
pub use num::rational::Rational;
pub use num::scale::Scale;
pub use num::unit::{Unit, UnitFactor, UnitProduct};
pub use parser::{parse_quantity, parse_unit_expression, UnitLookup};
pub use transform::{BasisTransform, ConstantAwareBasisTransform, ConstantBinding};

pub use scope::{
    current_basis, current_basis_graph, current_conversion_graph, using_basis, using_basis_graph,
    using_conversion_graph,
};

/// Parses `input` against the current scope's conversion graph
/// ([`scope::current_conversion_graph`]), the entry point most callers
/// reach for first.
pub fn parse(input: &str) -> Result<Number> {
    let graph = current_conversion_graph();
    parse_quantity(input, graph.as_ref())
}

/// Parses and converts `input` to `target_unit`, read against the
/// current scope (§6a: the shape the CLI's quantity-conversion REPL
/// command and the wasm `convert` binding both build on).
pub fn convert(input: &str, target_unit: &str) -> Result<Number> {
    let graph = current_conversion_graph();
    let quantity = parse_quantity(input, graph.as_ref())?;
    let target = parse_unit_expression(target_unit, graph.as_ref())?;
    quantity.to(&target, graph.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolves_against_current_scope() {
        let n = parse("5 meter").unwrap();
        assert_eq!(n.quantity(), 5.0);
    }

    #[test]
    fn convert_round_trips_through_standard_graph() {
        let n = convert("1 meter", "foot").unwrap();
        assert!((n.quantity() - 3.28084).abs() < 1e-3);
    }

    #[test]
    fn convert_accepts_prefixed_unit_names() {
        let n = convert("1000 meter", "kmeter").unwrap();
        assert!((n.quantity() - 1.0).abs() < 1e-9);
    }
}
