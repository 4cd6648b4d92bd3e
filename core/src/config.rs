//! Configuration knobs consumed by the core (§6).
//!
//! These are threaded explicitly into the calls that need them rather than
//! held as global mutable state, matching §9's "rather than global
//! singletons" guidance for the context-scope design.

/// Tunable behavior for scale snapping, transform projection, and
/// cyclic-consistency checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Bias applied by [`crate::num::scale::Scale::nearest`] toward the
    /// smaller-magnitude candidate when a cross-base quotient falls between
    /// two registered scales.
    pub undershoot_bias: f64,
    /// Whether [`crate::num::scale::Scale::nearest`] considers binary
    /// (base-2) prefixes in addition to decimal ones.
    pub include_binary: bool,
    /// Absolute tolerance used when verifying that a composed round-trip
    /// map is the identity (§5, §8 invariant 2).
    pub cyclic_consistency_tolerance: f64,
    /// Whether [`crate::transform::BasisTransform::apply`] silently zeroes
    /// projected-away components instead of raising
    /// [`crate::error::Error::LossyProjection`].
    pub allow_projection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            undershoot_bias: 0.75,
            include_binary: false,
            cyclic_consistency_tolerance: 1e-9,
            allow_projection: false,
        }
    }
}
