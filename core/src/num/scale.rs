//! `Scale` (§4.6): a decimal- or binary-base numeric prefix.
//!
//! Grounded on `examples/original_source/ucon/core.py`'s `Exponent`/`Scale`
//! enum, in particular `Scale.__truediv__`'s cross-base snap-to-nearest
//! algorithm, which `Scale::nearest` below reproduces.
//!
//! The symbol tables and [`Scale::strip_symbol_prefix`] have no original
//! source counterpart: `ucon/graph.py`'s `resolve_unit` and
//! `ucon/parsing.py`'s host-supplied `lookup_fn` both skip straight to a
//! name-table lookup with no prefix stripping. §4.11 asks for prefixed
//! names like `"kg"` to resolve, so the stripping is a fresh addition
//! layered on top of the existing full-name tables.

use crate::error::{Error, Result};

/// SI decimal prefixes, `yocto` (10⁻²⁴) through `yotta` (10²⁴).
const DECIMAL: &[(&str, i32)] = &[
    ("yocto", -24),
    ("zepto", -21),
    ("atto", -18),
    ("femto", -15),
    ("pico", -12),
    ("nano", -9),
    ("micro", -6),
    ("milli", -3),
    ("centi", -2),
    ("deci", -1),
    ("one", 0),
    ("deca", 1),
    ("hecto", 2),
    ("kilo", 3),
    ("mega", 6),
    ("giga", 9),
    ("tera", 12),
    ("peta", 15),
    ("exa", 18),
    ("zetta", 21),
    ("yotta", 24),
];

/// IEC binary prefixes, `kibi` (2¹⁰) through `yobi` (2⁸⁰).
const BINARY: &[(&str, i32)] = &[
    ("kibi", 10),
    ("mebi", 20),
    ("gibi", 30),
    ("tebi", 40),
    ("pebi", 50),
    ("exbi", 60),
    ("zebi", 70),
    ("yobi", 80),
];

/// Single/double-letter SI symbols for the decimal table, longest-match
/// order (`"da"` before `"d"`) so [`Scale::strip_symbol_prefix`] doesn't
/// mistake `"da"`'s `d` for `deci`'s. `"u"` is the ASCII fallback for
/// `micro`'s `µ`, matching the lexer's acceptance of `µ` in identifiers
/// without forcing every caller to type it (§4.11 supplement).
const DECIMAL_SYMBOLS: &[(&str, i32)] = &[
    ("da", 1),
    ("y", -24),
    ("z", -21),
    ("a", -18),
    ("f", -15),
    ("p", -12),
    ("n", -9),
    ("u", -6),
    ("\u{b5}", -6),
    ("m", -3),
    ("c", -2),
    ("d", -1),
    ("h", 2),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
    ("Z", 21),
    ("Y", 24),
];

/// IEC binary symbols, `"Ki"` through `"Yi"` (§4.11 supplement).
const BINARY_SYMBOLS: &[(&str, i32)] = &[
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
    ("Zi", 70),
    ("Yi", 80),
];

/// The bias the original applies when a cross-base quotient falls between
/// two registered members: slightly favors the candidate at or below the
/// target, so that float drift on `kilo * kilo` rounds down to `mega`
/// rather than overshooting past it.
pub const DEFAULT_UNDERSHOOT_BIAS: f64 = 0.75;

/// A `(base, power)` numeric prefix. `base` is always 2 or 10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    base: i32,
    power: i32,
}

impl Scale {
    pub const ONE: Scale = Scale { base: 10, power: 0 };

    pub fn new(base: i32, power: i32) -> Result<Self> {
        if base != 2 && base != 10 {
            return Err(Error::InvalidInput(format!(
                "only base-2 and base-10 scales are supported, got base {base}"
            )));
        }
        Ok(Self { base, power })
    }

    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn evaluated(&self) -> f64 {
        (self.base as f64).powi(self.power)
    }

    /// The registered name for this `(base, power)` pair, if any.
    pub fn name(&self) -> Option<&'static str> {
        let table = if self.base == 10 { DECIMAL } else { BINARY };
        table
            .iter()
            .find(|(_, power)| *power == self.power)
            .map(|(name, _)| *name)
    }

    pub fn by_name(name: &str) -> Result<Self> {
        for (n, power) in DECIMAL {
            if *n == name {
                return Ok(Self { base: 10, power: *power });
            }
        }
        for (n, power) in BINARY {
            if *n == name {
                return Ok(Self { base: 2, power: *power });
            }
        }
        Err(Error::InvalidInput(format!("unknown scale '{name}'")))
    }

    /// Strips a recognized SI or IEC prefix symbol from the front of
    /// `name`, returning the `(scale, remainder)` pair. Tries binary
    /// symbols first (`"Ki"` before a stray `"K"` decimal match), then
    /// decimal symbols longest-first so `"da"` is preferred over `"d"`.
    /// Returns `None` when no prefix matches, when the match would
    /// consume the whole string (leaving no base unit name), or when
    /// the remainder doesn't start with an uppercase/lowercase letter
    /// (guards against splitting something like `"ms"` into `"milli"`
    /// + `"s"` incorrectly — callers still verify `s` resolves to an
    /// actual registered unit before trusting the split).
    pub fn strip_symbol_prefix(name: &str) -> Option<(Scale, &str)> {
        let mut candidates: Vec<(&'static str, i32, i32)> = BINARY_SYMBOLS
            .iter()
            .map(|(sym, power)| (*sym, 2, *power))
            .collect();
        candidates.extend(DECIMAL_SYMBOLS.iter().map(|(sym, power)| (*sym, 10, *power)));
        candidates.sort_by_key(|(sym, _, _)| std::cmp::Reverse(sym.len()));

        for (symbol, base, power) in candidates {
            if let Some(remainder) = name.strip_prefix(symbol) {
                if !remainder.is_empty() {
                    return Some((Scale { base, power }, remainder));
                }
            }
        }
        None
    }

    /// Same-base: add powers. Cross-base: evaluate numerically and snap to
    /// the nearest registered member (§4.6).
    pub fn mul(&self, other: &Scale) -> Scale {
        if self.base == other.base {
            return Scale {
                base: self.base,
                power: self.power + other.power,
            };
        }
        Scale::nearest(
            self.evaluated() * other.evaluated(),
            true,
            DEFAULT_UNDERSHOOT_BIAS,
        )
    }

    pub fn div(&self, other: &Scale) -> Scale {
        if *self == *other {
            return Scale::ONE;
        }
        if self.base == other.base {
            return Scale {
                base: self.base,
                power: self.power - other.power,
            };
        }
        Scale::nearest(
            self.evaluated() / other.evaluated(),
            true,
            DEFAULT_UNDERSHOOT_BIAS,
        )
    }

    /// Finds the registered member closest to `value`. Biases very
    /// slightly toward candidates at or below the target (see
    /// `DEFAULT_UNDERSHOOT_BIAS`'s doc comment).
    pub fn nearest(value: f64, include_binary: bool, undershoot_bias: f64) -> Scale {
        let mut candidates: Vec<Scale> = DECIMAL
            .iter()
            .map(|(_, power)| Scale { base: 10, power: *power })
            .collect();
        if include_binary {
            candidates.extend(
                BINARY
                    .iter()
                    .map(|(_, power)| Scale { base: 2, power: *power }),
            );
        }
        candidates
            .into_iter()
            .min_by(|a, b| {
                let score = |s: &Scale| {
                    let evaluated = s.evaluated();
                    (evaluated - value).abs() - undershoot_bias * (evaluated - value).max(0.0)
                };
                score(a)
                    .partial_cmp(&score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(Scale::ONE)
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) if name != "one" => write!(f, "{name}"),
            Some(_) => Ok(()),
            None => write!(f, "{}^{}", self.base, self.power),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_base_multiplication_adds_powers() {
        let kilo = Scale::by_name("kilo").unwrap();
        let milli = Scale::by_name("milli").unwrap();
        assert_eq!(kilo.mul(&milli), Scale::ONE);
    }

    #[test]
    fn binary_prefixes_compose() {
        let kibi = Scale::by_name("kibi").unwrap();
        let mebi = Scale::by_name("mebi").unwrap();
        assert_eq!(kibi.mul(&kibi), mebi);
    }

    #[test]
    fn cross_base_snaps_to_nearest() {
        // 10^3 ~= 2^10 (1000 vs 1024): kilo should snap toward kibi when
        // asked to resolve a cross-base product near that magnitude.
        let snapped = Scale::nearest(1000.0, true, DEFAULT_UNDERSHOOT_BIAS);
        assert_eq!(snapped.name(), Some("kilo"));
    }

    #[test]
    fn division_of_equal_scales_is_one() {
        let mega = Scale::by_name("mega").unwrap();
        assert_eq!(mega.div(&mega), Scale::ONE);
    }

    #[test]
    fn rejects_unsupported_base() {
        assert!(Scale::new(3, 1).is_err());
    }

    #[test]
    fn strips_decimal_symbol_prefix() {
        let (scale, rest) = Scale::strip_symbol_prefix("kg").unwrap();
        assert_eq!(scale, Scale::by_name("kilo").unwrap());
        assert_eq!(rest, "g");
    }

    #[test]
    fn prefers_deca_over_deci_on_da_prefix() {
        let (scale, rest) = Scale::strip_symbol_prefix("daN").unwrap();
        assert_eq!(scale, Scale::by_name("deca").unwrap());
        assert_eq!(rest, "N");
    }

    #[test]
    fn strips_binary_symbol_prefix() {
        let (scale, rest) = Scale::strip_symbol_prefix("KiB").unwrap();
        assert_eq!(scale, Scale::by_name("kibi").unwrap());
        assert_eq!(rest, "B");
    }

    #[test]
    fn micro_accepts_ascii_and_mu_sign() {
        let (ascii_scale, ascii_rest) = Scale::strip_symbol_prefix("us").unwrap();
        let (mu_scale, mu_rest) = Scale::strip_symbol_prefix("\u{b5}s").unwrap();
        assert_eq!(ascii_scale, mu_scale);
        assert_eq!(ascii_rest, mu_rest);
    }

    #[test]
    fn no_match_when_prefix_would_consume_whole_string() {
        assert!(Scale::strip_symbol_prefix("m").is_none());
        assert!(Scale::strip_symbol_prefix("k").is_none());
    }

    #[test]
    fn no_match_without_recognized_prefix() {
        assert!(Scale::strip_symbol_prefix("meter").is_some());
        assert!(Scale::strip_symbol_prefix("xyz").is_none());
    }
}
