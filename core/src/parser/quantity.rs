//! Quantity-string parser (§4.11): `"1.234(5) m"`, `"20 ± 1 mph"`, bare
//! numbers, and optional units.
//!
//! Grounded on `examples/original_source/ucon/parsing.py`'s tokenizer
//! (reused via `unit_expr`'s `Tokenizer` for the unit-expression tail) plus
//! the parenthetical/`±` uncertainty notations named in SPEC_FULL.md §4.11,
//! which the original's `parsing.py` module does not itself implement —
//! these are parsed directly against the raw string here rather than
//! through the unit-expression token stream.

use crate::error::{Error, Result};
use crate::num::number::Number;
use crate::num::unit::UnitProduct;
use crate::parser::unit_expr::{parse_unit_expression, UnitLookup};

/// Splits `"<numeric part>" "<rest>"` at the first character that cannot
/// continue a numeric literal (digits, one `.`, one leading `-`, exponent
/// marker `e`/`E` with its own optional sign).
fn split_numeric_prefix(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    let mut seen_dot = false;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == b'.' && !seen_dot {
            seen_dot = true;
            i += 1;
        } else if (c == b'e' || c == b'E')
            && i + 1 < bytes.len()
            && (bytes[i + 1].is_ascii_digit() || bytes[i + 1] == b'-' || bytes[i + 1] == b'+')
        {
            i += 1;
            if bytes[i] == b'-' || bytes[i] == b'+' {
                i += 1;
            }
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        } else {
            break;
        }
    }
    (&input[..i], &input[i..])
}

/// Parenthetical uncertainty: `"1.234(5)"` means the digit block `5`
/// applies to the last significant digit(s) of `1.234`, i.e. an absolute
/// uncertainty of `5 * 10^(-3)` here (§4.11).
fn parse_parenthetical(value_str: &str) -> Option<(f64, f64)> {
    let open = value_str.find('(')?;
    let close = value_str.find(')')?;
    if close <= open {
        return None;
    }
    let numeric_part = &value_str[..open];
    let digits = &value_str[open + 1..close];
    let value: f64 = numeric_part.parse().ok()?;
    let digit_value: f64 = digits.parse().ok()?;
    let decimal_places = numeric_part
        .find('.')
        .map(|dot| numeric_part.len() - dot - 1)
        .unwrap_or(0) as i32;
    let uncertainty = digit_value * 10f64.powi(-decimal_places);
    Some((value, uncertainty))
}

/// Parses a quantity string into `(quantity, uncertainty, unit_expr)`. The
/// unit expression substring (possibly empty) is returned for the caller to
/// hand to `parse_unit_expression` with its own `UnitLookup`.
fn split_quantity(input: &str) -> Result<(f64, Option<f64>, &str)> {
    let trimmed = input.trim();

    if let Some((value, uncertainty)) = parse_parenthetical(trimmed) {
        let close = trimmed.find(')').unwrap();
        let rest = trimmed[close + 1..].trim_start();
        return Ok((value, Some(uncertainty), rest));
    }

    let (numeric, rest) = split_numeric_prefix(trimmed);
    if numeric.is_empty() {
        return Err(Error::parse_error(
            "expected a numeric value".to_string(),
            0,
            input,
        ));
    }
    let value: f64 = numeric.parse().map_err(|_| {
        Error::parse_error(format!("invalid number '{numeric}'"), 0, input)
    })?;

    let rest = rest.trim_start();
    for marker in ["\u{b1}", "+/-"] {
        if let Some(after) = rest.strip_prefix(marker) {
            let after = after.trim_start();
            let (unc_numeric, unit_rest) = split_numeric_prefix(after);
            if unc_numeric.is_empty() {
                return Err(Error::parse_error(
                    "expected an uncertainty value after '\u{b1}'".to_string(),
                    0,
                    input,
                ));
            }
            let uncertainty: f64 = unc_numeric.parse().map_err(|_| {
                Error::parse_error(format!("invalid uncertainty '{unc_numeric}'"), 0, input)
            })?;
            return Ok((value, Some(uncertainty), unit_rest.trim_start()));
        }
    }

    Ok((value, None, rest))
}

/// Parses a full quantity string (§4.11's quantity-parser forms), resolving
/// any trailing unit expression through `lookup`.
pub fn parse_quantity<L: UnitLookup>(input: &str, lookup: &L) -> Result<Number> {
    let (value, uncertainty, unit_text) = split_quantity(input)?;
    let unit_text = unit_text.trim();
    let unit = if unit_text.is_empty() {
        UnitProduct::dimensionless()
    } else {
        parse_unit_expression(unit_text, lookup)?
    };
    Ok(Number::new(value, unit, uncertainty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisComponent, Vector};
    use crate::dimension::Dimension;
    use crate::num::rational;
    use crate::num::scale::Scale;
    use crate::num::unit::Unit;
    use std::collections::HashMap;

    struct TestLookup {
        units: HashMap<String, Unit>,
    }

    impl UnitLookup for TestLookup {
        fn lookup(&self, name: &str) -> Result<(Unit, Scale)> {
            self.units
                .get(name)
                .cloned()
                .map(|u| (u, Scale::ONE))
                .ok_or_else(|| Error::UnknownUnit { name: name.to_string() })
        }
    }

    fn test_lookup() -> TestLookup {
        let b = Basis::new("test", vec![BasisComponent::new("length", Some("L"))]).unwrap();
        let mut units = HashMap::new();
        units.insert(
            "m".to_string(),
            Unit::new(
                "meter",
                vec!["m".to_string()],
                Dimension::named(Vector::new(&b, vec![rational::int(1)]).unwrap(), "length", Some("L")),
            ),
        );
        TestLookup { units }
    }

    #[test]
    fn parses_bare_number_as_dimensionless() {
        let lookup = test_lookup();
        let n = parse_quantity("42", &lookup).unwrap();
        assert_eq!(n.quantity(), 42.0);
        assert!(n.unit().is_dimensionless());
    }

    #[test]
    fn parses_number_with_unit() {
        let lookup = test_lookup();
        let n = parse_quantity("3.5 m", &lookup).unwrap();
        assert_eq!(n.quantity(), 3.5);
        assert!(!n.unit().is_dimensionless());
    }

    #[test]
    fn parses_plus_minus_uncertainty() {
        let lookup = test_lookup();
        let n = parse_quantity("20 +/- 1 m", &lookup).unwrap();
        assert_eq!(n.quantity(), 20.0);
        assert_eq!(n.uncertainty(), Some(1.0));
    }

    #[test]
    fn parses_unicode_plus_minus_uncertainty() {
        let lookup = test_lookup();
        let n = parse_quantity("20 \u{b1} 1 m", &lookup).unwrap();
        assert_eq!(n.uncertainty(), Some(1.0));
    }

    #[test]
    fn parses_parenthetical_uncertainty() {
        let lookup = test_lookup();
        let n = parse_quantity("1.234(5) m", &lookup).unwrap();
        assert_eq!(n.quantity(), 1.234);
        assert!((n.uncertainty().unwrap() - 0.005).abs() < 1e-12);
    }
}
