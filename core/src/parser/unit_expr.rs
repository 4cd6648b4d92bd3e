//! Recursive-descent parser for unit expressions (§4.11).
//!
//! Grounded on `examples/original_source/ucon/parsing.py`'s `UnitParser`:
//! same grammar (`expr := term (('*'|'/') term)*`, `term := factor ('^'
//! exponent)?`, implicit exponent from a bare `NUMBER` token following a
//! factor, parenthesized sub-expressions), reworked onto this crate's
//! `UnitFactor`/`UnitProduct` exponent-map representation.

use crate::error::{Error, Result};
use crate::num::rational::{self, Rational};
use crate::num::scale::Scale;
use crate::num::unit::{Unit, UnitFactor, UnitProduct};
use crate::parser::lexer::{Token, TokenKind, Tokenizer};

/// Resolves an identifier to a `(Unit, Scale)` pair, stripping a known SI
/// prefix from the front when present (§4.11 "the lookup returns (unit,
/// scale) when a known SI prefix is stripped from the front").
pub trait UnitLookup {
    fn lookup(&self, name: &str) -> Result<(Unit, Scale)>;
}

pub struct UnitExprParser<'a, L: UnitLookup> {
    input: &'a str,
    lookup: &'a L,
    tokenizer: Tokenizer<'a>,
    current: Token,
}

impl<'a, L: UnitLookup> UnitExprParser<'a, L> {
    pub fn new(input: &'a str, lookup: &'a L) -> Result<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Self {
            input,
            lookup,
            tokenizer,
            current,
        })
    }

    fn advance(&mut self) -> Result<Token> {
        let token = self.current.clone();
        self.current = self.tokenizer.next_token()?;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind != kind {
            return Err(Error::parse_error(
                format!("expected {kind:?}, got {:?}", self.current.kind),
                self.current.position,
                self.input,
            ));
        }
        self.advance()
    }

    pub fn parse(mut self) -> Result<UnitProduct> {
        let result = self.parse_expr()?;
        if self.current.kind != TokenKind::Eof {
            return Err(Error::parse_error(
                format!("unexpected token '{}'", self.current.text),
                self.current.position,
                self.input,
            ));
        }
        Ok(result)
    }

    /// `expr := term (('*' | '/') term)*`, left-to-right associative —
    /// `mg/kg/d` parses as `(mg/kg)/d`, not `mg/(kg/d)` (§4.11 supplemented
    /// lexical detail).
    fn parse_expr(&mut self) -> Result<UnitProduct> {
        let mut left = self.parse_term()?;
        loop {
            match self.current.kind {
                TokenKind::Mul => {
                    self.advance()?;
                    let right = self.parse_term()?;
                    left = left.mul(&right);
                }
                TokenKind::Div => {
                    self.advance()?;
                    let right = self.parse_term()?;
                    left = left.div(&right);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// `term := factor ('^' exponent)?`, plus the implicit exponent a
    /// Unicode superscript lexes to (a bare `NUMBER` token right after a
    /// factor, with no explicit `^`).
    fn parse_term(&mut self) -> Result<UnitProduct> {
        let base = self.parse_factor()?;
        if self.current.kind == TokenKind::Pow {
            self.advance()?;
            let exp = self.parse_exponent()?;
            return Ok(base.pow(&exp));
        }
        if self.current.kind == TokenKind::Number {
            let exp = self.parse_exponent()?;
            return Ok(base.pow(&exp));
        }
        Ok(base)
    }

    fn parse_exponent(&mut self) -> Result<Rational> {
        let token = self.expect(TokenKind::Number)?;
        let value: i64 = token.text.parse().map_err(|_| {
            Error::parse_error(
                format!("invalid exponent '{}'", token.text),
                token.position,
                self.input,
            )
        })?;
        Ok(rational::int(value))
    }

    /// `factor := '(' expr ')' | scale_unit`
    fn parse_factor(&mut self) -> Result<UnitProduct> {
        if self.current.kind == TokenKind::LParen {
            self.advance()?;
            let inner = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            return Ok(inner);
        }
        if self.current.kind == TokenKind::Ident {
            let token = self.advance()?;
            let (unit, scale) = self.lookup.lookup(&token.text)?;
            return Ok(UnitProduct::single(UnitFactor::new(unit, scale), rational::one()));
        }
        Err(Error::parse_error(
            format!("expected a unit or '(', got {:?}", self.current.kind),
            self.current.position,
            self.input,
        ))
    }
}

pub fn parse_unit_expression<L: UnitLookup>(input: &str, lookup: &L) -> Result<UnitProduct> {
    UnitExprParser::new(input, lookup)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisComponent, Vector};
    use crate::dimension::Dimension;
    use std::collections::HashMap;

    struct TestLookup {
        units: HashMap<String, Unit>,
    }

    impl UnitLookup for TestLookup {
        fn lookup(&self, name: &str) -> Result<(Unit, Scale)> {
            if let Some(unit) = self.units.get(name) {
                return Ok((unit.clone(), Scale::ONE));
            }
            if let Some(stripped) = name.strip_prefix('k') {
                if let Some(unit) = self.units.get(stripped) {
                    return Ok((unit.clone(), Scale::by_name("kilo")?));
                }
            }
            Err(Error::UnknownUnit { name: name.to_string() })
        }
    }

    fn test_lookup() -> TestLookup {
        let b = Basis::new(
            "test",
            vec![
                BasisComponent::new("length", Some("L")),
                BasisComponent::new("mass", Some("M")),
                BasisComponent::new("time", Some("T")),
            ],
        )
        .unwrap();
        let mut units = HashMap::new();
        units.insert(
            "m".to_string(),
            Unit::new(
                "meter",
                vec!["m".to_string()],
                Dimension::named(
                    Vector::new(&b, vec![rational::int(1), rational::int(0), rational::int(0)]).unwrap(),
                    "length",
                    Some("L"),
                ),
            ),
        );
        units.insert(
            "g".to_string(),
            Unit::new(
                "gram",
                vec!["g".to_string()],
                Dimension::named(
                    Vector::new(&b, vec![rational::int(0), rational::int(1), rational::int(0)]).unwrap(),
                    "mass",
                    Some("M"),
                ),
            ),
        );
        units.insert(
            "s".to_string(),
            Unit::new(
                "second",
                vec!["s".to_string()],
                Dimension::named(
                    Vector::new(&b, vec![rational::int(0), rational::int(0), rational::int(1)]).unwrap(),
                    "time",
                    Some("T"),
                ),
            ),
        );
        TestLookup { units }
    }

    #[test]
    fn parses_division_chain_left_associatively() {
        let lookup = test_lookup();
        let product = parse_unit_expression("m/g/s", &lookup).unwrap();
        // m * g^-1 * s^-1
        let dim = product.dimension().unwrap();
        assert_eq!(
            dim.vector().components(),
            &[rational::int(1), rational::int(-1), rational::int(-1)]
        );
    }

    #[test]
    fn parses_caret_exponent() {
        let lookup = test_lookup();
        let product = parse_unit_expression("m^2", &lookup).unwrap();
        assert_eq!(product.factors()[0].1, rational::int(2));
    }

    #[test]
    fn parses_unicode_superscript_exponent() {
        let lookup = test_lookup();
        let product = parse_unit_expression("m\u{b2}", &lookup).unwrap();
        assert_eq!(product.factors()[0].1, rational::int(2));
    }

    #[test]
    fn parses_parenthesized_subexpression() {
        let lookup = test_lookup();
        // W/(m*K) style grouping, using available test units: m/(g*s)
        let product = parse_unit_expression("m/(g*s)", &lookup).unwrap();
        let dim = product.dimension().unwrap();
        assert_eq!(
            dim.vector().components(),
            &[rational::int(1), rational::int(-1), rational::int(-1)]
        );
    }

    #[test]
    fn resolves_scale_prefixed_identifier() {
        let lookup = test_lookup();
        let product = parse_unit_expression("kg", &lookup).unwrap();
        assert_eq!(product.factors()[0].0.scale().name(), Some("kilo"));
    }

    #[test]
    fn unknown_unit_reports_position() {
        let lookup = test_lookup();
        let err = parse_unit_expression("xyz", &lookup).unwrap_err();
        assert!(matches!(err, Error::UnknownUnit { .. }));
    }
}
