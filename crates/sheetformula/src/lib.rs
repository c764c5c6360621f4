//! Public facade (spec §6): parse a formula once into a reusable [`Thunk`],
//! then invoke it against as many binding maps as needed.
//!
//! Mirrors the teacher's top-level crate, which exists only to wire
//! `formualizer-parse` and `formualizer-eval` behind one entry point and
//! guarantee the built-in catalogue is registered before first use.

use std::collections::HashMap;

pub use sheetformula_common::{Arity, CellRef, Evaluator, ExcelError, Registry, Value};
pub use sheetformula_eval::{default_resolver, CellResolver, Thunk};
pub use sheetformula_parse::{Ast, BinaryOp, Slot, UnaryOp};

/// Parses formula text into a [`Thunk`]. Registers the built-in catalogue
/// (spec §4.1) on first use, idempotently, so constructing more than one
/// `Parser` is always safe.
pub struct Parser {
    inner: sheetformula_parse::Parser,
    cell_resolver: CellResolver,
}

/// The result of [`Parser::parse`]: spec §3's "Parser result" — a thunk that
/// is always invocable, plus an optional structural error that produced it.
pub struct ParseResult {
    pub thunk: Thunk,
    pub error: Option<ExcelError>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        sheetformula_eval::load_builtins();
        Parser {
            inner: sheetformula_parse::Parser::new(sheetformula_parse::ParserOptions::default()),
            cell_resolver: default_resolver(),
        }
    }

    pub fn with_debug_logging(mut self, debug: bool) -> Self {
        self.inner = sheetformula_parse::Parser::new(sheetformula_parse::ParserOptions { debug });
        self
    }

    /// Inject a `cellResolver` (spec §6): called for any `CellRef` absent
    /// from the binding map passed to `Thunk::invoke`. Defaults to `Blank`.
    pub fn with_cell_resolver(mut self, resolver: CellResolver) -> Self {
        self.cell_resolver = resolver;
        self
    }

    pub fn parse(&self, formula: &str) -> ParseResult {
        let outcome = self.inner.parse(formula);
        ParseResult {
            thunk: Thunk::with_resolver(outcome.ast, self.cell_resolver.clone()),
            error: outcome.error,
        }
    }
}

/// Convenience one-shot: parse and immediately invoke against `bindings`.
/// Equivalent to `Parser::new().parse(formula).thunk.invoke(bindings)`.
pub fn evaluate(formula: &str, bindings: &HashMap<String, Value>) -> Value {
    Parser::new().parse(formula).thunk.invoke(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn implicit_multiplication_and_cell_bindings() {
        let b = bindings(&[("a1", Value::Number(2.0)), ("a2", Value::Number(4.0))]);
        let result = evaluate("5(SQRT(a1 + 2))(SQRT(a2)(a2) + 5)", &b);
        assert_eq!(result, Value::Number(130.0));
    }

    #[test]
    fn if_arity_mismatch_is_value_error() {
        let b = bindings(&[("a1", Value::Number(4.0))]);
        let result = evaluate("IF(a1 > 10, 40, IF(a1 > 10, 4))", &b);
        assert_eq!(result, Value::ErrorValue(ExcelError::Value));
    }

    #[test]
    fn power_right_operand_allows_leading_minus() {
        let b = HashMap::new();
        assert_eq!(evaluate("2^-2-1", &b), Value::Number(-0.75));
    }

    #[test]
    fn leading_unary_minus_wraps_whole_power() {
        let b = HashMap::new();
        assert_eq!(evaluate("-2^2", &b), Value::Number(-4.0));
    }

    #[test]
    fn scientific_notation_literal() {
        let b = HashMap::new();
        assert_eq!(evaluate("-2e-1", &b), Value::Number(-0.2));
    }

    #[test]
    fn unbound_cell_defaults_to_blank_treated_as_zero() {
        let b = HashMap::new();
        assert_eq!(evaluate("a1 + 1", &b), Value::Number(1.0));
    }

    #[test]
    fn custom_cell_resolver_overrides_default_blank() {
        let parser = Parser::new().with_cell_resolver(std::sync::Arc::new(|_| Value::Number(9.0)));
        let result = parser.parse("a1 + 1").thunk.invoke(&HashMap::new());
        assert_eq!(result, Value::Number(10.0));
    }
}
