//! Integration tests: the seed end-to-end scenarios and invariants/laws
//! from spec.md §8, run against the real facade API.

use std::collections::HashMap;

use sheetformula::{evaluate, ExcelError, Parser, Value};

fn bindings(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn num(pairs: &[(&str, f64)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), Value::Number(*v))).collect()
}

fn arr(items: &[f64]) -> Value {
    Value::Array(items.iter().map(|n| Value::Number(*n)).collect())
}

// --- End-to-end seed scenarios ---------------------------------------

#[test]
fn sum_of_three_cells() {
    let b = num(&[("A", 3.43), ("B", 5.23), ("C", 6.34)]);
    assert_eq!(evaluate("A + B + C", &b), Value::Number(15.0));
}

#[test]
fn sum_with_blank_slot_and_nested_call() {
    let b = num(&[("A", 4.0), ("B", 2.0), ("C", 6.0)]);
    assert_eq!(evaluate("SUM(A,, B, SUM(3, C)) + 5", &b), Value::Number(20.0));
}

#[test]
fn if_over_array_condition() {
    let b = bindings(&[("a1", arr(&[1.0, 4.0]))]);
    assert_eq!(evaluate("IF(a1 + a1 < 4, 1, 2)", &b), arr(&[1.0, 2.0]));
}

#[test]
fn power_right_operand_unary_minus() {
    assert_eq!(evaluate("2^-2-1", &HashMap::new()), Value::Number(-0.75));
}

#[test]
fn implicit_multiplication_and_juxtaposed_calls() {
    let b = bindings(&[("a1", arr(&[2.0])), ("a2", arr(&[4.0]))]);
    assert_eq!(
        evaluate("5(SQRT(a1 + 2))(SQRT(a2)(a2) + 5)", &b),
        arr(&[130.0])
    );
}

#[test]
fn scientific_notation_negative_exponent() {
    assert_eq!(evaluate("-2e-1", &HashMap::new()), Value::Number(-0.2));
}

#[test]
fn inner_if_fixed_arity_violation_is_value_error() {
    // a1 is a length-1 array, numerically interchangeable with a scalar
    // (§8 law 5) — the result may come back wrapped the same way.
    let b = bindings(&[("a1", arr(&[4.0]))]);
    let result = evaluate("IF(a1 > 10, 40, IF(a1 > 10, 4))", &b);
    match result {
        Value::ErrorValue(ExcelError::Value) => {}
        Value::Array(items) if items.as_slice() == [Value::ErrorValue(ExcelError::Value)] => {}
        other => panic!("expected #VALUE!, got {other:?}"),
    }
}

#[test]
fn division_error_propagates_into_char() {
    assert_eq!(
        evaluate("CHAR(1/0)", &HashMap::new()),
        Value::ErrorValue(ExcelError::Div0)
    );
}

#[test]
fn textjoin_skip_blanks_true() {
    assert_eq!(
        evaluate(r#"TEXTJOIN(";", TRUE, {"1",,"2","3"})"#, &HashMap::new()),
        Value::Text("1;2;3".into())
    );
}

#[test]
fn textjoin_skip_blanks_false() {
    assert_eq!(
        evaluate(r#"TEXTJOIN(";", FALSE, {"1",,"2","3"})"#, &HashMap::new()),
        Value::Text("1;;2;3".into())
    );
}

#[test]
fn substitute_with_four_blank_slots_is_value_error() {
    assert_eq!(
        evaluate("SUBSTITUTE(;;;)", &HashMap::new()),
        Value::ErrorValue(ExcelError::Value)
    );
}

// --- Invariants / laws -------------------------------------------------

#[test]
fn law_purity() {
    let b = num(&[("a1", 3.0)]);
    let parser = Parser::new();
    let thunk = parser.parse("a1 * 2").thunk;
    assert_eq!(thunk.invoke(&b), thunk.invoke(&b));
}

#[test]
fn law_separator_equivalence() {
    let b = num(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
    assert_eq!(
        evaluate("SUM(a, b, c)", &b),
        evaluate("SUM(a; b; c)", &b)
    );
}

#[test]
fn law_scientific_notation_vs_juxtaposed_variable_e() {
    assert_eq!(evaluate("5e2", &HashMap::new()), Value::Number(500.0));
    let b = bindings(&[("e", Value::Number(3.0))]);
    assert_eq!(evaluate("5(e)", &b), Value::Number(15.0));
}

#[test]
fn law_broadcasting_commutativity() {
    let b = num(&[("x", 3.0), ("y", 5.0)]);
    assert_eq!(evaluate("x + y", &b), evaluate("y + x", &b));
    assert_eq!(evaluate("MIN(x, y)", &b), evaluate("MIN(y, x)", &b));
}

#[test]
fn law_scalar_length_one_array_interchangeable() {
    let scalar = num(&[("a1", 4.0)]);
    let array = bindings(&[("a1", arr(&[4.0]))]);
    assert_eq!(evaluate("a1 * 2", &scalar), Value::Number(8.0));
    assert_eq!(evaluate("a1 * 2", &array), arr(&[8.0]));
}

#[test]
fn law_error_propagation_through_if() {
    let b = bindings(&[("a1", Value::ErrorValue(ExcelError::Div0))]);
    assert_eq!(
        evaluate("IF(a1, 1, 2)", &b),
        Value::ErrorValue(ExcelError::Div0)
    );
}

#[test]
fn law_separator_as_blank() {
    assert_eq!(evaluate("SUM(1,,2)", &HashMap::new()), Value::Number(3.0));
}
