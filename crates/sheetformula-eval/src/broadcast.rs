//! Broadcasting primitives (spec §4.4, §9 "Broadcasting without a tensor
//! library": "a small internal `ArrayView` with an elementwise map/zip
//! primitive"). No numeric library is used; everything here is plain
//! `Vec<f64>`/`Vec<Value>` manipulation.

use sheetformula_common::{ExcelError, Value};
use sheetformula_parse::BinaryOp;

/// Coerce a scalar `Value` to its numeric view (spec §4.4 point 1).
pub fn coerce_numeric(v: &Value) -> Result<f64, ExcelError> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f64>().map_err(|_| ExcelError::Value),
        Value::Blank => Ok(0.0),
        Value::ErrorValue(e) => Err(*e),
        Value::Array(_) | Value::CellRef(_) => Err(ExcelError::Value),
    }
}

/// The target array length for a set of broadcast operands: the length of
/// the first array of length >= 2 encountered; every other such array
/// operand must match it (spec §4.4 point 2). A length-1 array is
/// semantically indistinguishable from a scalar (spec §3, §8 law 5), so it
/// never constrains the target shape — `[x] + [a,b,c]` broadcasts `x`
/// across all three positions instead of erroring.
pub fn target_len(args: &[Value]) -> Result<usize, ExcelError> {
    let mut len = None;
    for a in args {
        if let Value::Array(items) = a {
            if items.len() < 2 {
                continue;
            }
            let l = items.len();
            match len {
                None => len = Some(l),
                Some(existing) if existing != l => return Err(ExcelError::Value),
                _ => {}
            }
        }
    }
    Ok(len.unwrap_or(1))
}

/// The element of `v` at broadcast position `i`: itself if scalar, or the
/// `i`th array member (a length-1 array broadcasts like a scalar, per
/// spec §3 invariant / §8 law 5).
pub fn index(v: &Value, i: usize) -> Value {
    match v {
        Value::Array(items) if !items.is_empty() => items[i % items.len()].clone(),
        other => other.clone(),
    }
}

/// Any top-level (non-array) operand that is itself an error is the
/// "leftmost error in evaluation order" and short-circuits the whole
/// operation (spec §4.4 point 1); an error nested inside an array operand
/// only poisons its own position (see `broadcast`'s per-element path),
/// which is how `IF` is specified to preserve errors positionally (§7).
fn leading_scalar_error(args: &[Value]) -> Option<ExcelError> {
    args.iter().find(|v| !v.is_array()).and_then(|v| v.as_error())
}

/// Elementwise numeric broadcast (spec §4.4): applies `f` to the
/// coerced-numeric view of each argument, scalar if no argument is an
/// array, else `Array` of the target length.
pub fn broadcast<F>(args: &[Value], f: F) -> Value
where
    F: Fn(&[f64]) -> Result<f64, ExcelError>,
{
    if let Some(e) = leading_scalar_error(args) {
        return Value::ErrorValue(e);
    }
    let len = match target_len(args) {
        Ok(l) => l,
        Err(e) => return Value::ErrorValue(e),
    };
    let is_array = args.iter().any(Value::is_array);
    if !is_array {
        return match args.iter().map(coerce_numeric).collect::<Result<Vec<_>, _>>().and_then(|n| f(&n)) {
            Ok(v) => Value::Number(v),
            Err(e) => Value::ErrorValue(e),
        };
    }
    let out = (0..len)
        .map(|i| {
            let row: Vec<Value> = args.iter().map(|a| index(a, i)).collect();
            match row.iter().map(coerce_numeric).collect::<Result<Vec<_>, _>>().and_then(|n| f(&n)) {
                Ok(v) => Value::Number(v),
                Err(e) => Value::ErrorValue(e),
            }
        })
        .collect();
    Value::Array(out)
}

pub fn unary<F>(v: &Value, f: F) -> Value
where
    F: Fn(f64) -> Result<f64, ExcelError>,
{
    broadcast(std::slice::from_ref(v), move |n| f(n[0]))
}

pub fn negate(v: &Value) -> Value {
    unary(v, |n| Ok(-n))
}

pub fn percent(v: &Value) -> Value {
    unary(v, |n| Ok(n / 100.0))
}

/// `&` string concatenation is scalar-only (spec §4.4): an array operand
/// is a `#VALUE!`, not a broadcast.
pub fn concat(a: &Value, b: &Value) -> Value {
    if a.is_array() || b.is_array() {
        return Value::ErrorValue(ExcelError::Value);
    }
    if let Some(e) = a.as_error() {
        return Value::ErrorValue(e);
    }
    if let Some(e) = b.as_error() {
        return Value::ErrorValue(e);
    }
    Value::Text(format!("{a}{b}"))
}

fn text_cmp(op: BinaryOp, a: &str, b: &str) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        BinaryOp::Gt => a > b,
        BinaryOp::Lt => a < b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Le => a <= b,
        _ => false,
    }
}

fn num_cmp(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        BinaryOp::Gt => a > b,
        BinaryOp::Lt => a < b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Le => a <= b,
        _ => false,
    }
}

fn compare_scalar(op: BinaryOp, a: &Value, b: &Value) -> Value {
    if let Some(e) = a.as_error() {
        return Value::ErrorValue(e);
    }
    if let Some(e) = b.as_error() {
        return Value::ErrorValue(e);
    }
    if let (Value::Text(x), Value::Text(y)) = (a, b) {
        return Value::Bool(text_cmp(op, x, y));
    }
    match (coerce_numeric(a), coerce_numeric(b)) {
        (Ok(x), Ok(y)) => Value::Bool(num_cmp(op, x, y)),
        (Err(e), _) | (_, Err(e)) => Value::ErrorValue(e),
    }
}

/// Comparisons broadcast like arithmetic (spec §4.4 point 1), but a
/// scalar-vs-scalar comparison between two `Text` values compares
/// lexicographically instead of attempting numeric coercion — otherwise
/// `"ab" = "ab"` would be a `#VALUE!`, which no spreadsheet user expects.
pub fn compare(op: BinaryOp, a: &Value, b: &Value) -> Value {
    if !a.is_array() && !b.is_array() {
        return compare_scalar(op, a, b);
    }
    if let Some(e) = leading_scalar_error(&[a.clone(), b.clone()]) {
        return Value::ErrorValue(e);
    }
    let len = match target_len(&[a.clone(), b.clone()]) {
        Ok(l) => l,
        Err(e) => return Value::ErrorValue(e),
    };
    let out = (0..len)
        .map(|i| compare_scalar(op, &index(a, i), &index(b, i)))
        .collect();
    Value::Array(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_one_array_broadcasts_against_a_longer_array() {
        let x = Value::Array(vec![Value::Number(10.0)]);
        let abc = Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let result = broadcast(&[x, abc], |n| Ok(n[0] + n[1]));
        assert_eq!(
            result,
            Value::Array(vec![Value::Number(11.0), Value::Number(12.0), Value::Number(13.0)])
        );
    }

    #[test]
    fn two_mismatched_longer_arrays_are_value_error() {
        let a = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let b = Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(
            broadcast(&[a, b], |n| Ok(n[0] + n[1])),
            Value::ErrorValue(ExcelError::Value)
        );
    }
}
