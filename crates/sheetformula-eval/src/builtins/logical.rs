//! Logical built-ins (SPEC_FULL §3 "Logical"): `IF` is the one place the
//! runtime has genuinely custom broadcasting semantics (spec §4.4, §9 Open
//! Question), the rest reduce through the shared `broadcast` helper.

use std::sync::Arc;

use sheetformula_common::{Arity, ExcelError, Registry, Value};

use crate::broadcast::{broadcast, index, unary};

pub fn register() {
    let reg = Registry::global();

    reg.register(&["IF"], Arity::Fixed(3), Arc::new(if_fn));

    reg.register(
        &["AND"],
        Arity::Variadic,
        Arc::new(|a| to_bool(broadcast(a, |n| Ok(bool_to_f64(n.iter().all(|&x| x != 0.0)))))),
    );

    reg.register(
        &["OR"],
        Arity::Variadic,
        Arc::new(|a| to_bool(broadcast(a, |n| Ok(bool_to_f64(n.iter().any(|&x| x != 0.0)))))),
    );

    reg.register(
        &["NOT"],
        Arity::Fixed(1),
        Arc::new(|a| to_bool(unary(&a[0], |n| Ok(bool_to_f64(n == 0.0))))),
    );

    reg.register(
        &["IFERROR"],
        Arity::Fixed(2),
        Arc::new(|a| replace_where(&a[0], &a[1], Value::is_error)),
    );

    reg.register(
        &["IFNA"],
        Arity::Fixed(2),
        Arc::new(|a| replace_where(&a[0], &a[1], |v| v.as_error() == Some(ExcelError::Na))),
    );
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn to_bool(v: Value) -> Value {
    match v {
        Value::Number(n) => Value::Bool(n != 0.0),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|i| match i {
                    Value::Number(n) => Value::Bool(n != 0.0),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn replace_where(primary: &Value, fallback: &Value, should_replace: impl Fn(&Value) -> bool) -> Value {
    if !primary.is_array() {
        return if should_replace(primary) {
            fallback.clone()
        } else {
            primary.clone()
        };
    }
    let len = primary.broadcast_len();
    let out = (0..len)
        .map(|i| {
            let p = index(primary, i);
            if should_replace(&p) {
                index(fallback, i)
            } else {
                p
            }
        })
        .collect();
    Value::Array(out)
}

/// `IF(cond, then, else)` evaluates both branches (already done by the
/// caller) then selects elementwise after broadcasting to `cond`'s shape,
/// preserving the winning branch's native type at each position (spec §9
/// Open Question resolution). When the result mixes `Text` and `Number`
/// across positions, numbers are stringified to match the worked example
/// `IF(a1>100,'abc',IF(a1>1,4,56)) -> '4.0'` — the source engine builds
/// these as dtype-homogeneous arrays, so a text element anywhere forces
/// the whole array to text.
fn if_fn(args: &[Value]) -> Value {
    let (cond, then_v, else_v) = (&args[0], &args[1], &args[2]);
    if let Some(e) = cond.as_error() {
        return Value::ErrorValue(e);
    }
    if !cond.is_array() {
        let truthy = match crate::broadcast::coerce_numeric(cond) {
            Ok(n) => n != 0.0,
            Err(e) => return Value::ErrorValue(e),
        };
        return if truthy { then_v.clone() } else { else_v.clone() };
    }
    let len = cond.broadcast_len();
    let picked: Vec<Value> = (0..len)
        .map(|i| {
            let ci = index(cond, i);
            match crate::broadcast::coerce_numeric(&ci) {
                Ok(n) if n != 0.0 => index(then_v, i),
                Ok(_) => index(else_v, i),
                Err(e) => Value::ErrorValue(e),
            }
        })
        .collect();
    if picked.iter().any(|v| matches!(v, Value::Text(_))) {
        Value::Array(picked.into_iter().map(stringify_number).collect())
    } else {
        Value::Array(picked)
    }
}

fn stringify_number(v: Value) -> Value {
    match v {
        Value::Number(n) if n.fract() == 0.0 => Value::Text(format!("{n:.1}")),
        Value::Number(n) => Value::Text(n.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        crate::builtins::load();
        let (_, f) = Registry::global().get(name).unwrap();
        f(args)
    }

    #[test]
    fn if_selects_elementwise_over_array_condition() {
        let cond = Value::Array(vec![Value::Bool(true), Value::Bool(false)]);
        let result = call("IF", &[cond, Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(result, Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]));
    }

    #[test]
    fn if_stringifies_numbers_when_mixed_with_text_across_positions() {
        let cond = Value::Array(vec![Value::Bool(true), Value::Bool(false)]);
        let result = call("IF", &[cond, Value::Text("abc".into()), Value::Number(4.0)]);
        assert_eq!(
            result,
            Value::Array(vec![Value::Text("abc".into()), Value::Text("4.0".into())])
        );
    }

    #[test]
    fn iferror_falls_back_only_on_error_positions() {
        let primary = Value::Array(vec![Value::ErrorValue(ExcelError::Div0), Value::Number(1.0)]);
        let result = call("IFERROR", &[primary, Value::Number(0.0)]);
        assert_eq!(result, Value::Array(vec![Value::Number(0.0), Value::Number(1.0)]));
    }
}
