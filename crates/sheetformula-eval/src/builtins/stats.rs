//! Reducing statistical built-ins (SPEC_FULL §3 "Statistical").
//!
//! `broadcast::broadcast` already generalises over an arbitrary argument
//! count, computing one result per broadcast position from every
//! argument's coerced value at that position — which is exactly the
//! "stacking" semantics the spec's Open Question resolves on (§9):
//! `AVERAGE(a1, a2, a2)` over length-3 arrays reduces *across the three
//! arguments* at each of the three positions, not by flattening everything
//! into one pool. Grounded in `examples/original_source/hotxlfp`'s
//! `torch.stack`-based `AVERAGE`.

use std::sync::Arc;

use sheetformula_common::{Arity, ExcelError, Registry, Value};

use crate::broadcast::{broadcast, index, target_len};

pub fn register() {
    let reg = Registry::global();

    reg.register(&["SUM"], Arity::Variadic, Arc::new(|a| broadcast(a, |n| Ok(n.iter().sum()))));

    reg.register(
        &["AVERAGE", "AVG"],
        Arity::Variadic,
        Arc::new(|a| {
            broadcast(a, |n| {
                if n.is_empty() {
                    Err(ExcelError::Div0)
                } else {
                    Ok(n.iter().sum::<f64>() / n.len() as f64)
                }
            })
        }),
    );

    reg.register(
        &["MIN"],
        Arity::Variadic,
        Arc::new(|a| broadcast(a, |n| Ok(n.iter().cloned().fold(f64::INFINITY, f64::min)))),
    );

    reg.register(
        &["MAX"],
        Arity::Variadic,
        Arc::new(|a| broadcast(a, |n| Ok(n.iter().cloned().fold(f64::NEG_INFINITY, f64::max)))),
    );

    reg.register(
        &["MEDIAN"],
        Arity::Variadic,
        Arc::new(|a| {
            broadcast(a, |n| {
                if n.is_empty() {
                    return Err(ExcelError::Div0);
                }
                let mut v = n.to_vec();
                v.sort_by(|x, y| x.partial_cmp(y).unwrap());
                let mid = v.len() / 2;
                Ok(if v.len() % 2 == 0 {
                    (v[mid - 1] + v[mid]) / 2.0
                } else {
                    v[mid]
                })
            })
        }),
    );

    reg.register(
        &["STDEV"],
        Arity::Variadic,
        Arc::new(|a| {
            broadcast(a, |n| {
                if n.len() < 2 {
                    return Err(ExcelError::Div0);
                }
                let mean = n.iter().sum::<f64>() / n.len() as f64;
                let variance = n.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n.len() as f64 - 1.0);
                Ok(variance.sqrt())
            })
        }),
    );

    reg.register(&["COUNT"], Arity::Variadic, Arc::new(count));
}

/// `COUNT` tallies only genuine numbers, silently skipping text/blank
/// rather than erroring — it never needs to coerce anything, so it does
/// not go through `broadcast::broadcast`.
fn count(args: &[Value]) -> Value {
    let len = match target_len(args) {
        Ok(l) => l,
        Err(e) => return Value::ErrorValue(e),
    };
    if !args.iter().any(Value::is_array) {
        let c = args.iter().filter(|v| matches!(v, Value::Number(_))).count();
        return Value::Number(c as f64);
    }
    let out = (0..len)
        .map(|i| {
            let c = args
                .iter()
                .map(|a| index(a, i))
                .filter(|v| matches!(v, Value::Number(_)))
                .count();
            Value::Number(c as f64)
        })
        .collect();
    Value::Array(out)
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
    fn average_stacks_arrays_pointwise() {
        let a1 = Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let a2 = Value::Array(vec![Value::Number(4.0), Value::Number(5.0), Value::Number(6.0)]);
        let result = call("AVERAGE", &[a1.clone(), a2.clone(), a2]);
        assert_eq!(
            result,
            Value::Array(vec![Value::Number(3.0), Value::Number(4.0), Value::Number(5.0)])
        );
    }

    #[test]
    fn sum_treats_blank_as_zero() {
        let result = call(
            "SUM",
            &[Value::Number(4.0), Value::Blank, Value::Number(2.0), Value::Number(9.0)],
        );
        assert_eq!(result, Value::Number(15.0));
    }

    #[test]
    fn count_skips_text_and_blank() {
        let result = call(
            "COUNT",
            &[Value::Number(1.0), Value::Text("x".into()), Value::Blank, Value::Number(2.0)],
        );
        assert_eq!(result, Value::Number(2.0));
    }
}
