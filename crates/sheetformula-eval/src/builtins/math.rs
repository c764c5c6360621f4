//! Broadcasting math built-ins (SPEC_FULL §3 "Math").
//!
//! Grounded on the teacher's `formualizer-eval::builtins::math` module for
//! which functions are elementwise vs. reducing; re-implemented against
//! this crate's `broadcast::unary`/`broadcast` rather than the teacher's
//! Arrow-backed `ArgumentHandle`.

use std::sync::Arc;

use sheetformula_common::{Arity, ExcelError, Registry};

use crate::broadcast::{broadcast, unary};

pub fn register() {
    let reg = Registry::global();

    reg.register(
        &["SQRT"],
        Arity::Fixed(1),
        Arc::new(|a| {
            unary(&a[0], |n| {
                if n < 0.0 {
                    Err(ExcelError::Num)
                } else {
                    Ok(n.sqrt())
                }
            })
        }),
    );

    reg.register(&["ABS"], Arity::Fixed(1), Arc::new(|a| unary(&a[0], |n| Ok(n.abs()))));

    reg.register(
        &["LOG"],
        Arity::Fixed(1),
        Arc::new(|a| {
            unary(&a[0], |n| {
                if n <= 0.0 {
                    Err(ExcelError::Div0)
                } else {
                    Ok(n.log10())
                }
            })
        }),
    );

    reg.register(
        &["LN"],
        Arity::Fixed(1),
        Arc::new(|a| {
            unary(&a[0], |n| {
                if n <= 0.0 {
                    Err(ExcelError::Div0)
                } else {
                    Ok(n.ln())
                }
            })
        }),
    );

    reg.register(&["EXP"], Arity::Fixed(1), Arc::new(|a| unary(&a[0], |n| Ok(n.exp()))));

    reg.register(
        &["POWER"],
        Arity::Fixed(2),
        Arc::new(|a| broadcast(a, |n| Ok(n[0].powf(n[1])))),
    );

    reg.register(
        &["MOD"],
        Arity::Fixed(2),
        Arc::new(|a| {
            broadcast(a, |n| {
                if n[1] == 0.0 {
                    Err(ExcelError::Div0)
                } else {
                    Ok(n[0].rem_euclid(n[1]))
                }
            })
        }),
    );

    reg.register(
        &["ROUND"],
        Arity::Fixed(2),
        Arc::new(|a| broadcast(a, |n| Ok(round_to(n[0], n[1] as i32)))),
    );

    reg.register(
        &["ROUNDUP"],
        Arity::Fixed(2),
        Arc::new(|a| {
            broadcast(a, |n| {
                let factor = 10f64.powi(n[1] as i32);
                let scaled = n[0] * factor;
                let rounded = if scaled >= 0.0 { scaled.ceil() } else { scaled.floor() };
                Ok(rounded / factor)
            })
        }),
    );

    reg.register(
        &["ROUNDDOWN"],
        Arity::Fixed(2),
        Arc::new(|a| {
            broadcast(a, |n| {
                let factor = 10f64.powi(n[1] as i32);
                let scaled = n[0] * factor;
                let truncated = scaled.trunc();
                Ok(truncated / factor)
            })
        }),
    );

    reg.register(&["INT"], Arity::Fixed(1), Arc::new(|a| unary(&a[0], |n| Ok(n.floor()))));

    reg.register(
        &["SIGN"],
        Arity::Fixed(1),
        Arc::new(|a| unary(&a[0], |n| Ok(if n > 0.0 { 1.0 } else if n < 0.0 { -1.0 } else { 0.0 }))),
    );
}

fn round_to(n: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    let scaled = n * factor;
    let rounded = if scaled >= 0.0 {
        (scaled + 0.5).floor()
    } else {
        (scaled - 0.5).ceil()
    };
    rounded / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetformula_common::Value;

    fn call(name: &str, args: &[Value]) -> Value {
        let (_, f) = Registry::global().get(name).unwrap();
        f(args)
    }

    #[test]
    fn sqrt_of_negative_is_num_error() {
        crate::builtins::load();
        assert_eq!(call("SQRT", &[Value::Number(-1.0)]), Value::ErrorValue(ExcelError::Num));
    }

    #[test]
    fn sqrt_broadcasts_over_arrays() {
        crate::builtins::load();
        let result = call("SQRT", &[Value::Array(vec![Value::Number(4.0), Value::Number(9.0)])]);
        assert_eq!(result, Value::Array(vec![Value::Number(2.0), Value::Number(3.0)]));
    }

    #[test]
    fn round_half_up() {
        crate::builtins::load();
        assert_eq!(call("ROUND", &[Value::Number(2.5), Value::Number(0.0)]), Value::Number(3.0));
    }
}
