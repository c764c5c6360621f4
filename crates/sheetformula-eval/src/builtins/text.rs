//! Scalar-only text built-ins (SPEC_FULL §3 "Text"; spec §4.4: "an array
//! argument to a text-only operation yields `VALUE!`").

use std::sync::Arc;

use sheetformula_common::{Arity, ExcelError, Registry, Value};

fn require_scalar(v: &Value) -> Result<Value, ExcelError> {
    if v.is_array() {
        return Err(ExcelError::Value);
    }
    if let Some(e) = v.as_error() {
        return Err(e);
    }
    Ok(v.clone())
}

fn as_text(v: &Value) -> Result<String, ExcelError> {
    let v = require_scalar(v)?;
    Ok(match v {
        Value::Blank => String::new(),
        other => other.to_string(),
    })
}

pub fn register() {
    let reg = Registry::global();

    reg.register(
        &["LEN"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Number(s.chars().count() as f64),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["CHAR"],
        Arity::Fixed(1),
        Arc::new(|a| {
            let v = match require_scalar(&a[0]) {
                Ok(v) => v,
                Err(e) => return Value::ErrorValue(e),
            };
            match crate::broadcast::coerce_numeric(&v) {
                Ok(n) => match char::from_u32(n as u32) {
                    Some(c) => Value::Text(c.to_string()),
                    None => Value::ErrorValue(ExcelError::Value),
                },
                Err(e) => Value::ErrorValue(e),
            }
        }),
    );

    reg.register(
        &["CODE"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => match s.chars().next() {
                Some(c) => Value::Number(c as u32 as f64),
                None => Value::ErrorValue(ExcelError::Value),
            },
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["LOWER"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Text(s.to_lowercase()),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["UPPER"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Text(s.to_uppercase()),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["PROPER"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Text(proper_case(&s)),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["TRIM"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Text(s.split_whitespace().collect::<Vec<_>>().join(" ")),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(
        &["CLEAN"],
        Arity::Fixed(1),
        Arc::new(|a| match as_text(&a[0]) {
            Ok(s) => Value::Text(s.chars().filter(|c| !c.is_control()).collect()),
            Err(e) => Value::ErrorValue(e),
        }),
    );

    reg.register(&["CONCAT"], Arity::Variadic, Arc::new(concat));

    // FIXED-3 so `SUBSTITUTE(;;;)` (four blank slots) is rejected on slot
    // count alone — spec §8 seed scenario.
    reg.register(&["SUBSTITUTE"], Arity::Fixed(3), Arc::new(substitute));

    reg.register(&["TEXTJOIN"], Arity::Fixed(3), Arc::new(textjoin));
}

fn proper_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start_of_word = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}

fn concat(args: &[Value]) -> Value {
    let mut out = String::new();
    for a in args {
        match as_text(a) {
            Ok(s) => out.push_str(&s),
            Err(e) => return Value::ErrorValue(e),
        }
    }
    Value::Text(out)
}

fn substitute(args: &[Value]) -> Value {
    let text = match as_text(&args[0]) {
        Ok(s) => s,
        Err(e) => return Value::ErrorValue(e),
    };
    let old = match as_text(&args[1]) {
        Ok(s) => s,
        Err(e) => return Value::ErrorValue(e),
    };
    let new = match as_text(&args[2]) {
        Ok(s) => s,
        Err(e) => return Value::ErrorValue(e),
    };
    if old.is_empty() {
        return Value::ErrorValue(ExcelError::Value);
    }
    Value::Text(text.replace(&old, &new))
}

/// `TEXTJOIN(sep, skip_blanks, array_literal)` (SPEC_FULL §3; spec §4.4):
/// `skip_blanks` controls whether `Blank` slots in the array literal are
/// elided or emitted as an empty field between separators.
fn textjoin(args: &[Value]) -> Value {
    let sep = match as_text(&args[0]) {
        Ok(s) => s,
        Err(e) => return Value::ErrorValue(e),
    };
    let skip_blanks = match &args[1] {
        Value::Bool(b) => *b,
        other => match crate::broadcast::coerce_numeric(other) {
            Ok(n) => n != 0.0,
            Err(e) => return Value::ErrorValue(e),
        },
    };
    let items: Vec<Value> = match &args[2] {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        if let Some(e) = item.as_error() {
            return Value::ErrorValue(e);
        }
        match item {
            Value::Blank => {
                if !skip_blanks {
                    parts.push(String::new());
                }
            }
            other => parts.push(other.to_string()),
        }
    }
    Value::Text(parts.join(&sep))
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
    fn textjoin_skips_blanks_when_asked() {
        let arr = Value::Array(vec![
            Value::Text("1".into()),
            Value::Blank,
            Value::Text("2".into()),
            Value::Text("3".into()),
        ]);
        assert_eq!(
            call("TEXTJOIN", &[Value::Text(";".into()), Value::Bool(true), arr]),
            Value::Text("1;2;3".into())
        );
    }

    #[test]
    fn textjoin_keeps_blanks_as_empty_fields() {
        let arr = Value::Array(vec![
            Value::Text("1".into()),
            Value::Blank,
            Value::Text("2".into()),
            Value::Text("3".into()),
        ]);
        assert_eq!(
            call("TEXTJOIN", &[Value::Text(";".into()), Value::Bool(false), arr]),
            Value::Text("1;;2;3".into())
        );
    }

    #[test]
    fn substitute_rejects_empty_old_text() {
        assert_eq!(
            call(
                "SUBSTITUTE",
                &[Value::Blank, Value::Blank, Value::Blank]
            ),
            Value::ErrorValue(ExcelError::Value)
        );
    }

    #[test]
    fn len_on_array_is_value_error() {
        assert_eq!(
            call("LEN", &[Value::Array(vec![Value::Number(1.0)])]),
            Value::ErrorValue(ExcelError::Value)
        );
    }
}
