//! The `Value` data model (spec §3).

use std::fmt;

use crate::cellref::CellRef;
use crate::error::ExcelError;

/// A spreadsheet value: a scalar, a rank-1 array, a propagating error, a
/// blank argument slot, or an unresolved cell reference.
///
/// `Array` holds boxed `Value`s rather than bare `f64`s: most array
/// operations are purely numeric (spec §3's "`Number|Bool`" wording), but
/// `TEXTJOIN`'s array-literal argument (spec §4.4, §8) carries `Text` and
/// `Blank` members directly, so a rank-1 array must be able to represent
/// any non-array element. Array elements are never themselves `Array` or
/// `CellRef` — arrays are rank-1 and array literals never nest.
///
/// `Value` is never an uninitialised mixed state — conversions between
/// variants are explicit, performed by the broadcasting runtime
/// (`sheetformula-eval`), never implicitly by this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Array(Vec<Value>),
    ErrorValue(ExcelError),
    /// An argument slot present in the source but evaluating nothing, e.g.
    /// the middle slot of `SUM(A,, B)` (spec §4.3, Glossary "Blank slot").
    Blank,
    CellRef(CellRef),
}

impl Value {
    pub fn error(kind: ExcelError) -> Self {
        Value::ErrorValue(kind)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::ErrorValue(_))
    }

    pub fn as_error(&self) -> Option<ExcelError> {
        match self {
            Value::ErrorValue(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Length for broadcasting purposes: arrays report their length, every
    /// other variant is length 1 (spec §3: "a length-1 array is
    /// semantically indistinguishable from its scalar counterpart").
    pub fn broadcast_len(&self) -> usize {
        match self {
            Value::Array(v) => v.len().max(1),
            _ => 1,
        }
    }

    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Text(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "{{")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}}")
            }
            Value::ErrorValue(e) => write!(f, "{e}"),
            Value::Blank => Ok(()),
            Value::CellRef(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ExcelError> for Value {
    fn from(e: ExcelError) -> Self {
        Value::ErrorValue(e)
    }
}
