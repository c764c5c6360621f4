//! Spreadsheet-style error sentinels.
//!
//! Errors are *values*, not exceptions (spec §7): a closed set of singleton
//! codes that propagate through computations like any other [`crate::Value`].

use std::fmt;

/// One of the closed set of spreadsheet error sentinels.
///
/// Each variant is a distinct singleton — two `ExcelError`s are equal iff
/// they are the same kind. `Na`/`Null`/`Error` are reserved for specific
/// built-ins (§7); the others are raised directly by the lexer, parser,
/// and runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExcelError {
    /// Division or modulo by zero; `LOG` of a non-positive number.
    Div0,
    /// Type coercion failure, fixed-arity mismatch, or array-length mismatch.
    Value,
    /// Unrecognised lexer character, or an unregistered function name.
    Name,
    /// Numeric domain error (e.g. `SQRT(-1)`).
    Num,
    /// Cell resolver reported "no such cell".
    Ref,
    /// Reserved; raised by specific built-ins (e.g. lookup functions).
    Na,
    /// Reserved; raised by specific built-ins.
    Null,
    /// Structural parse failure, or a built-in's generic failure sentinel.
    Error,
}

impl ExcelError {
    /// The canonical spreadsheet spelling, e.g. `"#DIV/0!"`.
    pub const fn code(self) -> &'static str {
        match self {
            ExcelError::Div0 => "#DIV/0!",
            ExcelError::Value => "#VALUE!",
            ExcelError::Name => "#NAME?",
            ExcelError::Num => "#NUM!",
            ExcelError::Ref => "#REF!",
            ExcelError::Na => "#N/A",
            ExcelError::Null => "#NULL!",
            ExcelError::Error => "#ERROR!",
        }
    }

    /// Parse a token like `#VALUE!` or `#N/A` into its error kind.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "#DIV/0!" => ExcelError::Div0,
            "#VALUE!" => ExcelError::Value,
            "#NAME?" => ExcelError::Name,
            "#NUM!" => ExcelError::Num,
            "#REF!" => ExcelError::Ref,
            "#N/A" => ExcelError::Na,
            "#NULL!" => ExcelError::Null,
            "#ERROR!" => ExcelError::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for ExcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::error::Error for ExcelError {}
