//! The function registry (spec §4.1): a process-wide, case-insensitive
//! mapping from function name to arity policy and evaluator, built once at
//! startup and read-only thereafter.
//!
//! Grounded on the teacher's `formualizer-eval::function_registry` module,
//! which holds the same shape (a `DashMap` behind a `once_cell::sync::Lazy`,
//! populated by `register_builtins`-style calls before first use). It lives
//! in this crate rather than in `sheetformula-eval` because the lexer
//! (`sheetformula-parse`) must be able to query a name's arity *before*
//! parsing, to classify `FUNCTION` tokens without backtracking (spec §4.2).

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::value::Value;

/// Host-side misuse of the registry — never raised by evaluating a formula,
/// only by a caller wiring up built-ins incorrectly (SPEC_FULL §4.1:
/// "truly exceptional host-side misuse").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("function {0:?} is already registered")]
    DuplicateName(String),
}

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments; a call with any other count is `#VALUE!`
    /// (spec §4.3, §7).
    Fixed(usize),
    /// Any number of arguments, including zero.
    Variadic,
}

/// A registered built-in: pure, total over its argument slice (never
/// panics — out-of-domain inputs return `Value::ErrorValue`).
pub type Evaluator = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

struct Entry {
    arity: Arity,
    evaluator: Evaluator,
}

/// Read access to the registry's arity table, independent of evaluation.
/// Implemented by [`Registry`] itself and by test doubles (e.g. `NoFunctions`)
/// so the lexer can be exercised without linking the evaluator crate.
pub trait FunctionLookup {
    fn arity(&self, name_upper: &str) -> Option<Arity>;
}

/// The process-wide registry singleton.
pub struct Registry {
    entries: DashMap<String, Entry>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry {
    entries: DashMap::new(),
});

impl Registry {
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Register one function under every alias in `names` (spec §4.1:
    /// "alias-capable"). Called by `sheetformula-eval`'s built-in modules
    /// during startup, before any formula is parsed.
    pub fn register(&self, names: &[&str], arity: Arity, evaluator: Evaluator) {
        for name in names {
            self.entries.insert(
                name.to_ascii_uppercase(),
                Entry {
                    arity,
                    evaluator: evaluator.clone(),
                },
            );
        }
    }

    /// Like [`Registry::register`], but rejects a name already present
    /// instead of silently overwriting it. Intended for host code adding
    /// custom built-ins at runtime, where a collision is a programmer
    /// mistake rather than a spreadsheet-level condition.
    pub fn try_register(
        &self,
        names: &[&str],
        arity: Arity,
        evaluator: Evaluator,
    ) -> Result<(), RegistryError> {
        for name in names {
            let key = name.to_ascii_uppercase();
            if self.entries.contains_key(&key) {
                return Err(RegistryError::DuplicateName(key));
            }
        }
        self.register(names, arity, evaluator);
        Ok(())
    }

    pub fn get(&self, name_upper: &str) -> Option<(Arity, Evaluator)> {
        self.entries
            .get(name_upper)
            .map(|e| (e.arity, e.evaluator.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FunctionLookup for Registry {
    fn arity(&self, name_upper: &str) -> Option<Arity> {
        self.entries.get(name_upper).map(|e| e.arity)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Registry({} functions)", self.entries.len())
    }
}

/// A `FunctionLookup` that knows no functions, for testing the lexer/parser
/// in isolation from the registered built-ins.
pub struct NoFunctions;

impl FunctionLookup for NoFunctions {
    fn arity(&self, _name_upper: &str) -> Option<Arity> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Evaluator {
        Arc::new(|_| Value::Blank)
    }

    #[test]
    fn try_register_rejects_duplicate_name() {
        let reg = Registry {
            entries: DashMap::new(),
        };
        reg.try_register(&["ONLYHERE"], Arity::Fixed(1), noop()).unwrap();
        let err = reg.try_register(&["ONLYHERE"], Arity::Fixed(1), noop()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("ONLYHERE".into()));
    }
}
