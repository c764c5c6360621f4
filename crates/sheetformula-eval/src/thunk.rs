//! The `Thunk` (spec §3): a compiled AST plus captured constants (here, the
//! cell resolver), invoked with a binding map to produce a `Value`.
//!
//! This is where the parser's pure `Ast` finally meets the function
//! registry and becomes runnable — mirroring the split between the
//! teacher's `formualizer-parse::ASTNode` and `formualizer-eval`'s
//! interpreter that walks it.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use sheetformula_common::{Arity, CellRef, ExcelError, Registry, Value};
use sheetformula_parse::{Ast, BinaryOp, Slot, UnaryOp};

use crate::broadcast;

/// Resolves a `CellRef` that did not match any key in the binding map
/// (spec §6: "defaults to returning `Blank`").
pub type CellResolver = Arc<dyn Fn(CellRef) -> Value + Send + Sync>;

pub fn default_resolver() -> CellResolver {
    Arc::new(|_| Value::Blank)
}

#[derive(Clone)]
pub struct Thunk {
    ast: Arc<Ast>,
    cell_resolver: CellResolver,
}

impl Thunk {
    pub fn new(ast: Ast) -> Self {
        Thunk {
            ast: Arc::new(ast),
            cell_resolver: default_resolver(),
        }
    }

    pub fn with_resolver(ast: Ast, cell_resolver: CellResolver) -> Self {
        Thunk {
            ast: Arc::new(ast),
            cell_resolver,
        }
    }

    /// Build a thunk that always returns `error` regardless of bindings
    /// (spec §3: "a thunk that returns the same error").
    pub fn failing(error: ExcelError) -> Self {
        Thunk::new(Ast::XlError(error))
    }

    /// Purity (spec §8 law 1): reading `bindings` never mutates it, and the
    /// same bindings always produce the same result.
    pub fn invoke(&self, bindings: &HashMap<String, Value>) -> Value {
        eval(&self.ast, bindings, &self.cell_resolver)
    }
}

fn lookup<'a>(bindings: &'a HashMap<String, Value>, name: &str) -> Option<&'a Value> {
    bindings
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// `TRUE`/`FALSE` have no dedicated lexer terminal (spec §4.2's table omits
/// them), so they lex as plain `VARIABLE`s; when one isn't shadowed by a
/// binding it defaults to the boolean literal its spelling names, rather
/// than `Blank` like every other unbound variable (spec §8 seed scenario:
/// `TEXTJOIN(";", TRUE, ...)` with no bindings at all).
fn default_for_name(name: &str) -> Value {
    if name.eq_ignore_ascii_case("TRUE") {
        Value::Bool(true)
    } else if name.eq_ignore_ascii_case("FALSE") {
        Value::Bool(false)
    } else {
        Value::Blank
    }
}

/// Most calls take a handful of arguments, so the common case never
/// touches the heap (teacher style: `smallvec` for short per-call arg
/// lists, e.g. `formualizer-eval::args`'s `ArgKind` buffers).
fn eval_slots(slots: &[Slot], bindings: &HashMap<String, Value>, resolver: &CellResolver) -> SmallVec<[Value; 4]> {
    slots
        .iter()
        .map(|s| match s {
            Slot::Blank => Value::Blank,
            Slot::Expr(e) => eval(e, bindings, resolver),
        })
        .collect()
}

fn eval(ast: &Ast, bindings: &HashMap<String, Value>, resolver: &CellResolver) -> Value {
    match ast {
        Ast::Number(n) => Value::Number(*n),
        Ast::Text(s) => Value::Text(s.clone()),
        Ast::XlError(e) => Value::ErrorValue(*e),
        Ast::CellRef(c) => {
            let key = c.to_string();
            match lookup(bindings, &key) {
                Some(v) => v.clone(),
                None => resolver(*c),
            }
        }
        Ast::Variable(name) => lookup(bindings, name).cloned().unwrap_or_else(|| default_for_name(name)),
        Ast::Unary(UnaryOp::Neg, inner) => broadcast::negate(&eval(inner, bindings, resolver)),
        Ast::Percent(inner) => broadcast::percent(&eval(inner, bindings, resolver)),
        Ast::Binary(op, l, r) => {
            let lv = eval(l, bindings, resolver);
            let rv = eval(r, bindings, resolver);
            eval_binary(*op, &lv, &rv)
        }
        Ast::Array(slots) => Value::Array(eval_slots(slots, bindings, resolver).into_vec()),
        Ast::Call { name, arity, args } => {
            let values = eval_slots(args, bindings, resolver);
            match Registry::global().get(name) {
                None => Value::ErrorValue(ExcelError::Name),
                Some((_, evaluator)) => {
                    if let Arity::Fixed(n) = arity {
                        if values.len() != *n {
                            return Value::ErrorValue(ExcelError::Value);
                        }
                    }
                    evaluator(&values)
                }
            }
        }
    }
}

fn eval_binary(op: BinaryOp, lv: &Value, rv: &Value) -> Value {
    match op {
        BinaryOp::Add => broadcast::broadcast(&[lv.clone(), rv.clone()], |n| Ok(n[0] + n[1])),
        BinaryOp::Sub => broadcast::broadcast(&[lv.clone(), rv.clone()], |n| Ok(n[0] - n[1])),
        BinaryOp::Mul => broadcast::broadcast(&[lv.clone(), rv.clone()], |n| Ok(n[0] * n[1])),
        BinaryOp::Div => broadcast::broadcast(&[lv.clone(), rv.clone()], |n| {
            if n[1] == 0.0 {
                Err(ExcelError::Div0)
            } else {
                Ok(n[0] / n[1])
            }
        }),
        BinaryOp::Pow => broadcast::broadcast(&[lv.clone(), rv.clone()], |n| Ok(n[0].powf(n[1]))),
        BinaryOp::Concat => broadcast::concat(lv, rv),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le => {
            broadcast::compare(op, lv, rv)
        }
    }
}
