//! The parsed syntax tree (spec §3 "Thunk": "a compiled AST plus captured
//! constants"). Pure data — no evaluation lives here; `sheetformula-eval`
//! walks this tree to build a `Thunk`.

use sheetformula_common::{Arity, CellRef, ExcelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

/// One slot in an argument list or array literal: either an expression, or
/// a gap left by adjacent separators (spec §4.3 "Blank slot").
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Blank,
    Expr(Ast),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Text(String),
    XlError(ExcelError),
    /// A name shaped like a cell address (`A1`, `$A$1`, ...). Resolved
    /// binding-first at evaluation time (spec §4.3: "resolved as variable
    /// names if the binding map contains that key; otherwise as cells").
    CellRef(CellRef),
    /// Any other bare identifier — looked up only in the binding map.
    Variable(String),
    Unary(UnaryOp, Box<Ast>),
    Binary(BinaryOp, Box<Ast>, Box<Ast>),
    Percent(Box<Ast>),
    /// `{a; b; c}` (spec §4.3 "Array literal").
    Array(Vec<Slot>),
    Call {
        name: String,
        arity: Arity,
        args: Vec<Slot>,
    },
}
