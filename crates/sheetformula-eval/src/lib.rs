//! Function registry builtins and the broadcasting runtime that turns a
//! parsed AST into a [`Thunk`] (spec §4.1, §4.4).
//!
//! This crate is where `sheetformula-parse`'s pure `Ast` becomes runnable:
//! it owns the built-in catalogue (§4.1) and the broadcasting arithmetic,
//! comparison, and function-dispatch rules (§4.4), mirroring the
//! teacher's `formualizer-eval` sitting atop `formualizer-parse`.

pub mod broadcast;
pub mod builtins;
mod thunk;

pub use thunk::{default_resolver, CellResolver, Thunk};

/// Register every built-in exactly once. Call before parsing any formula
/// that uses them (the facade's `Parser` does this automatically).
pub fn load_builtins() {
    builtins::load();
}
