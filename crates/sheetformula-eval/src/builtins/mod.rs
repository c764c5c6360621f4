//! Built-in function catalogue (spec §4.1, SPEC_FULL §3), registered into
//! the process-wide [`sheetformula_common::Registry`] once at startup
//! (spec §5: "populate at startup ... then read-only").
//!
//! Grounded on the teacher's `formualizer-eval::builtins::load_builtins`,
//! which calls one `register` per leaf module in a fixed order before any
//! parsing happens.

mod logical;
mod math;
mod stats;
mod text;

use std::sync::Once;

static INIT: Once = Once::new();

/// Idempotent: safe to call from every entry point (the facade's `Parser`
/// constructor, tests, the CLI) without double-registering.
pub fn load() {
    INIT.call_once(|| {
        math::register();
        stats::register();
        logical::register();
        text::register();
        log::debug!(
            "builtins registered: {} functions",
            sheetformula_common::Registry::global().len()
        );
    });
}
