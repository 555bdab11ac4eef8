/// Indexed, field, cell, and delete assignments.
///
/// Implements `target = value` for every lvalue shape, with auto-grow,
/// broadcast, complex promotion, and the deletion forms of `... = []`.
pub mod assignment;
/// The environment-aware builtins: `clear`, `who`, `whos`, `exist`,
/// `class`.
pub mod builtin;
/// Loops, branches, `switch`, and `try`/`catch`, plus the `Flow` signal
/// consumption rules.
pub mod control_flow;
/// The `Interpreter` itself: construction, host surface, statement and
/// expression dispatch, ranges, and literal assembly.
pub mod core;
/// Per-kind value display through the installable output sink.
pub mod display;
/// Call resolution, user-function invocation, and anonymous functions.
pub mod function;
/// Index resolution (colon, masks, positions, `end`) and all read forms.
pub mod indexing;

pub use self::core::{Flow, Interpreter, UserFunction};
