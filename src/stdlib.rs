//! The standard-library collaborator.
//!
//! The evaluator core registers no arithmetic of its own; this module
//! populates the operator and function registry at startup. Hosts that
//! want a different library can install their own entries instead of, or
//! on top of, these.

use crate::interpreter::evaluator::Interpreter;

/// Shared element-wise machinery: numeric views, broadcasting, shape
/// conformance, and complex promotion.
pub mod helpers;
/// Output and error functions: `disp`, `fprintf`, `sprintf`, `error`.
pub mod io;
/// Scalar math, reductions, and rounding.
pub mod math;
/// Construction and introspection of arrays.
pub mod matrix;
/// The binary and unary operator tables.
pub mod ops;
/// Complex-number accessors.
pub mod complex;
/// String functions.
pub mod strings;
/// Type predicates, conversions, and cell/struct utilities.
pub mod types;

/// Installs the whole standard library into an interpreter's registry.
pub fn install(interp: &mut Interpreter) {
    ops::install(interp);
    math::install(interp);
    matrix::install(interp);
    complex::install(interp);
    strings::install(interp);
    types::install(interp);
    io::install(interp);
}
