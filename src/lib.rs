//! # matra
//!
//! matra is an interpreter for a MATLAB-style matrix language written in
//! Rust. It lexes, parses, and evaluates programs with matrices as
//! first-class values, column-major storage, 1-based indexing, colon
//! ranges, cell arrays, structs, complex numbers, anonymous functions,
//! multi-value returns, and block-structured control flow.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use crate::interpreter::evaluator::Interpreter;

/// Defines the structure of parsed code.
///
/// This module declares the expression and statement types that represent
/// source code as a tree, built by the parser and traversed by the
/// evaluator.
///
/// # Responsibilities
/// - Defines expression, statement, and operator types for all language
///   constructs, including matrix rows, colon ranges, and `end`.
/// - Attaches source line numbers to nodes for diagnostics.
pub mod ast;
/// Provides unified error types for every phase.
///
/// Lex and parse errors carry source positions; runtime errors carry
/// messages naming the offending construct. A top-level `Error` tags the
/// phase that failed.
pub mod error;
/// The language core: lexer, parser, values, environments, registry, and
/// the evaluator.
///
/// # Responsibilities
/// - Coordinates the pipeline from source text to observable effects.
/// - Exposes the programmatic surface: interpreter construction,
///   operator/function registration, output sink, recursion bound, and
///   `eval`.
pub mod interpreter;
/// The standard-library collaborator.
///
/// Populates the operator and named-function registry with the MATLAB
/// surface the core itself does not define: arithmetic, comparisons,
/// construction, introspection, strings, and printing.
pub mod stdlib;
/// General numeric conversion utilities.
pub mod util;

/// Evaluates a source string in a fresh interpreter with the standard
/// library installed, printing the final value when `echo_result` is set.
///
/// This is the convenience entry point used by the command-line driver;
/// hosts wanting persistent state or a custom library should construct an
/// [`Interpreter`] themselves.
///
/// # Errors
/// Returns an error if lexing, parsing, or evaluation fails.
///
/// # Examples
/// ```
/// use matra::run_source;
///
/// // The result of the last statement is computed; nothing is printed
/// // because the statement is suppressed and echoing is off.
/// assert!(run_source("x = 2 + 2;", false).is_ok());
///
/// // An unknown name is a runtime error.
/// assert!(run_source("y = nosuchthing + 1;", false).is_err());
/// ```
pub fn run_source(source: &str, echo_result: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);

    let result = interp.eval(source)?;
    if echo_result && !result.is_empty() {
        println!("{}", result.debug_string());
    }
    Ok(())
}
