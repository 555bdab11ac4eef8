/// Parser navigation, blocks, and separators.
///
/// Declares the [`Parser`](core::Parser) struct over the token slice and
/// the shared machinery every rule uses: lookahead, consumption with
/// diagnostics, newline/terminator skipping, and block parsing.
pub mod core;
/// The expression grammar.
///
/// Implements the precedence ladder from short-circuit `||` down to
/// primaries, the postfix forms (calls, cell indexing, field access,
/// transposes), matrix/cell row literals, and the `@` forms.
pub mod expression;
/// The statement grammar.
///
/// Implements statements and control flow: assignments (including the
/// speculative multi-assignment lookahead and delete-assignment),
/// `if`/`for`/`while`/`switch`/`try`, declarations, and function
/// definitions with optional output signatures.
pub mod statement;

pub use self::core::Parser;

use crate::{ast::Block, error::Error};

/// Tokenizes and parses a source string into its root block.
///
/// # Errors
/// Returns the lexer's or parser's error, already carrying positions.
pub fn parse_source(source: &str) -> Result<Block, Error> {
    let tokens = crate::interpreter::lexer::tokenize(source)?;
    let mut parser = Parser::new(&tokens);
    parser.parse().map_err(Error::from)
}
