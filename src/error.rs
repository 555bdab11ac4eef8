/// Lexical errors.
///
/// Defines all error types that can occur while tokenizing source code,
/// such as malformed literals, unterminated strings or block comments,
/// and bracket mismatches. Every variant carries the line and column
/// where the problem was detected.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all error types that can occur while building the syntax tree
/// from the token stream. Parse errors include unexpected tokens, missing
/// terminators, and premature end of input, each with a source position.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation:
/// undefined names, type and dimension mismatches, bad indices, recursion
/// limits, and errors raised by `error(...)` in the interpreted language.
pub mod runtime_error;

pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Any error an [`eval`](crate::interpreter::evaluator::Interpreter::eval)
/// call can surface, tagged by the phase that produced it.
#[derive(Debug)]
pub enum Error {
    /// The lexer rejected the source text.
    Lex(LexError),
    /// The parser rejected the token stream.
    Parse(ParseError),
    /// Evaluation failed.
    Runtime(RuntimeError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}
