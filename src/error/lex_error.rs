#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during tokenization.
pub enum LexError {
    /// A character that starts no token.
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// A numeric literal that violates the literal grammar.
    MalformedNumber {
        /// Details about the violation.
        details: String,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// A string literal with no closing quote before newline or end of input.
    UnterminatedString {
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// A `%{` block comment with no matching `%}`.
    UnterminatedBlockComment {
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// A closing bracket with no matching opener, or of the wrong kind.
    MismatchedBracket {
        /// The bracket that was expected, if any was open.
        expected: Option<char>,
        /// The bracket that was found.
        found: char,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// An opening bracket still unclosed at end of input.
    UnclosedBracket {
        /// The bracket left open.
        open: char,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter { character, line, col } => {
                write!(f, "Unexpected character '{character}' at line {line} col {col}")
            }
            Self::MalformedNumber { details, line, col } => {
                write!(f, "{details} at line {line} col {col}")
            }
            Self::UnterminatedString { line, col } => {
                write!(f, "Unterminated string literal at line {line} col {col}")
            }
            Self::UnterminatedBlockComment { line, col } => {
                write!(f, "Unterminated block comment at line {line} col {col}")
            }
            Self::MismatchedBracket { expected: Some(e), found, line, col } => {
                write!(
                    f,
                    "Mismatched bracket: expected '{e}' but found '{found}' at line {line} col {col}"
                )
            }
            Self::MismatchedBracket { expected: None, found, line, col } => {
                write!(
                    f,
                    "Unexpected closing '{found}' without matching open at line {line} col {col}"
                )
            }
            Self::UnclosedBracket { open, line, col } => {
                write!(f, "Unclosed bracket '{open}' at line {line} col {col}")
            }
        }
    }
}

impl std::error::Error for LexError {}
