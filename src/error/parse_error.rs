#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while parsing the token stream.
pub enum ParseError {
    /// Found a token that no grammar rule accepts at this position.
    UnexpectedToken {
        /// A rendering of the token encountered.
        token: String,
        /// What the parser was expecting instead.
        expected: String,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
    /// Reached the end of input while a construct was still open.
    UnexpectedEndOfInput {
        /// What the parser was expecting next.
        expected: String,
        /// The source line where the error occurred.
        line: usize,
        /// The source column where the error occurred.
        col: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, expected, line, col } => {
                write!(
                    f,
                    "Parse error at line {line} col {col}: expected {expected}, got '{token}'"
                )
            }
            Self::UnexpectedEndOfInput { expected, line, col } => {
                write!(
                    f,
                    "Parse error at line {line} col {col}: expected {expected}, got end of input"
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}
