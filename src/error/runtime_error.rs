#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can be raised during evaluation.
///
/// Runtime errors carry messages that name the offending construct; unlike
/// lex and parse errors they do not carry source positions, matching the
/// error surface of the language.
pub enum RuntimeError {
    /// A name that is neither a variable nor a known function.
    Undefined {
        /// The name that failed to resolve.
        name: String,
    },
    /// A value of the wrong kind for the attempted operation.
    TypeMismatch {
        /// Details naming the operation and the offending kind.
        details: String,
    },
    /// Array shapes that do not conform for the attempted operation.
    DimensionMismatch {
        /// Details naming the operation.
        details: String,
    },
    /// An index outside the bounds of the indexed dimension.
    IndexOutOfRange {
        /// Which index position was out of range (for example "row index").
        context: String,
        /// The 1-based index that was requested.
        found: usize,
        /// The length of the indexed dimension.
        limit: usize,
    },
    /// An index that is not a positive integer.
    NonPositiveIndex {
        /// The offending index value.
        found: f64,
    },
    /// Narrowing a complex value with nonzero imaginary part to a real.
    ComplexToReal,
    /// A colon expression with a zero step.
    ZeroColonStep,
    /// An operation the value kind does not support.
    Unsupported {
        /// Details naming the operation and kind.
        details: String,
    },
    /// The recursion depth bound was exceeded.
    RecursionDepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },
    /// A function called with an argument count it does not accept.
    BadArity {
        /// The function name.
        name: String,
        /// Details about the accepted count.
        details: String,
    },
    /// An assignment to something that is not an lvalue.
    InvalidAssignmentTarget,
    /// `break` or `continue` with no enclosing loop.
    ControlOutsideLoop {
        /// The keyword that was used.
        keyword: &'static str,
    },
    /// An error raised from the interpreted language via `error(...)`.
    Raised {
        /// The user-supplied message.
        message: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined { name } => {
                write!(f, "Undefined variable or function: {name}")
            }
            Self::TypeMismatch { details } => write!(f, "{details}"),
            Self::DimensionMismatch { details } => write!(f, "{details}"),
            Self::IndexOutOfRange { context, found, limit } => {
                write!(f, "Index exceeds array dimensions ({context}: {found} > {limit})")
            }
            Self::NonPositiveIndex { found } => {
                write!(f, "Array indices must be positive integers, got {found}")
            }
            Self::ComplexToReal => {
                write!(f, "Cannot convert complex with nonzero imaginary part to double scalar")
            }
            Self::ZeroColonStep => write!(f, "Colon step cannot be zero"),
            Self::Unsupported { details } => write!(f, "{details}"),
            Self::RecursionDepthExceeded { max } => {
                write!(f, "Maximum recursion depth ({max}) exceeded")
            }
            Self::BadArity { name, details } => {
                write!(f, "Wrong number of arguments to '{name}': {details}")
            }
            Self::InvalidAssignmentTarget => write!(f, "Invalid assignment target"),
            Self::ControlOutsideLoop { keyword } => {
                write!(f, "'{keyword}' used outside of a loop")
            }
            Self::Raised { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
