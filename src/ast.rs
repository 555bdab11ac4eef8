/// Represents a binary operator of the surface language.
///
/// Binary operators cover arithmetic (matrix and element-wise forms are
/// distinct symbols), comparisons, and the element-wise logical operators.
/// The short-circuit forms `&&`/`||` are listed here too, but the evaluator
/// never dispatches them through the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Matrix multiplication (`*`)
    Mul,
    /// Matrix right division (`/`)
    Div,
    /// Matrix left division (`\`)
    LeftDiv,
    /// Element-wise multiplication (`.*`)
    ElemMul,
    /// Element-wise division (`./`)
    ElemDiv,
    /// Element-wise left division (`.\`)
    ElemLeftDiv,
    /// Matrix power (`^`)
    Pow,
    /// Element-wise power (`.^`)
    ElemPow,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`~=`)
    NotEqual,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Element-wise logical and (`&`)
    And,
    /// Element-wise logical or (`|`)
    Or,
    /// Short-circuit logical and (`&&`)
    AndAnd,
    /// Short-circuit logical or (`||`)
    OrOr,
}

impl BinaryOperator {
    /// Returns the canonical symbol under which the operator is registered.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::LeftDiv => "\\",
            Self::ElemMul => ".*",
            Self::ElemDiv => "./",
            Self::ElemLeftDiv => ".\\",
            Self::Pow => "^",
            Self::ElemPow => ".^",
            Self::Equal => "==",
            Self::NotEqual => "~=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::And => "&",
            Self::Or => "|",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Represents a unary operator.
///
/// The two transpose forms are postfix; negation and logical not are prefix.
/// All four are dispatched through the unary registry by symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (`-x`).
    Negate,
    /// Element-wise logical not (`~x`).
    Not,
    /// Conjugate transpose (`x'`).
    Transpose,
    /// Non-conjugate transpose (`x.'`).
    ElemTranspose,
}

impl UnaryOperator {
    /// Returns the canonical symbol under which the operator is registered.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "~",
            Self::Transpose => "'",
            Self::ElemTranspose => ".'",
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An abstract syntax tree node representing an expression.
///
/// `Expr` covers everything that produces a value: literals, identifiers,
/// operator applications, calls (which double as array indexing until the
/// evaluator resolves the name), cell indexing, field access, matrix and
/// cell literals with their row structure, colon expressions, `end` inside
/// an index position, and the two `@` forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal such as `42`, `3.14`, `0xff`, or `1e-3`.
    Number {
        /// The literal value.
        value: f64,
        /// Line number in the source code.
        line: usize,
    },
    /// An imaginary numeric literal such as `2i` or `0.5j`.
    ImagNumber {
        /// The imaginary part.
        value: f64,
        /// Line number in the source code.
        line: usize,
    },
    /// A string literal, from either quote style.
    Str {
        /// The decoded string contents.
        value: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A boolean literal, `true` or `false`.
    Bool {
        /// The literal value.
        value: bool,
        /// Line number in the source code.
        line: usize,
    },
    /// Reference to a variable or function by name.
    Identifier {
        /// The name.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOperator,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// A unary operation (prefix or postfix).
    Unary {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        operand: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// `target(args)` — a function call or an array index read.
    ///
    /// The parser cannot distinguish the two; the evaluator resolves the
    /// target against the environment at run time.
    Call {
        /// The callee or indexed value.
        target: Box<Expr>,
        /// Argument or index expressions.
        args: Vec<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// `target{indices}` — cell content indexing.
    CellIndex {
        /// The indexed cell expression.
        target: Box<Expr>,
        /// Index expressions.
        indices: Vec<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// `target.field` — struct field access.
    FieldAccess {
        /// The struct expression.
        target: Box<Expr>,
        /// The field name.
        field: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A matrix literal `[...]` as an ordered list of rows.
    Matrix {
        /// Rows, each an ordered list of element expressions.
        rows: Vec<Vec<Expr>>,
        /// Line number in the source code.
        line: usize,
    },
    /// A cell literal `{...}` as an ordered list of rows.
    Cell {
        /// Rows, each an ordered list of element expressions.
        rows: Vec<Vec<Expr>>,
        /// Line number in the source code.
        line: usize,
    },
    /// A bare `:` in an index argument position ("all of this dimension").
    Colon {
        /// Line number in the source code.
        line: usize,
    },
    /// A range `start:stop` or `start:step:stop`.
    Range {
        /// The first enumerated value.
        start: Box<Expr>,
        /// Optional step; `1` when absent.
        step: Option<Box<Expr>>,
        /// The endpoint (honoured with MATLAB endpoint tolerance).
        stop: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// `end` inside an index position: the length of the indexed dimension.
    End {
        /// Line number in the source code.
        line: usize,
    },
    /// `@name` — a handle to a named function.
    FuncHandle {
        /// The function name.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// `@(params) expr` — an anonymous function.
    AnonFunc {
        /// Formal parameter names.
        params: Vec<String>,
        /// The body expression.
        body: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
}

impl Expr {
    /// Gets the source line number from `self`.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Number { line, .. }
            | Self::ImagNumber { line, .. }
            | Self::Str { line, .. }
            | Self::Bool { line, .. }
            | Self::Identifier { line, .. }
            | Self::Binary { line, .. }
            | Self::Unary { line, .. }
            | Self::Call { line, .. }
            | Self::CellIndex { line, .. }
            | Self::FieldAccess { line, .. }
            | Self::Matrix { line, .. }
            | Self::Cell { line, .. }
            | Self::Colon { line }
            | Self::Range { line, .. }
            | Self::End { line }
            | Self::FuncHandle { line, .. }
            | Self::AnonFunc { line, .. } => *line,
        }
    }
}

/// An ordered sequence of statements.
///
/// Blocks appear as the program root, as control-flow bodies, and as user
/// function bodies. Executing a block yields the value of its last child.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// The statements in source order.
    pub stmts: Vec<Stmt>,
}

/// A `(condition, body)` pair of an `if`/`elseif` chain or a `switch` case.
pub type Branch = (Expr, Block);

/// Represents a statement.
///
/// Statements either produce observable effects (assignment, display) or
/// structure control flow. A statement terminated by `;` carries the
/// suppress flag and emits no display.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A standalone expression; its value binds `ans` unless suppressed.
    Expr {
        /// The expression to evaluate.
        expr: Expr,
        /// Whether the statement ended with `;`.
        suppress: bool,
        /// Line number in the source code.
        line: usize,
    },
    /// An assignment `target = value` where the target is an identifier,
    /// an index expression, a field chain, or a cell index.
    Assign {
        /// The assignment target expression.
        target: Expr,
        /// The value expression.
        value: Expr,
        /// Whether the statement ended with `;`.
        suppress: bool,
        /// Line number in the source code.
        line: usize,
    },
    /// A multi-assignment `[a, ~, c] = call(...)`.
    MultiAssign {
        /// Target names in order; `None` marks a `~` placeholder.
        targets: Vec<Option<String>>,
        /// The right-hand side, which must be a call expression.
        call: Expr,
        /// Whether the statement ended with `;`.
        suppress: bool,
        /// Line number in the source code.
        line: usize,
    },
    /// An element deletion `target(indices) = []`.
    DeleteAssign {
        /// The indexed target (always an `Expr::Call`).
        target: Expr,
        /// Whether the statement ended with `;`.
        suppress: bool,
        /// Line number in the source code.
        line: usize,
    },
    /// An `if`/`elseif`/`else` chain.
    If {
        /// Condition/body pairs, tested in order.
        branches: Vec<Branch>,
        /// Optional `else` body.
        else_body: Option<Block>,
        /// Line number in the source code.
        line: usize,
    },
    /// A `for` loop over the columns of its target.
    For {
        /// The loop variable name.
        var: String,
        /// The iterated expression, evaluated once.
        target: Expr,
        /// The loop body.
        body: Block,
        /// Line number in the source code.
        line: usize,
    },
    /// A `while` loop.
    While {
        /// The condition, re-evaluated each pass.
        cond: Expr,
        /// The loop body.
        body: Block,
        /// Line number in the source code.
        line: usize,
    },
    /// A `switch` statement.
    Switch {
        /// The selector, evaluated once.
        selector: Expr,
        /// Case expression/body pairs.
        cases: Vec<Branch>,
        /// Optional `otherwise` body.
        otherwise: Option<Block>,
        /// Line number in the source code.
        line: usize,
    },
    /// `break` out of the innermost loop.
    Break {
        /// Line number in the source code.
        line: usize,
    },
    /// `continue` with the next iteration of the innermost loop.
    Continue {
        /// Line number in the source code.
        line: usize,
    },
    /// `return` from the innermost function call.
    Return {
        /// Line number in the source code.
        line: usize,
    },
    /// A function definition.
    FunctionDef {
        /// The function name.
        name: String,
        /// Formal parameter names.
        params: Vec<String>,
        /// Declared return variable names.
        returns: Vec<String>,
        /// The function body.
        body: Block,
        /// Line number in the source code.
        line: usize,
    },
    /// A `try`/`catch` statement.
    TryCatch {
        /// The protected body.
        body: Block,
        /// Optional identifier bound to the error struct in the handler.
        catch_var: Option<String>,
        /// Optional handler body; absent when the `catch` clause is missing.
        handler: Option<Block>,
        /// Line number in the source code.
        line: usize,
    },
    /// A `global name...` declaration.
    Global {
        /// The declared names.
        names: Vec<String>,
        /// Line number in the source code.
        line: usize,
    },
    /// A `persistent name...` declaration.
    Persistent {
        /// The declared names.
        names: Vec<String>,
        /// Line number in the source code.
        line: usize,
    },
}
