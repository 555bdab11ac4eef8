/// Lexical scopes and the global store.
///
/// Environments form a parent-linked chain consulted by the read and
/// write orders of the language; closure snapshots deep-copy the chain
/// up to the root. The global store backs `global` declarations.
pub mod environment;
/// The evaluator.
///
/// The tree-walking execution engine: statement and expression dispatch,
/// the indexing and assignment machinery, control-flow signals, function
/// calls, and display.
pub mod evaluator;
/// The lexer.
///
/// Turns source text into tokens while resolving the context-sensitive
/// ambiguities of the surface syntax: transpose versus string quotes,
/// matrix whitespace, block comments, and line continuations.
pub mod lexer;
/// The parser.
///
/// Builds the abstract syntax tree from the token stream with the
/// language's operator precedence, including the multi-assignment
/// lookahead and matrix/cell row structure.
pub mod parser;
/// The operator and function registry.
///
/// Three injectable maps — binary operators, unary operators, named
/// functions — keyed by symbol strings. The standard library populates
/// them at startup.
pub mod registry;
/// Runtime values.
///
/// The tagged value representation: column-major buffers with
/// copy-on-write, shapes, complex numbers, cells, structs, and function
/// handles.
pub mod value;
