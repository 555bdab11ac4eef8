/// Complex number arithmetic.
///
/// Defines the `Complex` pair type stored in complex buffers, with the
/// arithmetic, conjugation, and transcendental operations the operator
/// library builds on.
pub mod complex;
/// The runtime value representation.
///
/// Defines `Value` and its buffered array storage: column-major shared
/// buffers with copy-on-write, cells, insertion-ordered structs, and
/// function handles, together with the conversions the evaluator relies
/// on (scalar narrowing, truthiness, promotion to complex).
pub mod core;
/// Array shapes.
///
/// Defines `Dims` — rows, columns, pages — and the column-major index
/// arithmetic.
pub mod dims;

pub use self::complex::Complex;
pub use self::core::{CellArray, NumArray, StructValue, Value};
pub use self::dims::Dims;
