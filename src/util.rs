/// Numeric conversion helpers.
///
/// Small, explicit conversions between `f64` and the index/count types,
/// so the casts the interpreter needs are confined to one place.
pub mod num;
