use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::value::{complex::Complex, dims::Dims},
};

/// Formats a double the way the display and `num2str` print it: integral
/// values without a fractional part, everything else with Rust's shortest
/// round-trip representation.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn fmt_double(v: f64) -> String {
    if v.is_finite() && v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Shared column-major element storage with copy-on-write.
///
/// Cloning an array copies the shape and bumps the reference count of the
/// element buffer; [`NumArray::data_mut`] detaches the buffer when it is
/// shared, so a write through one alias never disturbs another.
#[derive(Debug, Clone, PartialEq)]
pub struct NumArray<T> {
    dims: Dims,
    data: Rc<Vec<T>>,
}

impl<T: Clone + Default> NumArray<T> {
    /// Creates a zero-filled (default-filled) array of the given shape.
    #[must_use]
    pub fn new(dims: Dims) -> Self {
        Self { dims, data: Rc::new(vec![T::default(); dims.numel()]) }
    }

    /// Creates an array over an existing element vector.
    ///
    /// The vector length must equal `dims.numel()`; this is the caller's
    /// invariant.
    #[must_use]
    pub fn from_vec(dims: Dims, data: Vec<T>) -> Self {
        debug_assert_eq!(dims.numel(), data.len());
        Self { dims, data: Rc::new(data) }
    }

    /// Creates a 1×1 array holding `value`.
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self { dims: Dims::new(1, 1), data: Rc::new(vec![value]) }
    }

    /// The shape.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Total element count.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.dims.numel()
    }

    /// The elements in column-major order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The element at column-major linear position `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// Mutable access to the elements, detaching the buffer first when it
    /// is shared (copy-on-write).
    pub fn data_mut(&mut self) -> &mut Vec<T> {
        Rc::make_mut(&mut self.data)
    }

    /// Reinterprets the same elements under a new shape of equal count.
    pub fn set_dims(&mut self, dims: Dims) {
        debug_assert_eq!(dims.numel(), self.dims.numel());
        self.dims = dims;
    }

    /// Resizes to `new_rows × new_cols`, keeping elements at their
    /// `(r, c)` positions and filling new cells with `fill`.
    pub fn resize(&mut self, new_rows: usize, new_cols: usize, fill: T) {
        let old = self.dims;
        let mut data = vec![fill; new_rows * new_cols];
        let copy_rows = old.rows.min(new_rows);
        let copy_cols = old.cols.min(new_cols);
        for c in 0..copy_cols {
            for r in 0..copy_rows {
                data[c * new_rows + r] = self.data[old.sub2ind(r, c)].clone();
            }
        }
        self.dims = Dims::new(new_rows, new_cols);
        self.data = Rc::new(data);
    }

    /// Resizes to a 3-D shape, keeping elements at their `(r, c, p)`
    /// positions. A target page count of 1 collapses back to a 2-D shape.
    pub fn resize3(&mut self, new_rows: usize, new_cols: usize, new_pages: usize, fill: T) {
        if new_pages <= 1 {
            self.dims = Dims::new(self.dims.rows, self.dims.cols);
            self.resize(new_rows, new_cols, fill);
            return;
        }
        let old = self.dims;
        let mut data = vec![fill; new_rows * new_cols * new_pages];
        let new = Dims::new3(new_rows, new_cols, new_pages);
        for p in 0..old.pages.min(new_pages) {
            for c in 0..old.cols.min(new_cols) {
                for r in 0..old.rows.min(new_rows) {
                    data[new.sub2ind3(r, c, p)] = self.data[old.sub2ind3(r, c, p)].clone();
                }
            }
        }
        self.dims = new;
        self.data = Rc::new(data);
    }

    /// Grows the array so that column-major linear index `idx` is valid.
    ///
    /// A row vector grows along its row, a column vector along its column;
    /// a matrix gains whole columns, preserving its row count.
    pub fn ensure_size(&mut self, idx: usize, fill: T) {
        let needed = idx + 1;
        if needed <= self.numel() {
            return;
        }
        if self.dims.rows <= 1 {
            self.resize(1, needed, fill);
        } else if self.dims.cols == 1 {
            self.resize(needed, 1, fill);
        } else {
            let new_cols = needed.div_ceil(self.dims.rows);
            self.resize(self.dims.rows, new_cols, fill);
        }
    }
}

/// A cell array: a shaped, shared collection of child values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellArray {
    dims: Dims,
    data: Rc<Vec<Value>>,
}

impl CellArray {
    /// Creates a cell array of empty values.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            dims: Dims::new(rows, cols),
            data: Rc::new(vec![Value::Empty; rows * cols]),
        }
    }

    /// The shape.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Total cell count.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.dims.numel()
    }

    /// The cells in column-major order.
    #[must_use]
    pub fn data(&self) -> &[Value] {
        &self.data
    }

    /// The cell at column-major position `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&Value> {
        self.data.get(i)
    }

    /// Mutable access to the cells, detaching when shared.
    pub fn data_mut(&mut self) -> &mut Vec<Value> {
        Rc::make_mut(&mut self.data)
    }
}

/// A struct value: an insertion-ordered mapping from field name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    /// Creates a struct with no fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The field value, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Mutable access to a field, creating it empty when absent.
    pub fn field_mut(&mut self, name: &str) -> &mut Value {
        if let Some(i) = self.fields.iter().position(|(k, _)| k == name) {
            &mut self.fields[i].1
        } else {
            self.fields.push((name.to_string(), Value::Empty));
            &mut self.fields.last_mut().expect("just pushed").1
        }
    }

    /// Whether the field exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Removes a field; returns whether it was present.
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|(k, _)| k != name);
        self.fields.len() != before
    }

    /// The fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

/// Represents a runtime value.
///
/// This enum models every kind the language manipulates. Numeric, logical,
/// and char values own a column-major buffer shared by reference count;
/// cells own shaped child values; structs own insertion-ordered fields;
/// a function handle stores only the name that the registry resolves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The empty value `[]`: zero elements, no buffer.
    #[default]
    Empty,
    /// An IEEE-754 binary64 array.
    Double(NumArray<f64>),
    /// A complex array of interleaved `(re, im)` binary64 pairs.
    Complex(NumArray<Complex>),
    /// A logical array of `0`/`1` bytes.
    Logical(NumArray<u8>),
    /// A char array of 8-bit code units.
    Char(NumArray<u8>),
    /// A cell array.
    Cell(CellArray),
    /// A struct.
    Struct(StructValue),
    /// A handle to a named function.
    FuncHandle(String),
}

impl Value {
    // ─── factories ──────────────────────────────────────────────────

    /// A 1×1 double.
    #[must_use]
    pub fn scalar(v: f64) -> Self {
        Self::Double(NumArray::scalar(v))
    }

    /// A 1×1 logical.
    #[must_use]
    pub fn logical_scalar(v: bool) -> Self {
        Self::Logical(NumArray::scalar(u8::from(v)))
    }

    /// A 1×1 complex.
    #[must_use]
    pub fn complex_scalar(re: f64, im: f64) -> Self {
        Self::Complex(NumArray::scalar(Complex::new(re, im)))
    }

    /// A 1×n char row vector over the string's bytes.
    #[must_use]
    pub fn from_string(s: &str) -> Self {
        let bytes: Vec<u8> = s.bytes().collect();
        Self::Char(NumArray::from_vec(Dims::new(1, bytes.len()), bytes))
    }

    /// A zero-filled double matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::Double(NumArray::new(Dims::new(rows, cols)))
    }

    /// A double matrix over a column-major element vector.
    #[must_use]
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        Self::Double(NumArray::from_vec(Dims::new(rows, cols), data))
    }

    /// A 1×n double row vector.
    #[must_use]
    pub fn row_vector(data: Vec<f64>) -> Self {
        let n = data.len();
        Self::Double(NumArray::from_vec(Dims::new(1, n), data))
    }

    // ─── type queries ───────────────────────────────────────────────

    /// The class name of the value, as `class(x)` reports it.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Double(_) => "double",
            Self::Complex(_) => "complex",
            Self::Logical(_) => "logical",
            Self::Char(_) => "char",
            Self::Cell(_) => "cell",
            Self::Struct(_) => "struct",
            Self::FuncHandle(_) => "function_handle",
        }
    }

    /// The shape; 1×1 for structs and function handles, 0×0 for empty.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        match self {
            Self::Empty => Dims { rows: 0, cols: 0, pages: 1, nd: 2 },
            Self::Double(a) => a.dims(),
            Self::Complex(a) => a.dims(),
            Self::Logical(a) | Self::Char(a) => a.dims(),
            Self::Cell(c) => c.dims(),
            Self::Struct(_) | Self::FuncHandle(_) => Dims { rows: 1, cols: 1, pages: 1, nd: 2 },
        }
    }

    /// Total element count.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.dims().numel()
    }

    /// Whether the value has exactly one element.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.numel() == 1
    }

    /// Whether the value has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty) || self.numel() == 0
    }

    /// Whether the value is double or complex.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Double(_) | Self::Complex(_))
    }

    /// Whether the value is complex.
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Whether the value is logical.
    #[must_use]
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::Logical(_))
    }

    /// Whether the value is a char array.
    #[must_use]
    pub const fn is_char(&self) -> bool {
        matches!(self, Self::Char(_))
    }

    /// Whether the value is a cell array.
    #[must_use]
    pub const fn is_cell(&self) -> bool {
        matches!(self, Self::Cell(_))
    }

    /// Whether the value is a struct.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Whether the value is a function handle.
    #[must_use]
    pub const fn is_func_handle(&self) -> bool {
        matches!(self, Self::FuncHandle(_))
    }

    // ─── conversions ────────────────────────────────────────────────

    /// Narrows the value to a real scalar.
    ///
    /// # Errors
    /// Fails for non-scalar values, for kinds without a numeric reading,
    /// and for complex values with a nonzero imaginary part.
    pub fn to_scalar(&self) -> Result<f64, RuntimeError> {
        match self {
            Self::Double(a) if a.numel() == 1 => Ok(a.data()[0]),
            Self::Complex(a) if a.numel() == 1 => {
                let c = a.data()[0];
                if c.im != 0.0 {
                    return Err(RuntimeError::ComplexToReal);
                }
                Ok(c.re)
            }
            Self::Logical(a) if a.numel() == 1 => Ok(f64::from(a.data()[0])),
            Self::Char(a) if a.numel() == 1 => Ok(f64::from(a.data()[0])),
            _ => Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to scalar", self.kind_name()),
            }),
        }
    }

    /// Coerces the value to a condition truth value.
    ///
    /// Scalars are true iff nonzero; a non-scalar double or logical array
    /// is true iff every element is nonzero; an empty value is false.
    ///
    /// # Errors
    /// Fails for kinds without a truth reading.
    pub fn to_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Self::Empty => Ok(false),
            Self::Double(a) => {
                Ok(a.numel() > 0 && a.data().iter().all(|&v| v != 0.0))
            }
            Self::Logical(a) => Ok(a.numel() > 0 && a.data().iter().all(|&v| v != 0)),
            Self::Complex(a) if a.numel() == 1 => {
                let c = a.data()[0];
                Ok(c.re != 0.0 || c.im != 0.0)
            }
            _ => Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to bool", self.kind_name()),
            }),
        }
    }

    /// Narrows the value to a complex scalar.
    ///
    /// # Errors
    /// Fails for non-scalar values and for kinds without a numeric reading.
    pub fn to_complex(&self) -> Result<Complex, RuntimeError> {
        match self {
            Self::Complex(a) if a.numel() == 1 => Ok(a.data()[0]),
            Self::Double(a) if a.numel() == 1 => Ok(Complex::from(a.data()[0])),
            Self::Logical(a) if a.numel() == 1 => Ok(Complex::from(f64::from(a.data()[0]))),
            _ => Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to complex", self.kind_name()),
            }),
        }
    }

    /// Reads the value as a string.
    ///
    /// Char arrays decode their code units; function handles yield their
    /// name.
    ///
    /// # Errors
    /// Fails for every other kind.
    pub fn to_string_value(&self) -> Result<String, RuntimeError> {
        match self {
            Self::Char(a) => Ok(String::from_utf8_lossy(a.data()).into_owned()),
            Self::FuncHandle(name) => Ok(name.clone()),
            _ => Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to string", self.kind_name()),
            }),
        }
    }

    // ─── mutation ───────────────────────────────────────────────────

    /// Grows the value so that column-major linear index `idx` is valid.
    ///
    /// An empty value first becomes a 0×0 double. New cells are filled
    /// with zero, or with a space for char arrays. Kinds without a
    /// buffer are left untouched.
    pub fn ensure_size(&mut self, idx: usize) {
        if matches!(self, Self::Empty) {
            *self = Self::zeros(0, 0);
        }
        match self {
            Self::Double(a) => a.ensure_size(idx, 0.0),
            Self::Complex(a) => a.ensure_size(idx, Complex::default()),
            Self::Logical(a) => a.ensure_size(idx, 0),
            Self::Char(a) => a.ensure_size(idx, b' '),
            _ => {}
        }
    }

    /// Resizes a buffered value to `rows × cols`, preserving positions.
    /// A 3-D value keeps its page count.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if self.dims().is_3d() {
            self.resize3(rows, cols, self.dims().pages);
            return;
        }
        match self {
            Self::Double(a) => a.resize(rows, cols, 0.0),
            Self::Complex(a) => a.resize(rows, cols, Complex::default()),
            Self::Logical(a) => a.resize(rows, cols, 0),
            Self::Char(a) => a.resize(rows, cols, b' '),
            _ => {}
        }
    }

    /// Resizes a buffered value to a 3-D shape, preserving positions.
    pub fn resize3(&mut self, rows: usize, cols: usize, pages: usize) {
        match self {
            Self::Double(a) => a.resize3(rows, cols, pages, 0.0),
            Self::Complex(a) => a.resize3(rows, cols, pages, Complex::default()),
            Self::Logical(a) => a.resize3(rows, cols, pages, 0),
            Self::Char(a) => a.resize3(rows, cols, pages, b' '),
            _ => {}
        }
    }

    /// Widens a double value to complex in place.
    ///
    /// # Errors
    /// Fails for kinds other than double and complex.
    pub fn promote_to_complex(&mut self) -> Result<(), RuntimeError> {
        match self {
            Self::Complex(_) => Ok(()),
            Self::Double(a) => {
                let data: Vec<Complex> = a.data().iter().map(|&v| Complex::from(v)).collect();
                *self = Self::Complex(NumArray::from_vec(a.dims(), data));
                Ok(())
            }
            other => Err(RuntimeError::TypeMismatch {
                details: format!("Can only promote double to complex, got {}", other.kind_name()),
            }),
        }
    }

    /// A compact one-line summary used by struct and cell displays.
    #[must_use]
    pub fn debug_string(&self) -> String {
        let d = self.dims();
        let shape = if d.is_3d() {
            format!("[{}x{}x{}]", d.rows, d.cols, d.pages)
        } else {
            format!("[{}x{}]", d.rows, d.cols)
        };
        match self {
            Self::Empty => "empty [0x0]".to_string(),
            Self::Double(a) => {
                if a.numel() == 1 {
                    format!("double {shape} = {}", fmt_double(a.data()[0]))
                } else if a.numel() <= 20 {
                    let elems: Vec<String> =
                        a.data().iter().map(|&v| fmt_double(v)).collect();
                    format!("double {shape} = [{}]", elems.join(", "))
                } else {
                    format!("double {shape}")
                }
            }
            Self::Complex(a) => {
                if a.numel() == 1 {
                    format!("complex {shape} = {}", a.data()[0])
                } else {
                    format!("complex {shape}")
                }
            }
            Self::Logical(a) => {
                if a.numel() == 1 {
                    format!(
                        "logical {shape} = {}",
                        if a.data()[0] != 0 { "true" } else { "false" }
                    )
                } else {
                    format!("logical {shape}")
                }
            }
            Self::Char(a) => {
                format!("char {shape} = '{}'", String::from_utf8_lossy(a.data()))
            }
            Self::Cell(_) => format!("cell {shape}"),
            Self::Struct(s) => format!("struct with {} fields", s.fields().len()),
            Self::FuncHandle(name) => format!("@{name}"),
        }
    }
}
