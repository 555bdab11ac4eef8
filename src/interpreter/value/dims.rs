use crate::error::RuntimeError;

/// The shape of an array value: rows, columns, and pages.
///
/// Arrays are at most three-dimensional; the page dimension defaults to 1
/// and `nd` records whether the value is logically 2-D or 3-D. Elements
/// are stored column-major: columns are contiguous, pages follow each
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Number of pages (third dimension).
    pub pages: usize,
    /// Declared rank: 2 or 3.
    pub nd: u8,
}

impl Default for Dims {
    fn default() -> Self {
        Self { rows: 0, cols: 0, pages: 1, nd: 2 }
    }
}

impl Dims {
    /// Creates a 2-D shape.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, pages: 1, nd: 2 }
    }

    /// Creates a 3-D shape.
    #[must_use]
    pub const fn new3(rows: usize, cols: usize, pages: usize) -> Self {
        Self { rows, cols, pages, nd: 3 }
    }

    /// Total element count.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.rows * self.cols * self.pages
    }

    /// Whether the shape holds exactly one element.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.numel() == 1
    }

    /// Whether the shape holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// A value is a vector iff it is 2-D with a single row or column.
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        self.nd == 2 && (self.rows == 1 || self.cols == 1)
    }

    /// Whether the shape is genuinely three-dimensional.
    #[must_use]
    pub const fn is_3d(&self) -> bool {
        self.nd == 3 && self.pages > 1
    }

    /// The extent of dimension `dim` (0 = rows, 1 = cols, 2 = pages).
    #[must_use]
    pub const fn dim_size(&self, dim: usize) -> usize {
        match dim {
            0 => self.rows,
            1 => self.cols,
            2 => self.pages,
            _ => 1,
        }
    }

    /// Column-major linear index of `(r, c)`.
    #[must_use]
    pub const fn sub2ind(&self, r: usize, c: usize) -> usize {
        c * self.rows + r
    }

    /// Column-major linear index of `(r, c, p)`.
    #[must_use]
    pub const fn sub2ind3(&self, r: usize, c: usize, p: usize) -> usize {
        p * self.rows * self.cols + c * self.rows + r
    }

    /// Bounds-checked column-major index of `(r, c)`.
    ///
    /// # Errors
    /// Returns a dimension error naming the 1-based subscripts when either
    /// is out of range.
    pub fn sub2ind_checked(&self, r: usize, c: usize) -> Result<usize, RuntimeError> {
        if r >= self.rows || c >= self.cols {
            return Err(RuntimeError::DimensionMismatch {
                details: format!(
                    "Index ({},{}) exceeds array dimensions [{}x{}]",
                    r + 1,
                    c + 1,
                    self.rows,
                    self.cols
                ),
            });
        }
        Ok(self.sub2ind(r, c))
    }
}
