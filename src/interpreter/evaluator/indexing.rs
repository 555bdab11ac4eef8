use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        environment::EnvRef,
        evaluator::core::{EvalResult, Interpreter},
        value::{
            core::{CellArray, NumArray, Value},
            dims::Dims,
        },
    },
    util::num::f64_to_usize,
};

impl Interpreter {
    /// Runs `f` with `len` pushed as the innermost `end` binding.
    ///
    /// Nested index expressions like `A(end-1, B(end))` need a stack, not
    /// a single slot: each depth resolves `end` against its own array and
    /// dimension.
    pub(crate) fn with_index_context<R>(
        &mut self,
        len: usize,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.index_stack.push(len);
        let result = f(self);
        self.index_stack.pop();
        result
    }

    /// Resolves one index argument into a list of 0-based positions.
    ///
    /// The index expression is evaluated with the matching `end` binding.
    /// Four index kinds are accepted: the colon sentinel (all positions
    /// of the dimension), a logical mask (positions where true), a double
    /// array of 1-based positions, and a scalar. Non-integer, zero, or
    /// negative positions are rejected.
    pub(crate) fn resolve_index(
        &mut self,
        index_expr: &Expr,
        target: &Value,
        dim: usize,
        ndims: usize,
        env: &EnvRef,
    ) -> EvalResult<Vec<usize>> {
        let len = if ndims == 1 { target.numel() } else { target.dims().dim_size(dim) };
        let value = self.with_index_context(len, |me| me.eval_expr(index_expr, env))?;

        // an empty index selects nothing, so `A([], :) = []` is a no-op
        if matches!(value, Value::Empty) {
            return Ok(Vec::new());
        }

        if let Value::Char(a) = &value
            && a.data() == b":".as_slice()
        {
            return Ok((0..len).collect());
        }

        if let Value::Logical(mask) = &value {
            return Ok(mask
                .data()
                .iter()
                .enumerate()
                .filter(|&(_, &m)| m != 0)
                .map(|(i, _)| i)
                .collect());
        }

        if let Value::Double(a) = &value {
            let mut indices = Vec::with_capacity(a.numel());
            for &idx in a.data() {
                if idx < 1.0 || idx != idx.floor() {
                    return Err(RuntimeError::NonPositiveIndex { found: idx });
                }
                indices.push(f64_to_usize(idx) - 1);
            }
            return Ok(indices);
        }

        Err(RuntimeError::TypeMismatch {
            details: format!("Invalid index type: {}", value.kind_name()),
        })
    }

    /// Reads from `target` through a `(...)` index list.
    ///
    /// One index selects by column-major linear position, two by the
    /// row × column cross-product, three across pages. Out-of-range
    /// positions raise an error naming the offending index.
    pub(crate) fn index_read(
        &mut self,
        target: &Value,
        args: &[Expr],
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let nargs = args.len();
        if nargs == 0 {
            return Ok(target.clone());
        }

        if let Value::Char(a) = target {
            if nargs == 1 {
                let indices = self.resolve_index(&args[0], target, 0, 1, env)?;
                check_bounds(&indices, a.numel(), "linear index")?;
                let bytes: Vec<u8> = indices.iter().map(|&i| a.data()[i]).collect();
                let n = bytes.len();
                return Ok(Value::Char(NumArray::from_vec(Dims::new(1, n), bytes)));
            }
            return Err(RuntimeError::Unsupported {
                details: "Multi-dimensional char indexing is not supported".to_string(),
            });
        }

        if let Value::Cell(cell) = target {
            return self.cell_paren_read(cell, args, env);
        }

        match nargs {
            1 => {
                let indices = self.resolve_index(&args[0], target, 0, 1, env)?;
                check_bounds(&indices, target.numel(), "linear index")?;
                Ok(select_linear(target, &indices))
            }
            2 => {
                let ri = self.resolve_index(&args[0], target, 0, 2, env)?;
                let ci = self.resolve_index(&args[1], target, 1, 2, env)?;
                let d = target.dims();
                check_bounds(&ri, d.rows, "row index")?;
                check_bounds(&ci, d.cols, "column index")?;
                let mut positions = Vec::with_capacity(ri.len() * ci.len());
                for &c in &ci {
                    for &r in &ri {
                        positions.push(d.sub2ind(r, c));
                    }
                }
                Ok(reshape_selection(target, &positions, ri.len(), ci.len(), 1))
            }
            3 => {
                let ri = self.resolve_index(&args[0], target, 0, 3, env)?;
                let ci = self.resolve_index(&args[1], target, 1, 3, env)?;
                let pi = self.resolve_index(&args[2], target, 2, 3, env)?;
                let d = target.dims();
                check_bounds(&ri, d.rows, "row index")?;
                check_bounds(&ci, d.cols, "column index")?;
                check_bounds(&pi, d.pages, "page index")?;
                let mut positions = Vec::with_capacity(ri.len() * ci.len() * pi.len());
                for &p in &pi {
                    for &c in &ci {
                        for &r in &ri {
                            positions.push(d.sub2ind3(r, c, p));
                        }
                    }
                }
                Ok(reshape_selection(target, &positions, ri.len(), ci.len(), pi.len()))
            }
            _ => Err(RuntimeError::Unsupported {
                details: "Too many indexing dimensions (max 3)".to_string(),
            }),
        }
    }

    /// `()`-indexing on a cell array: one position yields the content,
    /// several a cell slice.
    fn cell_paren_read(
        &mut self,
        cell: &CellArray,
        args: &[Expr],
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let target = Value::Cell(cell.clone());
        match args.len() {
            1 => {
                let indices = self.resolve_index(&args[0], &target, 0, 1, env)?;
                check_bounds(&indices, cell.numel(), "cell index")?;
                if indices.len() == 1 {
                    return Ok(cell.data()[indices[0]].clone());
                }
                let mut result = CellArray::new(1, indices.len());
                for (k, &i) in indices.iter().enumerate() {
                    result.data_mut()[k] = cell.data()[i].clone();
                }
                Ok(Value::Cell(result))
            }
            2 => {
                let ri = self.resolve_index(&args[0], &target, 0, 2, env)?;
                let ci = self.resolve_index(&args[1], &target, 1, 2, env)?;
                let d = cell.dims();
                check_bounds(&ri, d.rows, "row index")?;
                check_bounds(&ci, d.cols, "column index")?;
                if ri.len() == 1 && ci.len() == 1 {
                    return Ok(cell.data()[d.sub2ind(ri[0], ci[0])].clone());
                }
                let mut result = CellArray::new(ri.len(), ci.len());
                for (cc, &c) in ci.iter().enumerate() {
                    for (rr, &r) in ri.iter().enumerate() {
                        result.data_mut()[cc * ri.len() + rr] =
                            cell.data()[d.sub2ind(r, c)].clone();
                    }
                }
                Ok(Value::Cell(result))
            }
            _ => Err(RuntimeError::Unsupported {
                details: "Cell indexing with more than 2 dimensions is not supported".to_string(),
            }),
        }
    }

    /// `{}`-indexing: extracts cell contents by scalar position(s).
    pub(crate) fn eval_cell_index(
        &mut self,
        target: &Expr,
        indices: &[Expr],
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let object = self.eval_expr(target, env)?;
        let Value::Cell(cell) = &object else {
            return Err(RuntimeError::TypeMismatch {
                details: format!(
                    "Cell content indexing requires a cell array, got {}",
                    object.kind_name()
                ),
            });
        };

        match indices.len() {
            1 => {
                let i = self.scalar_cell_position(&indices[0], &object, 0, 1, env)?;
                cell.get(i).cloned().ok_or(RuntimeError::IndexOutOfRange {
                    context: "cell index".to_string(),
                    found: i + 1,
                    limit: cell.numel(),
                })
            }
            2 => {
                let r = self.scalar_cell_position(&indices[0], &object, 0, 2, env)?;
                let c = self.scalar_cell_position(&indices[1], &object, 1, 2, env)?;
                let i = cell.dims().sub2ind_checked(r, c)?;
                Ok(cell.data()[i].clone())
            }
            _ => Err(RuntimeError::Unsupported {
                details: "Cell indexing with more than 2 dimensions is not supported".to_string(),
            }),
        }
    }

    /// Evaluates one `{}` index to a 0-based position.
    pub(crate) fn scalar_cell_position(
        &mut self,
        index_expr: &Expr,
        target: &Value,
        dim: usize,
        ndims: usize,
        env: &EnvRef,
    ) -> EvalResult<usize> {
        let len = if ndims == 1 { target.numel() } else { target.dims().dim_size(dim) };
        let idx = self
            .with_index_context(len, |me| me.eval_expr(index_expr, env))?
            .to_scalar()?;
        if idx < 1.0 || idx != idx.floor() {
            return Err(RuntimeError::NonPositiveIndex { found: idx });
        }
        Ok(f64_to_usize(idx) - 1)
    }

    /// `target.field` read.
    pub(crate) fn eval_field_access(
        &mut self,
        target: &Expr,
        field: &str,
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let object = self.eval_expr(target, env)?;
        let Value::Struct(s) = &object else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("Dot indexing requires a struct, got {}", object.kind_name()),
            });
        };
        s.field(field).cloned().ok_or_else(|| RuntimeError::TypeMismatch {
            details: format!("Reference to non-existent field '{field}'"),
        })
    }
}

/// Rejects any position at or beyond `limit`, naming the index kind.
pub(crate) fn check_bounds(
    indices: &[usize],
    limit: usize,
    context: &str,
) -> Result<(), RuntimeError> {
    for &i in indices {
        if i >= limit {
            return Err(RuntimeError::IndexOutOfRange {
                context: context.to_string(),
                found: i + 1,
                limit,
            });
        }
    }
    Ok(())
}

/// Selects linear positions out of a buffered value, producing a scalar
/// for a single position and a row vector otherwise. The element kind is
/// preserved.
fn select_linear(target: &Value, indices: &[usize]) -> Value {
    reshape_selection(target, indices, 1, indices.len(), 1)
}

/// Gathers `positions` into a fresh array of the given shape, preserving
/// the element kind.
fn reshape_selection(
    target: &Value,
    positions: &[usize],
    rows: usize,
    cols: usize,
    pages: usize,
) -> Value {
    let dims = if pages > 1 {
        Dims::new3(rows, cols, pages)
    } else {
        Dims::new(rows, cols)
    };
    match target {
        Value::Double(a) => {
            let data: Vec<f64> = positions.iter().map(|&i| a.data()[i]).collect();
            Value::Double(NumArray::from_vec(dims, data))
        }
        Value::Complex(a) => {
            let data: Vec<_> = positions.iter().map(|&i| a.data()[i]).collect();
            Value::Complex(NumArray::from_vec(dims, data))
        }
        Value::Logical(a) => {
            let data: Vec<u8> = positions.iter().map(|&i| a.data()[i]).collect();
            Value::Logical(NumArray::from_vec(dims, data))
        }
        _ => Value::Empty,
    }
}
