use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        environment::{self, EnvRef, Slot},
        evaluator::{
            core::{EvalResult, ExecResult, Flow, Interpreter},
            indexing::check_bounds,
        },
        value::{
            complex::Complex,
            core::{NumArray, StructValue, Value},
            dims::Dims,
        },
    },
};

/// Takes the binding for `name` out of its scope, or starts from empty.
fn take_or_create(env: &EnvRef, name: &str) -> (Value, Option<Slot>) {
    match environment::take(env, name) {
        Some((value, slot)) => (value, Some(slot)),
        None => (Value::Empty, None),
    }
}

/// Puts a (possibly new) binding back where [`take_or_create`] found it.
fn restore(env: &EnvRef, name: &str, slot: Option<Slot>, value: Value) {
    match slot {
        Some(slot) => environment::give_back(slot, value),
        None => env.borrow_mut().set(name, value),
    }
}

/// The right-hand side of a numeric indexed write, widened to one element
/// kind up front.
enum WriteSource {
    Real(Vec<f64>),
    Cx(Vec<Complex>),
}

impl WriteSource {
    fn len(&self) -> usize {
        match self {
            Self::Real(v) => v.len(),
            Self::Cx(v) => v.len(),
        }
    }
}

/// The elements of `value` as doubles, when it has a real numeric reading.
fn real_elements(value: &Value) -> Option<Vec<f64>> {
    match value {
        Value::Double(a) => Some(a.data().to_vec()),
        Value::Logical(a) | Value::Char(a) => {
            Some(a.data().iter().map(|&v| f64::from(v)).collect())
        }
        _ => None,
    }
}

/// The elements of `value` as complex numbers.
fn complex_elements(value: &Value) -> Option<Vec<Complex>> {
    match value {
        Value::Complex(a) => Some(a.data().to_vec()),
        _ => real_elements(value).map(|v| v.into_iter().map(Complex::from).collect()),
    }
}

impl Interpreter {
    /// Executes `target = value`.
    ///
    /// A plain identifier rebinds (and displays unless suppressed); an
    /// index expression routes through the indexed-write engine; field
    /// and cell targets mutate in place.
    pub(crate) fn exec_assign(
        &mut self,
        target: &Expr,
        value_expr: &Expr,
        suppress: bool,
        env: &EnvRef,
    ) -> ExecResult {
        let rhs = self.eval_expr(value_expr, env)?;
        match target {
            Expr::Identifier { name, .. } => {
                env.borrow_mut().set(name, rhs.clone());
                if !suppress {
                    self.display_value(name, &rhs);
                }
            }
            Expr::Call { .. } => self.indexed_assign(target, &rhs, env)?,
            Expr::FieldAccess { .. } => self.field_assign(target, rhs.clone(), env)?,
            Expr::CellIndex { .. } => self.cell_assign(target, rhs.clone(), env)?,
            _ => return Err(RuntimeError::InvalidAssignmentTarget),
        }
        Ok(Flow::Normal(rhs))
    }

    /// Executes `[a, ~, b] = call(...)`.
    ///
    /// The right-hand call runs with the requested output count equal to
    /// the number of left-hand positions; `~` positions are discarded and
    /// positions past the produced results bind empty.
    pub(crate) fn exec_multi_assign(
        &mut self,
        targets: &[Option<String>],
        call: &Expr,
        suppress: bool,
        env: &EnvRef,
    ) -> ExecResult {
        let results = self.eval_call_multi(call, targets.len(), env)?;

        for (i, target) in targets.iter().enumerate() {
            if let Some(name) = target {
                let value = results.get(i).cloned().unwrap_or(Value::Empty);
                env.borrow_mut().set(name, value);
            }
        }

        if !suppress {
            for (i, target) in targets.iter().enumerate() {
                if let Some(name) = target
                    && i < results.len()
                {
                    let value = results[i].clone();
                    self.display_value(name, &value);
                }
            }
        }

        Ok(Flow::Normal(results.into_iter().next().unwrap_or(Value::Empty)))
    }

    // ─── indexed writes ─────────────────────────────────────────────

    /// Executes `name(indices) = rhs`, growing the target as needed.
    ///
    /// A scalar right-hand side broadcasts to every selected position; an
    /// array right-hand side must match the selection element count and
    /// fills it in column-major order. A complex right-hand side promotes
    /// a double target; numeric writes widen logical and char targets to
    /// double. Char-into-char writes store code units without growing.
    fn indexed_assign(&mut self, target: &Expr, rhs: &Value, env: &EnvRef) -> EvalResult<()> {
        let Expr::Call { target: callee, args, .. } = target else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        let Expr::Identifier { name, .. } = &**callee else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };

        let snapshot = env.borrow().get(name).unwrap_or(Value::Empty);
        match &snapshot {
            Value::Cell(_) | Value::Struct(_) | Value::FuncHandle(_) => {
                return Err(RuntimeError::TypeMismatch {
                    details: format!(
                        "Cannot index-assign into {} variable '{name}'",
                        snapshot.kind_name()
                    ),
                });
            }
            _ => {}
        }

        // Char-into-char: write code units at existing positions.
        if snapshot.is_char() && rhs.is_char() && args.len() == 1 {
            let indices = self.resolve_index(&args[0], &snapshot, 0, 1, env)?;
            check_bounds(&indices, snapshot.numel(), "linear index")?;
            let Value::Char(rc) = rhs else { unreachable!() };
            let src = rc.data().to_vec();
            if src.len() != 1 && src.len() != indices.len() {
                return Err(RuntimeError::DimensionMismatch {
                    details: "Assignment element counts do not match".to_string(),
                });
            }
            let (mut var, slot) = take_or_create(env, name);
            if let Value::Char(a) = &mut var {
                let data = a.data_mut();
                for (k, &i) in indices.iter().enumerate() {
                    data[i] = if src.len() == 1 { src[0] } else { src[k] };
                }
            }
            restore(env, name, slot, var);
            return Ok(());
        }

        let complex_write = rhs.is_complex() || snapshot.is_complex();
        let source = if complex_write {
            WriteSource::Cx(complex_elements(rhs).ok_or_else(|| RuntimeError::TypeMismatch {
                details: format!("Cannot assign {} values by index", rhs.kind_name()),
            })?)
        } else {
            WriteSource::Real(real_elements(rhs).ok_or_else(|| RuntimeError::TypeMismatch {
                details: format!("Cannot assign {} values by index", rhs.kind_name()),
            })?)
        };

        match args.len() {
            1 => {
                let indices = self.resolve_index(&args[0], &snapshot, 0, 1, env)?;
                check_source_len(&source, indices.len())?;
                drop(snapshot);

                let (mut var, slot) = take_or_create(env, name);
                normalize_target(&mut var, complex_write);
                for &i in &indices {
                    var.ensure_size(i);
                }
                write_positions(&mut var, &indices, &source);
                restore(env, name, slot, var);
                Ok(())
            }
            2 => {
                let ri = self.resolve_index(&args[0], &snapshot, 0, 2, env)?;
                let ci = self.resolve_index(&args[1], &snapshot, 1, 2, env)?;
                check_source_len(&source, ri.len() * ci.len())?;
                drop(snapshot);

                let (mut var, slot) = take_or_create(env, name);
                normalize_target(&mut var, complex_write);
                let need_r = ri.iter().map(|&r| r + 1).max().unwrap_or(0);
                let need_c = ci.iter().map(|&c| c + 1).max().unwrap_or(0);
                let d = var.dims();
                if need_r > d.rows || need_c > d.cols {
                    var.resize(d.rows.max(need_r), d.cols.max(need_c));
                }
                let d = var.dims();
                let mut positions = Vec::with_capacity(ri.len() * ci.len());
                for &c in &ci {
                    for &r in &ri {
                        positions.push(d.sub2ind(r, c));
                    }
                }
                write_positions(&mut var, &positions, &source);
                restore(env, name, slot, var);
                Ok(())
            }
            3 => {
                let ri = self.resolve_index(&args[0], &snapshot, 0, 3, env)?;
                let ci = self.resolve_index(&args[1], &snapshot, 1, 3, env)?;
                let pi = self.resolve_index(&args[2], &snapshot, 2, 3, env)?;
                check_source_len(&source, ri.len() * ci.len() * pi.len())?;
                drop(snapshot);

                let (mut var, slot) = take_or_create(env, name);
                normalize_target(&mut var, complex_write);
                let need_r = ri.iter().map(|&r| r + 1).max().unwrap_or(0);
                let need_c = ci.iter().map(|&c| c + 1).max().unwrap_or(0);
                let need_p = pi.iter().map(|&p| p + 1).max().unwrap_or(0);
                let d = var.dims();
                if need_r > d.rows || need_c > d.cols || need_p > d.pages {
                    var.resize3(
                        d.rows.max(need_r),
                        d.cols.max(need_c),
                        d.pages.max(need_p),
                    );
                }
                let d = var.dims();
                let mut positions = Vec::with_capacity(ri.len() * ci.len() * pi.len());
                for &p in &pi {
                    for &c in &ci {
                        for &r in &ri {
                            positions.push(d.sub2ind3(r, c, p));
                        }
                    }
                }
                write_positions(&mut var, &positions, &source);
                restore(env, name, slot, var);
                Ok(())
            }
            _ => Err(RuntimeError::Unsupported {
                details: "Indexed assignment supports at most 3 subscripts".to_string(),
            }),
        }
    }

    /// Executes `a.b.c = rhs`, creating intermediate structs as needed.
    fn field_assign(&mut self, target: &Expr, rhs: Value, env: &EnvRef) -> EvalResult<()> {
        let mut fields = Vec::new();
        let mut node = target;
        while let Expr::FieldAccess { target: inner, field, .. } = node {
            fields.push(field.clone());
            node = inner;
        }
        let Expr::Identifier { name, .. } = node else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        fields.reverse();

        let (mut var, slot) = take_or_create(env, name);
        if !var.is_struct() {
            var = Value::Struct(StructValue::new());
        }

        let (last, path) = fields.split_last().expect("field access has at least one field");
        let mut cursor: &mut Value = &mut var;
        for field in path {
            if !cursor.is_struct() {
                *cursor = Value::Struct(StructValue::new());
            }
            let Value::Struct(s) = cursor else { unreachable!() };
            cursor = s.field_mut(field);
        }
        if !cursor.is_struct() {
            *cursor = Value::Struct(StructValue::new());
        }
        let Value::Struct(s) = cursor else { unreachable!() };
        *s.field_mut(last) = rhs;

        restore(env, name, slot, var);
        Ok(())
    }

    /// Executes `c{indices} = rhs`; the variable must already be a cell.
    fn cell_assign(&mut self, target: &Expr, rhs: Value, env: &EnvRef) -> EvalResult<()> {
        let Expr::CellIndex { target: callee, indices, .. } = target else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        let Expr::Identifier { name, .. } = &**callee else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };

        let snapshot = env
            .borrow()
            .get(name)
            .ok_or_else(|| RuntimeError::Undefined { name: name.clone() })?;
        if !snapshot.is_cell() {
            return Err(RuntimeError::TypeMismatch {
                details: format!(
                    "Cell content assignment requires a cell array, '{name}' is {}",
                    snapshot.kind_name()
                ),
            });
        }

        let position = match indices.len() {
            1 => {
                let i = self.scalar_cell_position(&indices[0], &snapshot, 0, 1, env)?;
                if i >= snapshot.numel() {
                    return Err(RuntimeError::IndexOutOfRange {
                        context: "cell index".to_string(),
                        found: i + 1,
                        limit: snapshot.numel(),
                    });
                }
                i
            }
            2 => {
                let r = self.scalar_cell_position(&indices[0], &snapshot, 0, 2, env)?;
                let c = self.scalar_cell_position(&indices[1], &snapshot, 1, 2, env)?;
                snapshot.dims().sub2ind_checked(r, c)?
            }
            _ => {
                return Err(RuntimeError::Unsupported {
                    details: "Cell indexing with more than 2 dimensions is not supported"
                        .to_string(),
                });
            }
        };
        drop(snapshot);

        let (mut var, slot) = take_or_create(env, name);
        if let Value::Cell(cell) = &mut var {
            cell.data_mut()[position] = rhs;
        }
        restore(env, name, slot, var);
        Ok(())
    }

    // ─── deletion ───────────────────────────────────────────────────

    /// Executes `name(indices) = []`.
    ///
    /// One subscript removes the selected elements, flattening the rest
    /// into a row vector (a column when the source was a column). Two
    /// subscripts must cover a full row or column extent and remove whole
    /// rows or columns.
    pub(crate) fn exec_delete_assign(&mut self, target: &Expr, env: &EnvRef) -> ExecResult {
        let Expr::Call { target: callee, args, .. } = target else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        let Expr::Identifier { name, .. } = &**callee else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };

        let var = env
            .borrow()
            .get(name)
            .ok_or_else(|| RuntimeError::Undefined { name: name.clone() })?;

        let result = match args.len() {
            1 => {
                let indices = self.resolve_index(&args[0], &var, 0, 1, env)?;
                delete_linear(&var, &indices)?
            }
            2 => {
                let ri = self.resolve_index(&args[0], &var, 0, 2, env)?;
                let ci = self.resolve_index(&args[1], &var, 1, 2, env)?;
                let d = var.dims();
                if ci.len() == d.cols {
                    delete_slices(&var, &ri, true)?
                } else if ri.len() == d.rows {
                    delete_slices(&var, &ci, false)?
                } else {
                    return Err(RuntimeError::DimensionMismatch {
                        details: "Deletion requires a full row or column specification"
                            .to_string(),
                    });
                }
            }
            _ => {
                return Err(RuntimeError::Unsupported {
                    details: "Deletion supports at most 2 subscripts".to_string(),
                });
            }
        };

        if let Some((_, slot)) = environment::take(env, name) {
            environment::give_back(slot, result);
        } else {
            env.borrow_mut().set(name, result);
        }
        Ok(Flow::Normal(Value::Empty))
    }
}

fn check_source_len(source: &WriteSource, selected: usize) -> Result<(), RuntimeError> {
    if source.len() != 1 && source.len() != selected {
        return Err(RuntimeError::DimensionMismatch {
            details: "Assignment element counts do not match".to_string(),
        });
    }
    Ok(())
}

/// Prepares a variable to receive a numeric indexed write: empty becomes
/// a 0×0 double, logical and char targets widen to double, and a complex
/// write promotes a double target.
fn normalize_target(var: &mut Value, complex_write: bool) {
    if matches!(var, Value::Empty) {
        *var = Value::zeros(0, 0);
    }
    if let Value::Logical(a) | Value::Char(a) = var {
        let data: Vec<f64> = a.data().iter().map(|&v| f64::from(v)).collect();
        *var = Value::Double(NumArray::from_vec(a.dims(), data));
    }
    if complex_write {
        // cannot fail: var is double or complex at this point
        let _ = var.promote_to_complex();
    }
}

/// Writes the source elements to the given column-major positions,
/// broadcasting a single element across all of them.
fn write_positions(var: &mut Value, positions: &[usize], source: &WriteSource) {
    match (var, source) {
        (Value::Double(a), WriteSource::Real(src)) => {
            let data = a.data_mut();
            for (k, &i) in positions.iter().enumerate() {
                data[i] = if src.len() == 1 { src[0] } else { src[k] };
            }
        }
        (Value::Complex(a), WriteSource::Cx(src)) => {
            let data = a.data_mut();
            for (k, &i) in positions.iter().enumerate() {
                data[i] = if src.len() == 1 { src[0] } else { src[k] };
            }
        }
        (Value::Complex(a), WriteSource::Real(src)) => {
            let data = a.data_mut();
            for (k, &i) in positions.iter().enumerate() {
                let v = if src.len() == 1 { src[0] } else { src[k] };
                data[i] = Complex::from(v);
            }
        }
        _ => {}
    }
}

/// Removes the flagged elements, flattening what remains.
fn delete_linear(var: &Value, indices: &[usize]) -> Result<Value, RuntimeError> {
    let n = var.numel();
    let mut del = vec![false; n];
    for &i in indices {
        if i < n {
            del[i] = true;
        }
    }
    let is_row = var.dims().rows == 1;
    match var {
        Value::Double(a) => Ok(Value::Double(keep_elements(a, &del, is_row))),
        Value::Complex(a) => Ok(Value::Complex(keep_elements(a, &del, is_row))),
        Value::Logical(a) => Ok(Value::Logical(keep_elements(a, &del, is_row))),
        Value::Char(a) => Ok(Value::Char(keep_elements(a, &del, is_row))),
        other => Err(RuntimeError::Unsupported {
            details: format!("Deletion is not supported for {} values", other.kind_name()),
        }),
    }
}

fn keep_elements<T: Clone + Default>(a: &NumArray<T>, del: &[bool], is_row: bool) -> NumArray<T> {
    let data: Vec<T> = a
        .data()
        .iter()
        .zip(del)
        .filter(|&(_, &d)| !d)
        .map(|(v, _)| v.clone())
        .collect();
    let n = data.len();
    let dims = if is_row { Dims::new(1, n) } else { Dims::new(n, 1) };
    NumArray::from_vec(dims, data)
}

/// Removes whole rows (`by_rows`) or whole columns from a 2-D value.
fn delete_slices(var: &Value, selected: &[usize], by_rows: bool) -> Result<Value, RuntimeError> {
    match var {
        Value::Double(a) => Ok(Value::Double(drop_slices(a, selected, by_rows))),
        Value::Complex(a) => Ok(Value::Complex(drop_slices(a, selected, by_rows))),
        Value::Logical(a) => Ok(Value::Logical(drop_slices(a, selected, by_rows))),
        Value::Char(a) => Ok(Value::Char(drop_slices(a, selected, by_rows))),
        other => Err(RuntimeError::Unsupported {
            details: format!("Deletion is not supported for {} values", other.kind_name()),
        }),
    }
}

fn drop_slices<T: Clone + Default>(
    a: &NumArray<T>,
    selected: &[usize],
    by_rows: bool,
) -> NumArray<T> {
    let d = a.dims();
    let extent = if by_rows { d.rows } else { d.cols };
    let mut del = vec![false; extent];
    for &i in selected {
        if i < extent {
            del[i] = true;
        }
    }
    let kept = del.iter().filter(|&&x| !x).count();

    if by_rows {
        let mut data = Vec::with_capacity(kept * d.cols);
        for c in 0..d.cols {
            for r in 0..d.rows {
                if !del[r] {
                    data.push(a.data()[d.sub2ind(r, c)].clone());
                }
            }
        }
        NumArray::from_vec(Dims::new(kept, d.cols), data)
    } else {
        let mut data = Vec::with_capacity(d.rows * kept);
        for c in 0..d.cols {
            if del[c] {
                continue;
            }
            for r in 0..d.rows {
                data.push(a.data()[d.sub2ind(r, c)].clone());
            }
        }
        NumArray::from_vec(Dims::new(d.rows, kept), data)
    }
}
