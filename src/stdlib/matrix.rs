use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::{
            core::{NumArray, Value},
            dims::Dims,
        },
    },
    stdlib::helpers::{expect_args, expect_args_range, to_double_array, transpose_array},
    util::num::{f64_to_usize, usize_to_f64},
};

/// Reads a non-negative integral dimension argument.
fn dim_arg(name: &str, value: &Value) -> Result<usize, RuntimeError> {
    let v = value.to_scalar()?;
    if v < 0.0 || v != v.floor() {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects non-negative integer sizes, got {v}"),
        });
    }
    Ok(f64_to_usize(v))
}

/// The `(rows, cols)` a construction function was asked for:
/// no arguments is 1×1, one argument `n` is n×n, two are rows×cols.
fn construction_shape(name: &str, args: &[Value]) -> Result<(usize, usize), RuntimeError> {
    expect_args_range(name, args, 0, 2)?;
    match args {
        [] => Ok((1, 1)),
        [n] => {
            let n = dim_arg(name, n)?;
            Ok((n, n))
        }
        [r, c] => Ok((dim_arg(name, r)?, dim_arg(name, c)?)),
        _ => unreachable!(),
    }
}

/// Registers construction and introspection functions.
pub fn install(interp: &mut Interpreter) {
    interp.register_function("zeros", |args| {
        let (r, c) = construction_shape("zeros", args)?;
        Ok(vec![Value::zeros(r, c)])
    });

    interp.register_function("ones", |args| {
        let (r, c) = construction_shape("ones", args)?;
        Ok(vec![Value::matrix(r, c, vec![1.0; r * c])])
    });

    interp.register_function("eye", |args| {
        let (r, c) = construction_shape("eye", args)?;
        let dims = Dims::new(r, c);
        let mut data = vec![0.0; r * c];
        for i in 0..r.min(c) {
            data[dims.sub2ind(i, i)] = 1.0;
        }
        Ok(vec![Value::Double(NumArray::from_vec(dims, data))])
    });

    interp.register_function("linspace", |args| {
        expect_args_range("linspace", args, 2, 3)?;
        let a = args[0].to_scalar()?;
        let b = args[1].to_scalar()?;
        let n = match args.get(2) {
            Some(v) => dim_arg("linspace", v)?,
            None => 100,
        };
        if n == 0 {
            return Ok(vec![Value::row_vector(Vec::new())]);
        }
        if n == 1 {
            return Ok(vec![Value::scalar(b)]);
        }
        let step = (b - a) / usize_to_f64(n - 1);
        let mut data: Vec<f64> = (0..n).map(|k| step.mul_add(usize_to_f64(k), a)).collect();
        data[n - 1] = b;
        Ok(vec![Value::row_vector(data)])
    });

    interp.register_function("reshape", |args| {
        expect_args("reshape", args, 3)?;
        let r = dim_arg("reshape", &args[1])?;
        let c = dim_arg("reshape", &args[2])?;
        let target = &args[0];
        if r * c != target.numel() {
            return Err(RuntimeError::DimensionMismatch {
                details: format!(
                    "reshape cannot change the element count ({} to {})",
                    target.numel(),
                    r * c
                ),
            });
        }
        let mut reshaped = target.clone();
        match &mut reshaped {
            Value::Double(a) => a.set_dims(Dims::new(r, c)),
            Value::Complex(a) => a.set_dims(Dims::new(r, c)),
            Value::Logical(a) | Value::Char(a) => a.set_dims(Dims::new(r, c)),
            other => {
                return Err(RuntimeError::TypeMismatch {
                    details: format!("reshape is not supported for {} values",
                                     other.kind_name()),
                });
            }
        }
        Ok(vec![reshaped])
    });

    interp.register_function("size", |args| {
        expect_args_range("size", args, 1, 2)?;
        let d = args[0].dims();
        if let Some(dim) = args.get(1) {
            let dim = dim.to_scalar()?;
            if dim < 1.0 || dim != dim.floor() {
                return Err(RuntimeError::NonPositiveIndex { found: dim });
            }
            return Ok(vec![Value::scalar(usize_to_f64(d.dim_size(f64_to_usize(dim) - 1)))]);
        }
        Ok(vec![Value::row_vector(vec![
            usize_to_f64(d.rows),
            usize_to_f64(d.cols),
        ])])
    });

    interp.register_function("length", |args| {
        expect_args("length", args, 1)?;
        let d = args[0].dims();
        Ok(vec![Value::scalar(usize_to_f64(d.rows.max(d.cols)))])
    });

    interp.register_function("numel", |args| {
        expect_args("numel", args, 1)?;
        Ok(vec![Value::scalar(usize_to_f64(args[0].numel()))])
    });

    interp.register_function("ndims", |args| {
        expect_args("ndims", args, 1)?;
        Ok(vec![Value::scalar(if args[0].dims().is_3d() { 3.0 } else { 2.0 })])
    });

    interp.register_function("isempty", |args| {
        expect_args("isempty", args, 1)?;
        Ok(vec![Value::logical_scalar(args[0].is_empty())])
    });

    interp.register_function("isscalar", |args| {
        expect_args("isscalar", args, 1)?;
        Ok(vec![Value::logical_scalar(args[0].is_scalar())])
    });

    interp.register_function("isvector", |args| {
        expect_args("isvector", args, 1)?;
        Ok(vec![Value::logical_scalar(args[0].dims().is_vector())])
    });

    interp.register_function("diag", |args| {
        expect_args("diag", args, 1)?;
        let Some(a) = to_double_array(&args[0]) else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("diag expects a numeric array, got {}", args[0].kind_name()),
            });
        };
        let d = a.dims();
        if d.is_vector() {
            let n = a.numel();
            let dims = Dims::new(n, n);
            let mut data = vec![0.0; n * n];
            for (i, &v) in a.data().iter().enumerate() {
                data[dims.sub2ind(i, i)] = v;
            }
            return Ok(vec![Value::Double(NumArray::from_vec(dims, data))]);
        }
        let n = d.rows.min(d.cols);
        let data: Vec<f64> = (0..n).map(|i| a.data()[d.sub2ind(i, i)]).collect();
        Ok(vec![Value::Double(NumArray::from_vec(Dims::new(n, 1), data))])
    });

    // the function form of `.'`: no conjugation
    interp.register_function("transpose", |args| {
        expect_args("transpose", args, 1)?;
        match &args[0] {
            Value::Empty => Ok(vec![Value::Empty]),
            Value::Double(a) => Ok(vec![Value::Double(transpose_array(a))]),
            Value::Complex(a) => Ok(vec![Value::Complex(transpose_array(a))]),
            Value::Logical(a) => Ok(vec![Value::Logical(transpose_array(a))]),
            Value::Char(a) => Ok(vec![Value::Char(transpose_array(a))]),
            other => Err(RuntimeError::TypeMismatch {
                details: format!("Transpose is not supported for {} values", other.kind_name()),
            }),
        }
    });

    interp.register_function("horzcat", |args| concat(args, false));
    interp.register_function("vertcat", |args| concat(args, true));
}

/// Concatenates double arrays side by side or on top of each other.
fn concat(args: &[Value], vertical: bool) -> Result<Vec<Value>, RuntimeError> {
    let arrays: Vec<_> = args
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| {
            to_double_array(v).ok_or_else(|| RuntimeError::TypeMismatch {
                details: format!("Cannot concatenate {} values", v.kind_name()),
            })
        })
        .collect::<Result<_, _>>()?;

    if arrays.is_empty() {
        return Ok(vec![Value::Empty]);
    }

    if vertical {
        let cols = arrays[0].dims().cols;
        let mut rows = 0;
        for a in &arrays {
            if a.dims().cols != cols {
                return Err(RuntimeError::DimensionMismatch {
                    details: "Dimensions of arrays being concatenated are not consistent"
                        .to_string(),
                });
            }
            rows += a.dims().rows;
        }
        let dims = Dims::new(rows, cols);
        let mut data = vec![0.0; dims.numel()];
        let mut row_off = 0;
        for a in &arrays {
            let ad = a.dims();
            for c in 0..ad.cols {
                for r in 0..ad.rows {
                    data[dims.sub2ind(row_off + r, c)] = a.data()[ad.sub2ind(r, c)];
                }
            }
            row_off += ad.rows;
        }
        return Ok(vec![Value::Double(NumArray::from_vec(dims, data))]);
    }

    let rows = arrays[0].dims().rows;
    let mut cols = 0;
    for a in &arrays {
        if a.dims().rows != rows {
            return Err(RuntimeError::DimensionMismatch {
                details: "Dimensions of arrays being concatenated are not consistent".to_string(),
            });
        }
        cols += a.dims().cols;
    }
    let dims = Dims::new(rows, cols);
    let mut data = vec![0.0; dims.numel()];
    let mut col_off = 0;
    for a in &arrays {
        let ad = a.dims();
        for c in 0..ad.cols {
            for r in 0..ad.rows {
                data[dims.sub2ind(r, col_off + c)] = a.data()[ad.sub2ind(r, c)];
            }
        }
        col_off += ad.cols;
    }
    Ok(vec![Value::Double(NumArray::from_vec(dims, data))])
}
