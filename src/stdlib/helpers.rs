use crate::{
    error::RuntimeError,
    interpreter::value::{
        complex::Complex,
        core::{NumArray, Value},
        dims::Dims,
    },
};

/// Whether two shapes agree element-for-element.
#[must_use]
pub fn dims_match(a: Dims, b: Dims) -> bool {
    a.rows == b.rows && a.cols == b.cols && a.pages == b.pages
}

/// A real numeric view of a value: double as-is, logical widened.
///
/// Char and the container kinds have no implicit numeric reading in
/// arithmetic, so they yield `None`.
#[must_use]
pub fn to_double_array(value: &Value) -> Option<NumArray<f64>> {
    match value {
        Value::Double(a) => Some(a.clone()),
        Value::Logical(a) => {
            let data: Vec<f64> = a.data().iter().map(|&v| f64::from(v)).collect();
            Some(NumArray::from_vec(a.dims(), data))
        }
        _ => None,
    }
}

/// A complex view of a value: complex as-is, double/logical widened.
#[must_use]
pub fn to_complex_array(value: &Value) -> Option<NumArray<Complex>> {
    match value {
        Value::Complex(a) => Some(a.clone()),
        _ => to_double_array(value).map(|a| {
            let data: Vec<Complex> = a.data().iter().map(|&v| Complex::from(v)).collect();
            NumArray::from_vec(a.dims(), data)
        }),
    }
}

/// A logical view: logical as-is, double mapped through nonzero.
#[must_use]
pub fn to_logical_array(value: &Value) -> Option<NumArray<u8>> {
    match value {
        Value::Logical(a) => Some(a.clone()),
        Value::Double(a) => {
            let data: Vec<u8> = a.data().iter().map(|&v| u8::from(v != 0.0)).collect();
            Some(NumArray::from_vec(a.dims(), data))
        }
        _ => None,
    }
}

/// Applies a binary operation element-wise over real operands with
/// scalar-with-array broadcasting.
///
/// # Errors
/// Rejects operands without a real numeric view, and non-scalar shapes
/// that do not agree.
pub fn elementwise_double(
    a: &Value,
    b: &Value,
    symbol: &str,
    op: impl Fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    let (Some(x), Some(y)) = (to_double_array(a), to_double_array(b)) else {
        return Err(RuntimeError::Unsupported {
            details: format!("Unsupported types for {symbol}"),
        });
    };

    if x.numel() == 1 {
        let xv = x.data()[0];
        let data: Vec<f64> = y.data().iter().map(|&v| op(xv, v)).collect();
        return Ok(Value::Double(NumArray::from_vec(y.dims(), data)));
    }
    if y.numel() == 1 {
        let yv = y.data()[0];
        let data: Vec<f64> = x.data().iter().map(|&v| op(v, yv)).collect();
        return Ok(Value::Double(NumArray::from_vec(x.dims(), data)));
    }
    if !dims_match(x.dims(), y.dims()) {
        return Err(RuntimeError::DimensionMismatch {
            details: "Matrix dimensions must agree".to_string(),
        });
    }
    let data: Vec<f64> = x
        .data()
        .iter()
        .zip(y.data())
        .map(|(&xv, &yv)| op(xv, yv))
        .collect();
    Ok(Value::Double(NumArray::from_vec(x.dims(), data)))
}

/// Applies a binary operation element-wise after promoting both operands
/// to complex, with scalar-with-array broadcasting.
///
/// # Errors
/// Rejects operands without a numeric view and non-conforming shapes.
pub fn elementwise_complex(
    a: &Value,
    b: &Value,
    symbol: &str,
    op: impl Fn(Complex, Complex) -> Complex,
) -> Result<Value, RuntimeError> {
    let (Some(x), Some(y)) = (to_complex_array(a), to_complex_array(b)) else {
        return Err(RuntimeError::Unsupported {
            details: format!("Unsupported types for {symbol}"),
        });
    };

    if x.numel() == 1 {
        let xv = x.data()[0];
        let data: Vec<Complex> = y.data().iter().map(|&v| op(xv, v)).collect();
        return Ok(Value::Complex(NumArray::from_vec(y.dims(), data)));
    }
    if y.numel() == 1 {
        let yv = y.data()[0];
        let data: Vec<Complex> = x.data().iter().map(|&v| op(v, yv)).collect();
        return Ok(Value::Complex(NumArray::from_vec(x.dims(), data)));
    }
    if !dims_match(x.dims(), y.dims()) {
        return Err(RuntimeError::DimensionMismatch {
            details: "Matrix dimensions must agree".to_string(),
        });
    }
    let data: Vec<Complex> = x
        .data()
        .iter()
        .zip(y.data())
        .map(|(&xv, &yv)| op(xv, yv))
        .collect();
    Ok(Value::Complex(NumArray::from_vec(x.dims(), data)))
}

/// Applies a unary operation element-wise over a real operand.
///
/// # Errors
/// Rejects operands without a real numeric view.
pub fn unary_double(
    a: &Value,
    symbol: &str,
    op: impl Fn(f64) -> f64,
) -> Result<Value, RuntimeError> {
    let Some(x) = to_double_array(a) else {
        return Err(RuntimeError::Unsupported {
            details: format!("Unsupported type for {symbol}: {}", a.kind_name()),
        });
    };
    let data: Vec<f64> = x.data().iter().map(|&v| op(v)).collect();
    Ok(Value::Double(NumArray::from_vec(x.dims(), data)))
}

/// Applies a unary operation element-wise over a complex operand.
///
/// # Errors
/// Rejects operands without a numeric view.
pub fn unary_complex(
    a: &Value,
    symbol: &str,
    op: impl Fn(Complex) -> Complex,
) -> Result<Value, RuntimeError> {
    let Some(x) = to_complex_array(a) else {
        return Err(RuntimeError::Unsupported {
            details: format!("Unsupported type for {symbol}: {}", a.kind_name()),
        });
    };
    let data: Vec<Complex> = x.data().iter().map(|&v| op(v)).collect();
    Ok(Value::Complex(NumArray::from_vec(x.dims(), data)))
}

/// Transposes a buffered array.
#[must_use]
pub fn transpose_array<T: Clone + Default>(a: &NumArray<T>) -> NumArray<T> {
    let d = a.dims();
    let mut data = vec![T::default(); d.numel()];
    let new = Dims::new(d.cols, d.rows);
    for c in 0..d.cols {
        for r in 0..d.rows {
            data[new.sub2ind(c, r)] = a.data()[d.sub2ind(r, c)].clone();
        }
    }
    NumArray::from_vec(new, data)
}

/// Requires exactly `n` arguments.
///
/// # Errors
/// Returns a bad-arity error naming the function.
pub fn expect_args(name: &str, args: &[Value], n: usize) -> Result<(), RuntimeError> {
    if args.len() != n {
        return Err(RuntimeError::BadArity {
            name: name.to_string(),
            details: format!("expected {n} arguments, got {}", args.len()),
        });
    }
    Ok(())
}

/// Requires between `lo` and `hi` arguments.
///
/// # Errors
/// Returns a bad-arity error naming the function.
pub fn expect_args_range(
    name: &str,
    args: &[Value],
    lo: usize,
    hi: usize,
) -> Result<(), RuntimeError> {
    if args.len() < lo || args.len() > hi {
        return Err(RuntimeError::BadArity {
            name: name.to_string(),
            details: format!("expected {lo} to {hi} arguments, got {}", args.len()),
        });
    }
    Ok(())
}
