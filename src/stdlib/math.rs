use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::{
            complex::Complex,
            core::{NumArray, Value},
            dims::Dims,
        },
    },
    stdlib::helpers::{
        elementwise_double, expect_args, expect_args_range, to_double_array, unary_complex,
        unary_double,
    },
    util::num::usize_to_f64,
};

/// Registers scalar math, rounding, and reduction functions.
pub fn install(interp: &mut Interpreter) {
    interp.register_function("sqrt", |args| {
        expect_args("sqrt", args, 1)?;
        let a = &args[0];
        if a.is_complex() {
            return Ok(vec![unary_complex(a, "sqrt", Complex::sqrt)?]);
        }
        if a.is_scalar() && a.to_scalar()? < 0.0 {
            let r = Complex::from(a.to_scalar()?).sqrt();
            return Ok(vec![Value::complex_scalar(r.re, r.im)]);
        }
        Ok(vec![unary_double(a, "sqrt", f64::sqrt)?])
    });

    interp.register_function("abs", |args| {
        expect_args("abs", args, 1)?;
        let a = &args[0];
        if let Value::Complex(arr) = a {
            let data: Vec<f64> = arr.data().iter().map(|c| c.abs()).collect();
            return Ok(vec![Value::Double(NumArray::from_vec(arr.dims(), data))]);
        }
        Ok(vec![unary_double(a, "abs", f64::abs)?])
    });

    interp.register_function("exp", |args| {
        expect_args("exp", args, 1)?;
        let a = &args[0];
        if a.is_complex() {
            return Ok(vec![unary_complex(a, "exp", Complex::exp)?]);
        }
        Ok(vec![unary_double(a, "exp", f64::exp)?])
    });

    interp.register_function("log", |args| {
        expect_args("log", args, 1)?;
        let a = &args[0];
        if a.is_complex() {
            return Ok(vec![unary_complex(a, "log", Complex::ln)?]);
        }
        if a.is_scalar() && a.to_scalar()? < 0.0 {
            let r = Complex::from(a.to_scalar()?).ln();
            return Ok(vec![Value::complex_scalar(r.re, r.im)]);
        }
        Ok(vec![unary_double(a, "log", f64::ln)?])
    });

    interp.register_function("log2", |args| {
        expect_args("log2", args, 1)?;
        Ok(vec![unary_double(&args[0], "log2", f64::log2)?])
    });

    interp.register_function("log10", |args| {
        expect_args("log10", args, 1)?;
        Ok(vec![unary_double(&args[0], "log10", f64::log10)?])
    });

    for (name, op) in [
        ("sin", f64::sin as fn(f64) -> f64),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("floor", f64::floor),
        ("ceil", f64::ceil),
        ("round", f64::round),
        ("fix", f64::trunc),
    ] {
        interp.register_function(name, move |args| {
            expect_args(name, args, 1)?;
            Ok(vec![unary_double(&args[0], name, op)?])
        });
    }

    interp.register_function("sign", |args| {
        expect_args("sign", args, 1)?;
        Ok(vec![unary_double(&args[0], "sign", |v| {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                v
            }
        })?])
    });

    interp.register_function("mod", |args| {
        expect_args("mod", args, 2)?;
        Ok(vec![elementwise_double(&args[0], &args[1], "mod", |a, b| {
            if b == 0.0 { a } else { a - (a / b).floor() * b }
        })?])
    });

    interp.register_function("rem", |args| {
        expect_args("rem", args, 2)?;
        Ok(vec![elementwise_double(&args[0], &args[1], "rem", |a, b| {
            if b == 0.0 { f64::NAN } else { a - (a / b).trunc() * b }
        })?])
    });

    interp.register_function("min", |args| reduce_extremum("min", args, true));
    interp.register_function("max", |args| reduce_extremum("max", args, false));

    interp.register_function("sum", |args| {
        expect_args("sum", args, 1)?;
        Ok(vec![reduce_columns(&args[0], "sum", |col| col.iter().sum())?])
    });

    interp.register_function("prod", |args| {
        expect_args("prod", args, 1)?;
        Ok(vec![reduce_columns(&args[0], "prod", |col| col.iter().product())?])
    });

    interp.register_function("mean", |args| {
        expect_args("mean", args, 1)?;
        Ok(vec![reduce_columns(&args[0], "mean", |col| {
            if col.is_empty() {
                f64::NAN
            } else {
                col.iter().sum::<f64>() / usize_to_f64(col.len())
            }
        })?])
    });

    interp.register_function("sort", |args| {
        expect_args_range("sort", args, 1, 2)?;
        let descending = match args.get(1) {
            Some(mode) => mode.to_string_value()? == "descend",
            None => false,
        };
        sort_value(&args[0], descending)
    });

    interp.register_function("find", |args| {
        expect_args("find", args, 1)?;
        let Some(a) = to_double_array(&args[0]) else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("find expects a numeric or logical array, got {}",
                                 args[0].kind_name()),
            });
        };
        let positions: Vec<f64> = a
            .data()
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(i, _)| usize_to_f64(i + 1))
            .collect();
        let n = positions.len();
        let dims = if a.dims().rows == 1 { Dims::new(1, n) } else { Dims::new(n, 1) };
        Ok(vec![Value::Double(NumArray::from_vec(dims, positions))])
    });
}

/// `min`/`max`: with two arguments, element-wise; with one, a reduction
/// that also yields the 1-based position of the extremum for vectors, or
/// a row of per-column extrema for matrices.
fn reduce_extremum(
    name: &str,
    args: &[Value],
    minimum: bool,
) -> Result<Vec<Value>, RuntimeError> {
    expect_args_range(name, args, 1, 2)?;
    if args.len() == 2 {
        let op = if minimum { f64::min } else { f64::max };
        return Ok(vec![elementwise_double(&args[0], &args[1], name, op)?]);
    }

    let Some(a) = to_double_array(&args[0]) else {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects a numeric array, got {}", args[0].kind_name()),
        });
    };
    if a.numel() == 0 {
        return Ok(vec![Value::Empty, Value::Empty]);
    }

    if a.dims().is_vector() || a.numel() == 1 {
        let mut best = a.data()[0];
        let mut at = 0usize;
        for (i, &v) in a.data().iter().enumerate().skip(1) {
            if (minimum && OrderedFloat(v) < OrderedFloat(best))
                || (!minimum && OrderedFloat(v) > OrderedFloat(best))
            {
                best = v;
                at = i;
            }
        }
        return Ok(vec![Value::scalar(best), Value::scalar(usize_to_f64(at + 1))]);
    }

    let d = a.dims();
    let mut out = Vec::with_capacity(d.cols);
    for c in 0..d.cols {
        let mut best = a.data()[d.sub2ind(0, c)];
        for r in 1..d.rows {
            let v = a.data()[d.sub2ind(r, c)];
            if (minimum && OrderedFloat(v) < OrderedFloat(best))
                || (!minimum && OrderedFloat(v) > OrderedFloat(best))
            {
                best = v;
            }
        }
        out.push(best);
    }
    Ok(vec![Value::row_vector(out)])
}

/// Applies a per-column reduction: vectors collapse to a scalar, matrices
/// to a row vector of column results.
fn reduce_columns(
    value: &Value,
    name: &str,
    f: impl Fn(&[f64]) -> f64,
) -> Result<Value, RuntimeError> {
    let Some(a) = to_double_array(value) else {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects a numeric array, got {}", value.kind_name()),
        });
    };
    if a.dims().is_vector() || a.numel() <= 1 {
        return Ok(Value::scalar(f(a.data())));
    }
    let d = a.dims();
    let mut out = Vec::with_capacity(d.cols);
    for c in 0..d.cols {
        let col: Vec<f64> = (0..d.rows).map(|r| a.data()[d.sub2ind(r, c)]).collect();
        out.push(f(&col));
    }
    Ok(Value::row_vector(out))
}

/// `sort`: vectors sort whole (returning the permutation as a second
/// result), matrices sort each column.
fn sort_value(value: &Value, descending: bool) -> Result<Vec<Value>, RuntimeError> {
    let Some(a) = to_double_array(value) else {
        return Err(RuntimeError::TypeMismatch {
            details: format!("sort expects a numeric array, got {}", value.kind_name()),
        });
    };

    if a.dims().is_vector() || a.numel() <= 1 {
        let mut order: Vec<usize> = (0..a.numel()).collect();
        order.sort_by_key(|&i| OrderedFloat(a.data()[i]));
        if descending {
            order.reverse();
        }
        let sorted: Vec<f64> = order.iter().map(|&i| a.data()[i]).collect();
        let perm: Vec<f64> = order.iter().map(|&i| usize_to_f64(i + 1)).collect();
        let dims = a.dims();
        return Ok(vec![
            Value::Double(NumArray::from_vec(dims, sorted)),
            Value::Double(NumArray::from_vec(dims, perm)),
        ]);
    }

    let d = a.dims();
    let mut data = vec![0.0f64; d.numel()];
    for c in 0..d.cols {
        let mut col: Vec<f64> = (0..d.rows).map(|r| a.data()[d.sub2ind(r, c)]).collect();
        col.sort_by_key(|&v| OrderedFloat(v));
        if descending {
            col.reverse();
        }
        for (r, v) in col.into_iter().enumerate() {
            data[d.sub2ind(r, c)] = v;
        }
    }
    Ok(vec![Value::Double(NumArray::from_vec(d, data))])
}
