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
        dims_match, elementwise_complex, elementwise_double, to_complex_array, to_double_array,
        to_logical_array, transpose_array,
    },
};

/// Registers the binary and unary operator tables.
pub fn install(interp: &mut Interpreter) {
    register_arithmetic(interp);
    register_comparisons(interp);
    register_logical(interp);
    register_unary(interp);
}

fn register_arithmetic(interp: &mut Interpreter) {
    interp.register_binary_op("+", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, "+", |x, y| x + y);
        }
        if a.is_char() && b.is_char() {
            let joined = a.to_string_value()? + &b.to_string_value()?;
            return Ok(Value::from_string(&joined));
        }
        elementwise_double(a, b, "+", |x, y| x + y)
    });

    interp.register_binary_op("-", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, "-", |x, y| x - y);
        }
        elementwise_double(a, b, "-", |x, y| x - y)
    });

    interp.register_binary_op(".*", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, ".*", |x, y| x * y);
        }
        elementwise_double(a, b, ".*", |x, y| x * y)
    });

    interp.register_binary_op("./", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, "./", |x, y| x / y);
        }
        elementwise_double(a, b, "./", |x, y| x / y)
    });

    interp.register_binary_op(".\\", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, ".\\", |x, y| y / x);
        }
        elementwise_double(a, b, ".\\", |x, y| y / x)
    });

    interp.register_binary_op("*", matrix_multiply);

    interp.register_binary_op("/", |a, b| {
        if a.is_complex() || b.is_complex() {
            if a.is_scalar() || b.is_scalar() {
                return elementwise_complex(a, b, "/", |x, y| x / y);
            }
            return Err(RuntimeError::Unsupported {
                details: "Matrix right division is not implemented".to_string(),
            });
        }
        if b.is_scalar() || (a.is_scalar() && b.is_scalar()) {
            return elementwise_double(a, b, "/", |x, y| x / y);
        }
        Err(RuntimeError::Unsupported {
            details: "Matrix right division is not implemented".to_string(),
        })
    });

    interp.register_binary_op("\\", |a, b| {
        if a.is_scalar() {
            if a.is_complex() || b.is_complex() {
                return elementwise_complex(a, b, "\\", |x, y| y / x);
            }
            return elementwise_double(a, b, "\\", |x, y| y / x);
        }
        Err(RuntimeError::Unsupported {
            details: "Matrix left division is not implemented".to_string(),
        })
    });

    interp.register_binary_op("^", |a, b| {
        if a.is_complex() || b.is_complex() {
            let x = a.to_complex()?;
            let y = b.to_complex()?;
            let r = x.powc(y);
            return Ok(Value::complex_scalar(r.re, r.im));
        }
        if a.is_scalar() && b.is_scalar() {
            let x = a.to_scalar()?;
            let y = b.to_scalar()?;
            // a negative base with a fractional exponent leaves the reals
            if x < 0.0 && y != y.trunc() {
                let r = Complex::from(x).powc(Complex::from(y));
                return Ok(Value::complex_scalar(r.re, r.im));
            }
            return Ok(Value::scalar(x.powf(y)));
        }
        Err(RuntimeError::Unsupported {
            details: "Matrix power is not implemented".to_string(),
        })
    });

    interp.register_binary_op(".^", |a, b| {
        if a.is_complex() || b.is_complex() {
            return elementwise_complex(a, b, ".^", Complex::powc);
        }
        elementwise_double(a, b, ".^", f64::powf)
    });
}

/// `*`: scalar operands broadcast element-wise, matrix operands take the
/// inner-product path with an inner-dimension check.
fn matrix_multiply(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if a.is_complex() || b.is_complex() {
        if a.is_scalar() || b.is_scalar() {
            return elementwise_complex(a, b, "*", |x, y| x * y);
        }
        let (Some(x), Some(y)) = (to_complex_array(a), to_complex_array(b)) else {
            return Err(RuntimeError::Unsupported {
                details: "Unsupported types for *".to_string(),
            });
        };
        let (m, k, n) = (x.dims().rows, x.dims().cols, y.dims().cols);
        if k != y.dims().rows {
            return Err(RuntimeError::DimensionMismatch {
                details: "Inner matrix dimensions must agree".to_string(),
            });
        }
        let xd = x.dims();
        let yd = y.dims();
        let mut data = vec![Complex::default(); m * n];
        for j in 0..n {
            for i in 0..m {
                let mut s = Complex::default();
                for t in 0..k {
                    s = s + x.data()[xd.sub2ind(i, t)] * y.data()[yd.sub2ind(t, j)];
                }
                data[j * m + i] = s;
            }
        }
        return Ok(Value::Complex(NumArray::from_vec(Dims::new(m, n), data)));
    }

    if a.is_scalar() || b.is_scalar() {
        return elementwise_double(a, b, "*", |x, y| x * y);
    }

    let (Some(x), Some(y)) = (to_double_array(a), to_double_array(b)) else {
        return Err(RuntimeError::Unsupported {
            details: "Unsupported types for *".to_string(),
        });
    };
    let (m, k, n) = (x.dims().rows, x.dims().cols, y.dims().cols);
    if k != y.dims().rows {
        return Err(RuntimeError::DimensionMismatch {
            details: "Inner matrix dimensions must agree".to_string(),
        });
    }
    let xd = x.dims();
    let yd = y.dims();
    let mut data = vec![0.0f64; m * n];
    for j in 0..n {
        for i in 0..m {
            let mut s = 0.0;
            for t in 0..k {
                s += x.data()[xd.sub2ind(i, t)] * y.data()[yd.sub2ind(t, j)];
            }
            data[j * m + i] = s;
        }
    }
    Ok(Value::Double(NumArray::from_vec(Dims::new(m, n), data)))
}

fn register_comparisons(interp: &mut Interpreter) {
    for (symbol, cmp) in [
        ("==", (|x, y| x == y) as fn(f64, f64) -> bool),
        ("~=", |x, y| x != y),
        ("<", |x, y| x < y),
        (">", |x, y| x > y),
        ("<=", |x, y| x <= y),
        (">=", |x, y| x >= y),
    ] {
        let is_eq = symbol == "==";
        let is_ne = symbol == "~=";
        interp.register_binary_op(symbol, move |a, b| {
            // string comparison for the equality forms
            if a.is_char() && b.is_char() && (is_eq || is_ne) {
                let equal = a.to_string_value()? == b.to_string_value()?;
                return Ok(Value::logical_scalar(if is_eq { equal } else { !equal }));
            }

            let (Some(x), Some(y)) = (to_double_array(a), to_double_array(b)) else {
                return Err(RuntimeError::Unsupported {
                    details: format!("Unsupported types for comparison: {} and {}",
                                     a.kind_name(),
                                     b.kind_name()),
                });
            };

            if x.numel() == 1 && y.numel() == 1 {
                return Ok(Value::logical_scalar(cmp(x.data()[0], y.data()[0])));
            }
            if x.numel() == 1 {
                let xv = x.data()[0];
                let data: Vec<u8> = y.data().iter().map(|&v| u8::from(cmp(xv, v))).collect();
                return Ok(Value::Logical(NumArray::from_vec(y.dims(), data)));
            }
            if y.numel() == 1 {
                let yv = y.data()[0];
                let data: Vec<u8> = x.data().iter().map(|&v| u8::from(cmp(v, yv))).collect();
                return Ok(Value::Logical(NumArray::from_vec(x.dims(), data)));
            }
            if !dims_match(x.dims(), y.dims()) {
                return Err(RuntimeError::DimensionMismatch {
                    details: "Matrix dimensions must agree for comparison".to_string(),
                });
            }
            let data: Vec<u8> = x
                .data()
                .iter()
                .zip(y.data())
                .map(|(&xv, &yv)| u8::from(cmp(xv, yv)))
                .collect();
            Ok(Value::Logical(NumArray::from_vec(x.dims(), data)))
        });
    }
}

fn register_logical(interp: &mut Interpreter) {
    for (symbol, op) in [
        ("&", (|x, y| x && y) as fn(bool, bool) -> bool),
        ("|", |x, y| x || y),
    ] {
        interp.register_binary_op(symbol, move |a, b| {
            if a.is_scalar() && b.is_scalar() {
                return Ok(Value::logical_scalar(op(a.to_bool()?, b.to_bool()?)));
            }
            let (Some(x), Some(y)) = (to_logical_array(a), to_logical_array(b)) else {
                return Err(RuntimeError::Unsupported {
                    details: format!("Unsupported types for {symbol}"),
                });
            };
            if x.numel() == 1 {
                let xv = x.data()[0] != 0;
                let data: Vec<u8> =
                    y.data().iter().map(|&v| u8::from(op(xv, v != 0))).collect();
                return Ok(Value::Logical(NumArray::from_vec(y.dims(), data)));
            }
            if y.numel() == 1 {
                let yv = y.data()[0] != 0;
                let data: Vec<u8> =
                    x.data().iter().map(|&v| u8::from(op(v != 0, yv))).collect();
                return Ok(Value::Logical(NumArray::from_vec(x.dims(), data)));
            }
            if x.numel() != y.numel() {
                return Err(RuntimeError::DimensionMismatch {
                    details: format!("Matrix dimensions must agree for {symbol}"),
                });
            }
            let data: Vec<u8> = x
                .data()
                .iter()
                .zip(y.data())
                .map(|(&xv, &yv)| u8::from(op(xv != 0, yv != 0)))
                .collect();
            Ok(Value::Logical(NumArray::from_vec(x.dims(), data)))
        });
    }
}

fn register_unary(interp: &mut Interpreter) {
    interp.register_unary_op("-", |a| {
        if a.is_complex() {
            return crate::stdlib::helpers::unary_complex(a, "-", |v| -v);
        }
        crate::stdlib::helpers::unary_double(a, "-", |v| -v)
    });

    interp.register_unary_op("+", |a| Ok(a.clone()));

    interp.register_unary_op("~", |a| {
        let Some(x) = to_logical_array(a) else {
            return Ok(Value::logical_scalar(!a.to_bool()?));
        };
        let data: Vec<u8> = x.data().iter().map(|&v| u8::from(v == 0)).collect();
        if data.len() == 1 {
            return Ok(Value::logical_scalar(data[0] != 0));
        }
        Ok(Value::Logical(NumArray::from_vec(x.dims(), data)))
    });

    // conjugate transpose
    interp.register_unary_op("'", |a| match a {
        Value::Empty => Ok(Value::Empty),
        Value::Complex(arr) => {
            let t = transpose_array(arr);
            let data: Vec<Complex> = t.data().iter().map(|c| c.conj()).collect();
            Ok(Value::Complex(NumArray::from_vec(t.dims(), data)))
        }
        Value::Double(arr) => Ok(Value::Double(transpose_array(arr))),
        Value::Logical(arr) => Ok(Value::Logical(transpose_array(arr))),
        Value::Char(arr) => Ok(Value::Char(transpose_array(arr))),
        other => Err(RuntimeError::TypeMismatch {
            details: format!("Transpose is not supported for {} values", other.kind_name()),
        }),
    });

    // non-conjugate transpose
    interp.register_unary_op(".'", |a| match a {
        Value::Empty => Ok(Value::Empty),
        Value::Complex(arr) => Ok(Value::Complex(transpose_array(arr))),
        Value::Double(arr) => Ok(Value::Double(transpose_array(arr))),
        Value::Logical(arr) => Ok(Value::Logical(transpose_array(arr))),
        Value::Char(arr) => Ok(Value::Char(transpose_array(arr))),
        other => Err(RuntimeError::TypeMismatch {
            details: format!("Transpose is not supported for {} values", other.kind_name()),
        }),
    });
}
