use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::{
            complex::Complex,
            core::{NumArray, Value},
        },
    },
    stdlib::helpers::{expect_args, expect_args_range, to_complex_array},
};

/// Registers the complex-number accessors.
pub fn install(interp: &mut Interpreter) {
    interp.register_function("real", |args| {
        expect_args("real", args, 1)?;
        part(&args[0], "real", |c| c.re)
    });

    interp.register_function("imag", |args| {
        expect_args("imag", args, 1)?;
        part(&args[0], "imag", |c| c.im)
    });

    interp.register_function("angle", |args| {
        expect_args("angle", args, 1)?;
        part(&args[0], "angle", Complex::arg)
    });

    interp.register_function("conj", |args| {
        expect_args("conj", args, 1)?;
        if let Value::Complex(arr) = &args[0] {
            let data: Vec<Complex> = arr.data().iter().map(|c| c.conj()).collect();
            return Ok(vec![Value::Complex(NumArray::from_vec(arr.dims(), data))]);
        }
        // conjugation of a real value is the identity
        Ok(vec![args[0].clone()])
    });

    interp.register_function("complex", |args| {
        expect_args_range("complex", args, 1, 2)?;
        let re = args[0].to_scalar()?;
        let im = match args.get(1) {
            Some(v) => v.to_scalar()?,
            None => 0.0,
        };
        Ok(vec![Value::complex_scalar(re, im)])
    });

    interp.register_function("isreal", |args| {
        expect_args("isreal", args, 1)?;
        Ok(vec![Value::logical_scalar(!args[0].is_complex())])
    });
}

/// Extracts a real-valued component of each element.
fn part(
    value: &Value,
    name: &str,
    f: impl Fn(Complex) -> f64,
) -> Result<Vec<Value>, RuntimeError> {
    let Some(a) = to_complex_array(value) else {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects a numeric argument, got {}", value.kind_name()),
        });
    };
    let data: Vec<f64> = a.data().iter().map(|&c| f(c)).collect();
    Ok(vec![Value::Double(NumArray::from_vec(a.dims(), data))])
}
