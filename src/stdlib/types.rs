use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::core::{CellArray, NumArray, StructValue, Value},
    },
    stdlib::helpers::{expect_args, to_double_array},
    util::num::f64_to_usize,
};

/// Registers type predicates, conversions, and cell/struct utilities.
pub fn install(interp: &mut Interpreter) {
    for (name, pred) in [
        ("iscell", Value::is_cell as fn(&Value) -> bool),
        ("ischar", Value::is_char),
        ("islogical", Value::is_logical),
        ("isnumeric", Value::is_numeric),
        ("isstruct", Value::is_struct),
    ] {
        interp.register_function(name, move |args| {
            expect_args(name, args, 1)?;
            Ok(vec![Value::logical_scalar(pred(&args[0]))])
        });
    }

    interp.register_function("double", |args| {
        expect_args("double", args, 1)?;
        let a = &args[0];
        match a {
            Value::Double(_) => Ok(vec![a.clone()]),
            Value::Logical(arr) | Value::Char(arr) => {
                let data: Vec<f64> = arr.data().iter().map(|&v| f64::from(v)).collect();
                Ok(vec![Value::Double(NumArray::from_vec(arr.dims(), data))])
            }
            Value::Empty => Ok(vec![Value::Empty]),
            other => Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to double", other.kind_name()),
            }),
        }
    });

    interp.register_function("char", |args| {
        expect_args("char", args, 1)?;
        let a = &args[0];
        if a.is_char() {
            return Ok(vec![a.clone()]);
        }
        let Some(arr) = to_double_array(a) else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to char", a.kind_name()),
            });
        };
        let mut bytes = Vec::with_capacity(arr.numel());
        for &v in arr.data() {
            if !(0.0..=255.0).contains(&v) || v != v.floor() {
                return Err(RuntimeError::TypeMismatch {
                    details: format!("Cannot convert {v} to a character code"),
                });
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            bytes.push(v as u8);
        }
        Ok(vec![Value::Char(NumArray::from_vec(arr.dims(), bytes))])
    });

    interp.register_function("logical", |args| {
        expect_args("logical", args, 1)?;
        let Some(arr) = to_double_array(&args[0]) else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("Cannot convert {} to logical", args[0].kind_name()),
            });
        };
        let data: Vec<u8> = arr.data().iter().map(|&v| u8::from(v != 0.0)).collect();
        Ok(vec![Value::Logical(NumArray::from_vec(arr.dims(), data))])
    });

    interp.register_function("cell", |args| {
        let (r, c) = match args {
            [] => (0, 0),
            [n] => {
                let n = index_like("cell", n)?;
                (n, n)
            }
            [r, c] => (index_like("cell", r)?, index_like("cell", c)?),
            _ => {
                return Err(RuntimeError::BadArity {
                    name: "cell".to_string(),
                    details: format!("expected 0 to 2 arguments, got {}", args.len()),
                });
            }
        };
        Ok(vec![Value::Cell(CellArray::new(r, c))])
    });

    interp.register_function("struct", |args| {
        if args.len() % 2 != 0 {
            return Err(RuntimeError::BadArity {
                name: "struct".to_string(),
                details: "expected name/value argument pairs".to_string(),
            });
        }
        let mut s = StructValue::new();
        for pair in args.chunks(2) {
            let field = pair[0].to_string_value()?;
            *s.field_mut(&field) = pair[1].clone();
        }
        Ok(vec![Value::Struct(s)])
    });

    interp.register_function("isfield", |args| {
        expect_args("isfield", args, 2)?;
        let field = args[1].to_string_value()?;
        let has = matches!(&args[0], Value::Struct(s) if s.has_field(&field));
        Ok(vec![Value::logical_scalar(has)])
    });

    interp.register_function("fieldnames", |args| {
        expect_args("fieldnames", args, 1)?;
        let Value::Struct(s) = &args[0] else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("fieldnames expects a struct, got {}", args[0].kind_name()),
            });
        };
        let mut cell = CellArray::new(s.fields().len(), 1);
        for (i, (name, _)) in s.fields().iter().enumerate() {
            cell.data_mut()[i] = Value::from_string(name);
        }
        Ok(vec![Value::Cell(cell)])
    });

    interp.register_function("rmfield", |args| {
        expect_args("rmfield", args, 2)?;
        let Value::Struct(s) = &args[0] else {
            return Err(RuntimeError::TypeMismatch {
                details: format!("rmfield expects a struct, got {}", args[0].kind_name()),
            });
        };
        let field = args[1].to_string_value()?;
        let mut out = s.clone();
        if !out.remove_field(&field) {
            return Err(RuntimeError::TypeMismatch {
                details: format!("Reference to non-existent field '{field}'"),
            });
        }
        Ok(vec![Value::Struct(out)])
    });

    interp.register_function("isnan", |args| {
        expect_args("isnan", args, 1)?;
        predicate_map(&args[0], "isnan", f64::is_nan)
    });

    interp.register_function("isinf", |args| {
        expect_args("isinf", args, 1)?;
        predicate_map(&args[0], "isinf", f64::is_infinite)
    });
}

fn index_like(name: &str, value: &Value) -> Result<usize, RuntimeError> {
    let v = value.to_scalar()?;
    if v < 0.0 || v != v.floor() {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects non-negative integer sizes, got {v}"),
        });
    }
    Ok(f64_to_usize(v))
}

/// Maps a per-element predicate over a numeric array into a logical array.
fn predicate_map(
    value: &Value,
    name: &str,
    pred: impl Fn(f64) -> bool,
) -> Result<Vec<Value>, RuntimeError> {
    let Some(arr) = to_double_array(value) else {
        return Err(RuntimeError::TypeMismatch {
            details: format!("{name} expects a numeric array, got {}", value.kind_name()),
        });
    };
    let data: Vec<u8> = arr.data().iter().map(|&v| u8::from(pred(v))).collect();
    Ok(vec![Value::Logical(NumArray::from_vec(arr.dims(), data))])
}
