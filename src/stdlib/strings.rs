use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::core::{CellArray, Value, fmt_double},
    },
    stdlib::helpers::{expect_args, expect_args_range},
};

/// Registers the string functions.
pub fn install(interp: &mut Interpreter) {
    interp.register_function("num2str", |args| {
        expect_args("num2str", args, 1)?;
        let a = &args[0];
        if a.is_char() {
            return Ok(vec![a.clone()]);
        }
        if let Value::Complex(arr) = a
            && arr.numel() == 1
        {
            return Ok(vec![Value::from_string(&arr.data()[0].to_string())]);
        }
        Ok(vec![Value::from_string(&fmt_double(a.to_scalar()?))])
    });

    interp.register_function("str2double", |args| {
        expect_args("str2double", args, 1)?;
        let text = args[0].to_string_value()?;
        let parsed = text.trim().parse::<f64>().unwrap_or(f64::NAN);
        Ok(vec![Value::scalar(parsed)])
    });

    // like str2double, but an unparsable string yields [] instead of NaN
    interp.register_function("str2num", |args| {
        expect_args("str2num", args, 1)?;
        let text = args[0].to_string_value()?;
        Ok(vec![match text.trim().parse::<f64>() {
            Ok(v) => Value::scalar(v),
            Err(_) => Value::Empty,
        }])
    });

    interp.register_function("strcat", |args| {
        let mut out = String::new();
        for a in args {
            out.push_str(&a.to_string_value()?);
        }
        Ok(vec![Value::from_string(&out)])
    });

    interp.register_function("strcmp", |args| {
        expect_args("strcmp", args, 2)?;
        let equal = match (args[0].to_string_value(), args[1].to_string_value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        Ok(vec![Value::logical_scalar(equal)])
    });

    interp.register_function("strcmpi", |args| {
        expect_args("strcmpi", args, 2)?;
        let equal = match (args[0].to_string_value(), args[1].to_string_value()) {
            (Ok(a), Ok(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => false,
        };
        Ok(vec![Value::logical_scalar(equal)])
    });

    // splits on a single-character delimiter (space by default), dropping
    // empty pieces; yields a 1×n cell of strings
    interp.register_function("strsplit", |args| {
        expect_args_range("strsplit", args, 1, 2)?;
        let text = args[0].to_string_value()?;
        let delim = match args.get(1) {
            Some(d) => d.to_string_value()?.chars().next().unwrap_or(' '),
            None => ' ',
        };
        let parts: Vec<&str> = text.split(delim).filter(|p| !p.is_empty()).collect();
        let mut cell = CellArray::new(1, parts.len());
        for (i, part) in parts.iter().enumerate() {
            cell.data_mut()[i] = Value::from_string(part);
        }
        Ok(vec![Value::Cell(cell)])
    });

    interp.register_function("upper", |args| {
        expect_args("upper", args, 1)?;
        Ok(vec![Value::from_string(
            &args[0].to_string_value()?.to_uppercase(),
        )])
    });

    interp.register_function("lower", |args| {
        expect_args("lower", args, 1)?;
        Ok(vec![Value::from_string(
            &args[0].to_string_value()?.to_lowercase(),
        )])
    });

    interp.register_function("strtrim", |args| {
        expect_args_range("strtrim", args, 1, 1)?;
        Ok(vec![Value::from_string(args[0].to_string_value()?.trim())])
    });
}
