use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::Interpreter,
        value::core::{Value, fmt_double},
    },
};

/// Registers the output functions.
///
/// `disp` and `fprintf` print through the interpreter's shared output
/// sink, so a sink installed later is still observed.
pub fn install(interp: &mut Interpreter) {
    let sink = interp.output_sink();
    interp.register_function("disp", move |args| {
        let mut out = String::new();
        for a in args {
            out.push_str(&render_disp(a));
        }
        let mut f = sink.borrow_mut();
        (*f)(&out);
        Ok(Vec::new())
    });

    let sink = interp.output_sink();
    interp.register_function("fprintf", move |args| {
        let text = format_args_list(args)?;
        let mut f = sink.borrow_mut();
        (*f)(&text);
        Ok(Vec::new())
    });

    interp.register_function("sprintf", |args| {
        let text = format_args_list(args)?;
        Ok(vec![Value::from_string(&text)])
    });

    interp.register_function("error", |args| {
        let message = if args.is_empty() {
            "Error".to_string()
        } else {
            format_args_list(args)?
        };
        Err(RuntimeError::Raised { message })
    });

    // non-fatal: prints the message and carries on
    let sink = interp.output_sink();
    interp.register_function("warning", move |args| {
        if !args.is_empty() {
            let text = format!("Warning: {}\n", format_args_list(args)?);
            let mut f = sink.borrow_mut();
            (*f)(&text);
        }
        Ok(Vec::new())
    });
}

/// The `disp` rendering: bare values, no `name =` header.
fn render_disp(value: &Value) -> String {
    match value {
        Value::Char(a) => format!("{}\n", String::from_utf8_lossy(a.data())),
        Value::Double(a) if a.numel() == 1 => format!("{}\n", fmt_double(a.data()[0])),
        Value::Double(a) => {
            let d = a.dims();
            let mut out = String::new();
            for r in 0..d.rows {
                out.push_str("  ");
                for c in 0..d.cols {
                    out.push_str(&format!("  {}", fmt_double(a.data()[d.sub2ind(r, c)])));
                }
                out.push('\n');
            }
            out
        }
        Value::Logical(a) if a.numel() == 1 => {
            format!("{}\n", if a.data()[0] != 0 { "1" } else { "0" })
        }
        Value::Logical(a) => {
            let d = a.dims();
            let mut out = String::new();
            for r in 0..d.rows {
                out.push_str("  ");
                for c in 0..d.cols {
                    out.push_str(if a.data()[d.sub2ind(r, c)] != 0 { "  1" } else { "  0" });
                }
                out.push('\n');
            }
            out
        }
        Value::Complex(a) if a.numel() == 1 => format!("{}\n", a.data()[0]),
        Value::Empty => String::new(),
        other => format!("{}\n", other.debug_string()),
    }
}

/// One positional item consumed by a `%` conversion.
enum FormatItem {
    Num(f64),
    Text(String),
}

/// Flattens format arguments: numeric arrays contribute each element,
/// char arrays one string each.
fn flatten_items(args: &[Value]) -> Result<Vec<FormatItem>, RuntimeError> {
    let mut items = Vec::new();
    for arg in args {
        match arg {
            Value::Char(_) => items.push(FormatItem::Text(arg.to_string_value()?)),
            Value::Double(a) => {
                for &v in a.data() {
                    items.push(FormatItem::Num(v));
                }
            }
            Value::Logical(a) => {
                for &v in a.data() {
                    items.push(FormatItem::Num(f64::from(v)));
                }
            }
            Value::Empty => {}
            other => {
                return Err(RuntimeError::TypeMismatch {
                    details: format!("Cannot format {} values", other.kind_name()),
                });
            }
        }
    }
    Ok(items)
}

/// `fprintf`-style formatting: the first argument is the format string,
/// the rest supply conversion values. The format recycles while items
/// remain, as long as it consumes at least one per pass.
fn format_args_list(args: &[Value]) -> Result<String, RuntimeError> {
    let Some(first) = args.first() else {
        return Ok(String::new());
    };
    let format = first.to_string_value()?;
    let items = flatten_items(&args[1..])?;

    let mut out = String::new();
    let mut pos = 0usize;
    loop {
        let consumed = format_once(&format, &items, &mut pos, &mut out);
        if pos >= items.len() || consumed == 0 {
            break;
        }
    }
    Ok(out)
}

/// Runs the format string once, consuming items from `pos`. Returns how
/// many items this pass consumed.
fn format_once(format: &str, items: &[FormatItem], pos: &mut usize, out: &mut String) -> usize {
    let mut consumed = 0usize;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    out.push('%');
                    continue;
                }
                // width / precision prefix, kept only for field width
                let mut spec = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == '-' || d == '+' {
                        spec.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let Some(conv) = chars.next() else {
                    out.push('%');
                    out.push_str(&spec);
                    break;
                };
                let item = items.get(*pos);
                if item.is_some() {
                    *pos += 1;
                    consumed += 1;
                }
                out.push_str(&render_conversion(conv, &spec, item));
            }
            other => out.push(other),
        }
    }
    consumed
}

fn render_conversion(conv: char, spec: &str, item: Option<&FormatItem>) -> String {
    let num = |v: f64| -> String {
        match conv {
            'd' | 'i' => fmt_double(v.trunc()),
            'f' => {
                let precision = spec
                    .split_once('.')
                    .and_then(|(_, p)| p.parse::<usize>().ok())
                    .unwrap_or(6);
                format!("{v:.precision$}")
            }
            'e' => format!("{v:e}"),
            _ => fmt_double(v),
        }
    };
    match item {
        Some(FormatItem::Num(v)) => {
            if conv == 's' {
                fmt_double(*v)
            } else {
                num(*v)
            }
        }
        Some(FormatItem::Text(s)) => s.clone(),
        None => String::new(),
    }
}
