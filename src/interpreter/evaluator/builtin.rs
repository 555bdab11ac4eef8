use crate::{
    error::RuntimeError,
    interpreter::{
        environment::EnvRef,
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

impl Interpreter {
    /// Handles the handful of builtins that need access to the current
    /// environment and interpreter state: `clear`, `who`, `whos`,
    /// `exist`, and `class`. Everything else lives in the registry.
    ///
    /// Returns `Ok(None)` when `name` is not one of them.
    pub(crate) fn try_core_builtin(
        &mut self,
        name: &str,
        args: &[Value],
        env: &EnvRef,
    ) -> EvalResult<Option<Value>> {
        match name {
            "clear" => {
                if args.is_empty() {
                    let names = env.borrow().local_names();
                    let mut scope = env.borrow_mut();
                    for n in names {
                        scope.remove(&n);
                    }
                } else {
                    let mut scope = env.borrow_mut();
                    for arg in args {
                        if let Ok(n) = arg.to_string_value() {
                            scope.remove(&n);
                        }
                    }
                }
                Ok(Some(Value::Empty))
            }
            "who" => {
                let mut names = env.borrow().local_names();
                names.sort();
                let mut out = String::from("Your variables are:\n");
                for n in &names {
                    if n == "ans" || n == "nargin" || n == "nargout" {
                        continue;
                    }
                    out.push_str(&format!("  {n}\n"));
                }
                self.output(&out);
                Ok(Some(Value::Empty))
            }
            "whos" => {
                let mut names = env.borrow().local_names();
                names.sort();
                let mut out = String::from("  Name              Size            Bytes  Class\n");
                for n in &names {
                    if n == "ans" || n == "nargin" || n == "nargout" {
                        continue;
                    }
                    let Some(value) = env.borrow().get(n) else { continue };
                    let d = value.dims();
                    let mut size = format!("{}x{}", d.rows, d.cols);
                    if d.is_3d() {
                        size.push_str(&format!("x{}", d.pages));
                    }
                    let bytes = value.numel() * element_bytes(&value);
                    out.push_str(&format!(
                        "  {n:<16}{size:<16}{bytes:>5}  {}\n",
                        value.kind_name()
                    ));
                }
                self.output(&out);
                Ok(Some(Value::Empty))
            }
            "exist" => {
                let Some(first) = args.first() else {
                    return Err(RuntimeError::BadArity {
                        name: "exist".to_string(),
                        details: "expected a name argument".to_string(),
                    });
                };
                let target = first.to_string_value()?;
                let code = if env.borrow().has(&target) {
                    1.0
                } else if self.registry.has_function(&target)
                    || self.user_funcs.contains_key(&target)
                {
                    5.0
                } else {
                    0.0
                };
                Ok(Some(Value::scalar(code)))
            }
            "class" => {
                let Some(first) = args.first() else {
                    return Err(RuntimeError::BadArity {
                        name: "class".to_string(),
                        details: "expected an argument".to_string(),
                    });
                };
                Ok(Some(Value::from_string(first.kind_name())))
            }
            _ => Ok(None),
        }
    }
}

/// Per-element byte size of the buffered kinds, for `whos`.
fn element_bytes(value: &Value) -> usize {
    match value {
        Value::Double(_) => 8,
        Value::Complex(_) => 16,
        Value::Logical(_) | Value::Char(_) => 1,
        _ => 0,
    }
}
