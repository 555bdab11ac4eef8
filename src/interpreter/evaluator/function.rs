use std::rc::Rc;

use crate::{
    ast::{Block, Expr, Stmt},
    error::RuntimeError,
    interpreter::{
        environment::{self, EnvRef, Environment},
        evaluator::core::{EvalResult, Flow, Interpreter, UserFunction},
        value::core::Value,
    },
    util::num::usize_to_f64,
};

impl Interpreter {
    /// Evaluates `target(args)`.
    ///
    /// For an identifier target the resolution order is: a function
    /// handle bound in the environment; an indexable variable (index
    /// read); a core builtin; a registered function; a user function.
    /// A variable of any other kind raises a typed error, an unbound
    /// name an undefined error. Non-identifier targets are evaluated
    /// and then called or indexed by kind.
    pub(crate) fn eval_call(
        &mut self,
        target: &Expr,
        args: &[Expr],
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let Expr::Identifier { name, .. } = target else {
            // chained form: (expr)(args)
            let value = self.eval_expr(target, env)?;
            if let Value::FuncHandle(handle) = &value {
                let handle = handle.clone();
                let arg_values = self.eval_args(args, env)?;
                let mut results = self.call_handle_multi(&handle, arg_values, 1)?;
                return Ok(if results.is_empty() { Value::Empty } else { results.remove(0) });
            }
            if value.is_numeric() || value.is_logical() || value.is_char() || value.is_cell() {
                return self.index_read(&value, args, env);
            }
            return Err(RuntimeError::TypeMismatch {
                details: format!(
                    "Cannot call or index into value of type {}",
                    value.kind_name()
                ),
            });
        };

        let bound = env.borrow().get(name);
        if let Some(value) = bound {
            if let Value::FuncHandle(handle) = &value {
                let handle = handle.clone();
                let arg_values = self.eval_args(args, env)?;
                let mut results = self.call_handle_multi(&handle, arg_values, 1)?;
                return Ok(if results.is_empty() { Value::Empty } else { results.remove(0) });
            }
            if value.is_numeric() || value.is_logical() || value.is_char() || value.is_cell() {
                return self.index_read(&value, args, env);
            }
            // another kind is bound: fall through to function lookup, and
            // report the kind if nothing resolves
            let arg_values = self.eval_args(args, env)?;
            if let Some(result) = self.try_core_builtin(name, &arg_values, env)? {
                return Ok(result);
            }
            if let Some(f) = self.registry.function(name) {
                let results = f(&arg_values)?;
                return Ok(results.into_iter().next().unwrap_or(Value::Empty));
            }
            if let Some(func) = self.user_funcs.get(name).cloned() {
                return self.call_user_function(&func, arg_values);
            }
            return Err(RuntimeError::TypeMismatch {
                details: format!(
                    "Cannot index into variable '{name}' of type {}, and no function '{name}' \
                     was found",
                    value.kind_name()
                ),
            });
        }

        let arg_values = self.eval_args(args, env)?;
        if let Some(result) = self.try_core_builtin(name, &arg_values, env)? {
            return Ok(result);
        }
        if let Some(f) = self.registry.function(name) {
            let results = f(&arg_values)?;
            return Ok(results.into_iter().next().unwrap_or(Value::Empty));
        }
        if let Some(func) = self.user_funcs.get(name).cloned() {
            return self.call_user_function(&func, arg_values);
        }
        Err(RuntimeError::Undefined { name: name.clone() })
    }

    fn eval_args(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, env)?);
        }
        Ok(values)
    }

    /// Evaluates the right-hand side of a multi-assignment with the
    /// requested output count. Only a call expression is accepted.
    pub(crate) fn eval_call_multi(
        &mut self,
        call: &Expr,
        nout: usize,
        env: &EnvRef,
    ) -> EvalResult<Vec<Value>> {
        let Expr::Call { target, args, .. } = call else {
            return Err(RuntimeError::TypeMismatch {
                details: "Expected a function call on the right-hand side of a multi-assignment"
                    .to_string(),
            });
        };
        let Expr::Identifier { name, .. } = &**target else {
            return Err(RuntimeError::TypeMismatch {
                details: "Expected a function call on the right-hand side of a multi-assignment"
                    .to_string(),
            });
        };

        let arg_values = self.eval_args(args, env)?;

        let bound = env.borrow().get(name);
        if let Some(Value::FuncHandle(handle)) = bound {
            return self.call_handle_multi(&handle, arg_values, nout);
        }
        if let Some(f) = self.registry.function(name) {
            return f(&arg_values);
        }
        if let Some(func) = self.user_funcs.get(name).cloned() {
            return self.call_user_function_multi(&func, arg_values, nout);
        }
        Err(RuntimeError::Undefined { name: name.clone() })
    }

    /// Calls the function a handle refers to.
    pub(crate) fn call_handle_multi(
        &mut self,
        handle: &str,
        args: Vec<Value>,
        nout: usize,
    ) -> EvalResult<Vec<Value>> {
        if let Some(f) = self.registry.function(handle) {
            return f(&args);
        }
        if let Some(func) = self.user_funcs.get(handle).cloned() {
            return self.call_user_function_multi(&func, args, nout);
        }
        Err(RuntimeError::Undefined { name: format!("@{handle}") })
    }

    /// Calls a user function for a single result.
    pub(crate) fn call_user_function(
        &mut self,
        func: &UserFunction,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        let nout = func.returns.len().max(1);
        let mut results = self.call_user_function_multi(func, args, nout)?;
        Ok(if results.is_empty() { Value::Empty } else { results.remove(0) })
    }

    /// Calls a user function.
    ///
    /// A fresh environment is created under the closure snapshot (or the
    /// root environment), parameters are bound in order, `nargin` and
    /// `nargout` are set, and every declared return variable starts
    /// empty. A `return` signal ends the body normally. Results are read
    /// back from the declared return names and truncated to `nout`.
    pub(crate) fn call_user_function_multi(
        &mut self,
        func: &UserFunction,
        args: Vec<Value>,
        nout: usize,
    ) -> EvalResult<Vec<Value>> {
        if args.len() > func.params.len() {
            return Err(RuntimeError::BadArity {
                name: func.name.clone(),
                details: format!(
                    "expected at most {} arguments, got {}",
                    func.params.len(),
                    args.len()
                ),
            });
        }

        self.recursion_depth += 1;
        if self.recursion_depth > self.max_recursion_depth {
            self.recursion_depth -= 1;
            return Err(RuntimeError::RecursionDepthExceeded { max: self.max_recursion_depth });
        }

        let parent = func
            .closure
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.global_env));
        let local = Environment::new_ref(Some(parent), Rc::clone(&self.global_store));

        {
            let mut scope = local.borrow_mut();
            let nargin = args.len();
            for (param, value) in func.params.iter().zip(args) {
                scope.set_local(param, value);
            }
            scope.set_local("nargin", Value::scalar(usize_to_f64(nargin)));
            scope.set_local("nargout", Value::scalar(usize_to_f64(nout)));
            for ret in &func.returns {
                if scope.get_local(ret).is_none() {
                    scope.set_local(ret, Value::Empty);
                }
            }
        }

        let outcome = self.exec_block(&func.body, &local);
        self.recursion_depth -= 1;

        match outcome? {
            Flow::Normal(_) | Flow::Return => {}
            Flow::Break => {
                return Err(RuntimeError::ControlOutsideLoop { keyword: "break" });
            }
            Flow::Continue => {
                return Err(RuntimeError::ControlOutsideLoop { keyword: "continue" });
            }
        }

        let scope = local.borrow();
        let mut results = Vec::with_capacity(func.returns.len().min(nout));
        for ret in func.returns.iter().take(nout) {
            let value = scope
                .get_local(ret)
                .or_else(|| scope.get(ret))
                .unwrap_or(Value::Empty);
            results.push(value);
        }
        Ok(results)
    }

    /// Evaluates `@(params) expr`.
    ///
    /// Installs a synthetic user function whose single statement assigns
    /// the body expression to a fresh return variable, and whose closure
    /// is a deep snapshot of the defining environment chain (stopping
    /// before the root, which stays live). Returns a handle bearing the
    /// synthetic name.
    pub(crate) fn eval_anon_func(
        &mut self,
        params: &[String],
        body: &Expr,
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let id = self.anon_counter;
        self.anon_counter += 1;
        let name = format!("__anon_{id}");

        let line = body.line_number();
        let body_block = Block {
            stmts: vec![Stmt::Assign {
                target: Expr::Identifier { name: "__result__".to_string(), line },
                value: body.clone(),
                suppress: true,
                line,
            }],
        };

        let closure = environment::snapshot(env, &self.global_env);
        self.user_funcs.insert(
            name.clone(),
            UserFunction {
                name: name.clone(),
                params: params.to_vec(),
                returns: vec!["__result__".to_string()],
                body: Rc::new(body_block),
                closure: Some(closure),
            },
        );

        Ok(Value::FuncHandle(name))
    }
}
