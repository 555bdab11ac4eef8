use crate::{
    ast::{Block, Branch, Expr},
    error::RuntimeError,
    interpreter::{
        environment::EnvRef,
        evaluator::core::{ExecResult, Flow, Interpreter},
        value::{
            core::{CellArray, NumArray, Value},
            dims::Dims,
        },
    },
};

impl Interpreter {
    /// Executes an `if`/`elseif`/`else` chain: the first branch whose
    /// condition is true runs; its flow (including signals) propagates.
    pub(crate) fn exec_if(
        &mut self,
        branches: &[Branch],
        else_body: Option<&Block>,
        env: &EnvRef,
    ) -> ExecResult {
        for (cond, body) in branches {
            if self.eval_expr(cond, env)?.to_bool()? {
                return self.exec_block(body, env);
            }
        }
        match else_body {
            Some(body) => self.exec_block(body, env),
            None => Ok(Flow::Normal(Value::Empty)),
        }
    }

    /// Executes a `while` loop, consuming `break`/`continue` signals and
    /// passing `return` upward.
    pub(crate) fn exec_while(&mut self, cond: &Expr, body: &Block, env: &EnvRef) -> ExecResult {
        while self.eval_expr(cond, env)?.to_bool()? {
            match self.exec_block(body, env)? {
                Flow::Break => break,
                Flow::Continue | Flow::Normal(_) => {}
                Flow::Return => return Ok(Flow::Return),
            }
        }
        Ok(Flow::Normal(Value::Empty))
    }

    /// Executes a `for` loop.
    ///
    /// The target is evaluated once. A double matrix yields each column
    /// in turn (a scalar when it has one row); a cell yields each column
    /// cell-wise; a char or logical array yields each element. Other
    /// kinds are errors.
    pub(crate) fn exec_for(
        &mut self,
        var: &str,
        target: &Expr,
        body: &Block,
        env: &EnvRef,
    ) -> ExecResult {
        let range = self.eval_expr(target, env)?;

        match &range {
            Value::Cell(cell) => {
                let d = cell.dims();
                for c in 0..d.cols {
                    let item = if d.rows == 1 {
                        cell.data()[c].clone()
                    } else {
                        let mut col = CellArray::new(d.rows, 1);
                        for r in 0..d.rows {
                            col.data_mut()[r] = cell.data()[d.sub2ind(r, c)].clone();
                        }
                        Value::Cell(col)
                    };
                    env.borrow_mut().set(var, item);
                    match self.exec_block(body, env)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal(_) => {}
                        Flow::Return => return Ok(Flow::Return),
                    }
                }
            }
            Value::Double(a) => {
                let d = a.dims();
                for c in 0..d.cols {
                    let item = if d.rows == 1 {
                        Value::scalar(a.data()[c])
                    } else {
                        let col: Vec<f64> =
                            (0..d.rows).map(|r| a.data()[d.sub2ind(r, c)]).collect();
                        Value::Double(NumArray::from_vec(Dims::new(d.rows, 1), col))
                    };
                    env.borrow_mut().set(var, item);
                    match self.exec_block(body, env)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal(_) => {}
                        Flow::Return => return Ok(Flow::Return),
                    }
                }
            }
            Value::Char(a) => {
                for &unit in a.data() {
                    let item = Value::Char(NumArray::from_vec(Dims::new(1, 1), vec![unit]));
                    env.borrow_mut().set(var, item);
                    match self.exec_block(body, env)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal(_) => {}
                        Flow::Return => return Ok(Flow::Return),
                    }
                }
            }
            Value::Logical(a) => {
                for &bit in a.data() {
                    env.borrow_mut().set(var, Value::scalar(f64::from(bit)));
                    match self.exec_block(body, env)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal(_) => {}
                        Flow::Return => return Ok(Flow::Return),
                    }
                }
            }
            other => {
                return Err(RuntimeError::Unsupported {
                    details: format!("Unsupported type in for loop: {}", other.kind_name()),
                });
            }
        }
        Ok(Flow::Normal(Value::Empty))
    }

    /// Executes a `switch`.
    ///
    /// The selector is evaluated once; a case whose expression is a cell
    /// matches when any of its elements equals the selector. Equality is
    /// scalar value equality for numerics and logicals, and string
    /// equality for chars. No match falls through to `otherwise`.
    pub(crate) fn exec_switch(
        &mut self,
        selector: &Expr,
        cases: &[Branch],
        otherwise: Option<&Block>,
        env: &EnvRef,
    ) -> ExecResult {
        let sv = self.eval_expr(selector, env)?;

        for (case_expr, body) in cases {
            let cv = self.eval_expr(case_expr, env)?;
            let matched = if let Value::Cell(cell) = &cv {
                cell.data().iter().any(|elem| case_matches(&sv, elem))
            } else {
                case_matches(&sv, &cv)
            };
            if matched {
                return self.exec_block(body, env);
            }
        }

        match otherwise {
            Some(body) => self.exec_block(body, env),
            None => Ok(Flow::Normal(Value::Empty)),
        }
    }

    /// Executes `try`/`catch`.
    ///
    /// Control-flow signals pass straight through; a runtime error runs
    /// the handler with, when the clause names an identifier, a struct
    /// carrying `message` and `identifier` fields. A `try` without a
    /// `catch` clause swallows the error.
    pub(crate) fn exec_try_catch(
        &mut self,
        body: &Block,
        catch_var: Option<&str>,
        handler: Option<&Block>,
        env: &EnvRef,
    ) -> ExecResult {
        match self.exec_block(body, env) {
            Ok(flow) => Ok(flow),
            Err(error) => {
                let Some(handler) = handler else {
                    return Ok(Flow::Normal(Value::Empty));
                };
                if let Some(name) = catch_var {
                    let mut err = crate::interpreter::value::core::StructValue::new();
                    *err.field_mut("message") = Value::from_string(&error.to_string());
                    *err.field_mut("identifier") = Value::from_string("matra:error");
                    env.borrow_mut().set(name, Value::Struct(err));
                }
                self.exec_block(handler, env)
            }
        }
    }
}

/// Scalar equality between a switch selector and one case alternative.
fn case_matches(sv: &Value, cv: &Value) -> bool {
    if sv.is_char() && cv.is_char() {
        return sv.to_string_value().ok() == cv.to_string_value().ok();
    }
    if sv.is_logical() && cv.is_logical() && sv.is_scalar() && cv.is_scalar() {
        return sv.to_bool().ok() == cv.to_bool().ok();
    }
    if sv.is_numeric() && cv.is_numeric() && sv.is_scalar() && cv.is_scalar() {
        if let (Ok(a), Ok(b)) = (sv.to_complex(), cv.to_complex()) {
            return a == b;
        }
    }
    false
}
