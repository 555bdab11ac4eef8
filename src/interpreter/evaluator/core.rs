use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{Block, Expr, Stmt},
    error::{Error, RuntimeError},
    interpreter::{
        environment::{EnvRef, Environment, GlobalStore, GlobalStoreRef},
        parser::parse_source,
        registry::Registry,
        value::{complex::Complex, core::Value, dims::Dims},
    },
    util::num::{f64_to_usize, usize_to_f64},
};

/// Result type used by expression evaluation.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
///
/// `break`, `continue`, and `return` travel up the execution stack as
/// ordinary values of this sum type — never as errors — so `try`/`catch`
/// cannot intercept them. The innermost loop consumes `Break`/`Continue`;
/// the innermost function call consumes `Return`.
#[derive(Debug)]
pub enum Flow {
    /// Normal completion with the statement's value.
    Normal(Value),
    /// A `break` looking for its loop.
    Break,
    /// A `continue` looking for its loop.
    Continue,
    /// A `return` looking for its function call.
    Return,
}

/// Result type used by statement execution.
pub type ExecResult = Result<Flow, RuntimeError>;

/// The installable text output sink.
///
/// Shared behind `Rc<RefCell<_>>` so the standard library's printing
/// functions observe a sink installed after they were registered.
pub type OutputSink = Rc<RefCell<Box<dyn FnMut(&str)>>>;

/// A user-defined function record.
///
/// Created by executing a function definition (or synthesised for an
/// anonymous function); lives until overwritten or the interpreter is
/// dropped. The body is shared immutably.
#[derive(Clone)]
pub struct UserFunction {
    /// The function name.
    pub name: String,
    /// Formal parameter names.
    pub params: Vec<String>,
    /// Declared return variable names.
    pub returns: Vec<String>,
    /// The function body.
    pub body: Rc<Block>,
    /// The closure snapshot for anonymous functions; `None` for ordinary
    /// functions, whose parent scope is the root environment.
    pub closure: Option<EnvRef>,
}

/// The default maximum user-function recursion depth.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 500;

/// The tree-walking evaluator and its state.
///
/// Owns the value of every variable (through the environment chain and
/// the global store), the operator/function registry, the user-function
/// table, the output sink, and the two runtime stacks: recursion depth
/// and the `end` indexing contexts.
pub struct Interpreter {
    pub(crate) global_store: GlobalStoreRef,
    pub(crate) global_env: EnvRef,
    pub(crate) registry: Registry,
    pub(crate) user_funcs: HashMap<String, UserFunction>,
    pub(crate) output: OutputSink,
    pub(crate) max_recursion_depth: usize,
    pub(crate) recursion_depth: usize,
    pub(crate) anon_counter: usize,
    /// Resolved dimension lengths for `end`, innermost last.
    pub(crate) index_stack: Vec<usize>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with an empty registry and the process
    /// constants bound in the root environment.
    ///
    /// The core registers no operators or library functions of its own;
    /// install the standard library (or a custom set) before evaluating
    /// anything that needs arithmetic.
    #[must_use]
    pub fn new() -> Self {
        let global_store: GlobalStoreRef = Rc::new(RefCell::new(GlobalStore::default()));
        let global_env = Environment::new_ref(None, Rc::clone(&global_store));

        {
            let mut env = global_env.borrow_mut();
            env.set("pi", Value::scalar(std::f64::consts::PI));
            env.set("eps", Value::scalar(f64::EPSILON));
            env.set("inf", Value::scalar(f64::INFINITY));
            env.set("Inf", Value::scalar(f64::INFINITY));
            env.set("nan", Value::scalar(f64::NAN));
            env.set("NaN", Value::scalar(f64::NAN));
            env.set("true", Value::logical_scalar(true));
            env.set("false", Value::logical_scalar(false));
            env.set("i", Value::complex_scalar(0.0, 1.0));
            env.set("j", Value::complex_scalar(0.0, 1.0));
        }

        Self {
            global_store,
            global_env,
            registry: Registry::new(),
            user_funcs: HashMap::new(),
            output: Rc::new(RefCell::new(Box::new(|s: &str| print!("{s}")))),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            recursion_depth: 0,
            anon_counter: 0,
            index_stack: Vec::new(),
        }
    }

    // ─── host surface ───────────────────────────────────────────────

    /// Registers a binary operator under its canonical symbol.
    pub fn register_binary_op(
        &mut self,
        symbol: &str,
        f: impl Fn(&Value, &Value) -> Result<Value, RuntimeError> + 'static,
    ) {
        self.registry.register_binary_op(symbol, f);
    }

    /// Registers a unary operator under its canonical symbol.
    pub fn register_unary_op(
        &mut self,
        symbol: &str,
        f: impl Fn(&Value) -> Result<Value, RuntimeError> + 'static,
    ) {
        self.registry.register_unary_op(symbol, f);
    }

    /// Registers a named function.
    pub fn register_function(
        &mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Vec<Value>, RuntimeError> + 'static,
    ) {
        self.registry.register_function(name, f);
    }

    /// Installs the text output sink; the default writes to standard out.
    pub fn set_output(&mut self, f: impl FnMut(&str) + 'static) {
        *self.output.borrow_mut() = Box::new(f);
    }

    /// A shared handle to the output sink, for library functions that
    /// print.
    #[must_use]
    pub fn output_sink(&self) -> OutputSink {
        Rc::clone(&self.output)
    }

    /// Sets the maximum user-function recursion depth.
    pub fn set_max_recursion_depth(&mut self, depth: usize) {
        self.max_recursion_depth = depth;
    }

    /// Binds `name` in the root environment.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.global_env.borrow_mut().set(name, value);
    }

    /// Reads `name` from the root environment.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.global_env.borrow().get(name)
    }

    /// Lexes, parses, and executes `source`, returning the value of the
    /// last statement.
    ///
    /// # Errors
    /// Returns the first lex, parse, or runtime error encountered.
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        let block = parse_source(source)?;
        let env = Rc::clone(&self.global_env);
        match self.exec_block(&block, &env)? {
            Flow::Normal(v) => Ok(v),
            Flow::Return => Ok(Value::Empty),
            Flow::Break => Err(RuntimeError::ControlOutsideLoop { keyword: "break" }.into()),
            Flow::Continue => {
                Err(RuntimeError::ControlOutsideLoop { keyword: "continue" }.into())
            }
        }
    }

    // ─── statement execution ────────────────────────────────────────

    /// Executes a block, returning the value of its last statement; a
    /// control-flow signal from any child propagates immediately.
    pub(crate) fn exec_block(&mut self, block: &Block, env: &EnvRef) -> ExecResult {
        let mut last = Value::Empty;
        for stmt in &block.stmts {
            match self.exec_stmt(stmt, env)? {
                Flow::Normal(v) => last = v,
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal(last))
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> ExecResult {
        match stmt {
            Stmt::Expr { expr, suppress, .. } => {
                let value = self.eval_expr(expr, env)?;
                if !suppress && !value.is_empty() {
                    env.borrow_mut().set("ans", value.clone());
                    self.display_value("ans", &value);
                }
                Ok(Flow::Normal(value))
            }
            Stmt::Assign { target, value, suppress, .. } => {
                self.exec_assign(target, value, *suppress, env)
            }
            Stmt::MultiAssign { targets, call, suppress, .. } => {
                self.exec_multi_assign(targets, call, *suppress, env)
            }
            Stmt::DeleteAssign { target, .. } => self.exec_delete_assign(target, env),
            Stmt::If { branches, else_body, .. } => self.exec_if(branches, else_body.as_ref(), env),
            Stmt::For { var, target, body, .. } => self.exec_for(var, target, body, env),
            Stmt::While { cond, body, .. } => self.exec_while(cond, body, env),
            Stmt::Switch { selector, cases, otherwise, .. } => {
                self.exec_switch(selector, cases, otherwise.as_ref(), env)
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Return { .. } => Ok(Flow::Return),
            Stmt::FunctionDef { name, params, returns, body, .. } => {
                self.user_funcs.insert(
                    name.clone(),
                    UserFunction {
                        name: name.clone(),
                        params: params.clone(),
                        returns: returns.clone(),
                        body: Rc::new(body.clone()),
                        closure: None,
                    },
                );
                Ok(Flow::Normal(Value::Empty))
            }
            Stmt::TryCatch { body, catch_var, handler, .. } => {
                self.exec_try_catch(body, catch_var.as_deref(), handler.as_ref(), env)
            }
            Stmt::Global { names, .. } | Stmt::Persistent { names, .. } => {
                let mut e = env.borrow_mut();
                for name in names {
                    e.declare_global(name);
                }
                Ok(Flow::Normal(Value::Empty))
            }
        }
    }

    // ─── expression evaluation ──────────────────────────────────────

    pub(crate) fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::scalar(*value)),
            Expr::ImagNumber { value, .. } => Ok(Value::complex_scalar(0.0, *value)),
            Expr::Str { value, .. } => Ok(Value::from_string(value)),
            Expr::Bool { value, .. } => Ok(Value::logical_scalar(*value)),
            Expr::Identifier { name, .. } => self.eval_identifier(name, env),
            Expr::Binary { op, left, right, .. } => self.eval_binary(*op, left, right, env),
            Expr::Unary { op, operand, .. } => {
                let value = self.eval_expr(operand, env)?;
                let f = self.registry.unary_op(op.symbol()).ok_or_else(|| {
                    RuntimeError::Unsupported {
                        details: format!("Undefined unary operator: {op}"),
                    }
                })?;
                f(&value)
            }
            Expr::Call { target, args, .. } => self.eval_call(target, args, env),
            Expr::CellIndex { target, indices, .. } => self.eval_cell_index(target, indices, env),
            Expr::FieldAccess { target, field, .. } => self.eval_field_access(target, field, env),
            Expr::Matrix { rows, .. } => self.eval_matrix_literal(rows, env),
            Expr::Cell { rows, .. } => self.eval_cell_literal(rows, env),
            // bare `:` evaluates to the colon sentinel the index resolver
            // recognises
            Expr::Colon { .. } => Ok(Value::from_string(":")),
            Expr::Range { start, step, stop, .. } => {
                self.eval_range(start, step.as_deref(), stop, env)
            }
            Expr::End { .. } => match self.index_stack.last() {
                Some(&len) => Ok(Value::scalar(usize_to_f64(len))),
                None => Err(RuntimeError::Unsupported {
                    details: "'end' used outside of indexing context".to_string(),
                }),
            },
            Expr::FuncHandle { name, .. } => Ok(Value::FuncHandle(name.clone())),
            Expr::AnonFunc { params, body, .. } => self.eval_anon_func(params, body, env),
        }
    }

    fn eval_identifier(&mut self, name: &str, env: &EnvRef) -> EvalResult<Value> {
        let bound = env.borrow().get(name);
        if let Some(value) = bound {
            return Ok(value);
        }
        if let Some(result) = self.try_core_builtin(name, &[], env)? {
            return Ok(result);
        }
        if let Some(f) = self.registry.function(name) {
            let results = f(&[])?;
            return Ok(results.into_iter().next().unwrap_or(Value::Empty));
        }
        if let Some(func) = self.user_funcs.get(name).cloned() {
            return self.call_user_function(&func, Vec::new());
        }
        Err(RuntimeError::Undefined { name: name.to_string() })
    }

    fn eval_binary(
        &mut self,
        op: crate::ast::BinaryOperator,
        left: &Expr,
        right: &Expr,
        env: &EnvRef,
    ) -> EvalResult<Value> {
        use crate::ast::BinaryOperator::{AndAnd, OrOr};

        // Short-circuit forms never reach the registry.
        if op == AndAnd {
            if !self.eval_expr(left, env)?.to_bool()? {
                return Ok(Value::logical_scalar(false));
            }
            let r = self.eval_expr(right, env)?.to_bool()?;
            return Ok(Value::logical_scalar(r));
        }
        if op == OrOr {
            if self.eval_expr(left, env)?.to_bool()? {
                return Ok(Value::logical_scalar(true));
            }
            let r = self.eval_expr(right, env)?.to_bool()?;
            return Ok(Value::logical_scalar(r));
        }

        let l = self.eval_expr(left, env)?;
        let r = self.eval_expr(right, env)?;
        let f = self.registry.binary_op(op.symbol()).ok_or_else(|| {
            RuntimeError::Unsupported {
                details: format!("Undefined binary operator: {op}"),
            }
        })?;
        f(&l, &r)
    }

    // ─── colon ranges ───────────────────────────────────────────────

    /// Element count of `start:step:stop` with MATLAB's endpoint
    /// tolerance of half a step.
    pub(crate) fn colon_count(start: f64, step: f64, stop: f64) -> EvalResult<usize> {
        if step == 0.0 {
            return Err(RuntimeError::ZeroColonStep);
        }
        if (step > 0.0 && stop < start) || (step < 0.0 && stop > start) {
            return Ok(0);
        }
        let mut n = ((stop - start) / step + 0.5).floor() + 1.0;
        if n < 0.0 {
            return Ok(0);
        }
        let last = step.mul_add(n - 1.0, start);
        if step > 0.0 && last > 0.5f64.mul_add(step.abs(), stop) {
            n -= 1.0;
        }
        if step < 0.0 && last < (-0.5f64).mul_add(step.abs(), stop) {
            n -= 1.0;
        }
        Ok(f64_to_usize(n.max(0.0)))
    }

    fn eval_range(
        &mut self,
        start: &Expr,
        step: Option<&Expr>,
        stop: &Expr,
        env: &EnvRef,
    ) -> EvalResult<Value> {
        let s = self.eval_expr(start, env)?.to_scalar()?;
        let st = match step {
            Some(e) => self.eval_expr(e, env)?.to_scalar()?,
            None => 1.0,
        };
        let e = self.eval_expr(stop, env)?.to_scalar()?;

        let count = Self::colon_count(s, st, e)?;
        let mut data = Vec::with_capacity(count);
        for k in 0..count {
            data.push(st.mul_add(usize_to_f64(k), s));
        }
        // keep the final element from overshooting the endpoint
        if count >= 2 {
            let last = data[count - 1];
            if (st > 0.0 && last > e) || (st < 0.0 && last < e) {
                data[count - 1] = e;
            }
        }
        Ok(Value::row_vector(data))
    }

    // ─── matrix and cell literals ───────────────────────────────────

    /// Assembles a matrix literal.
    ///
    /// Empty elements vanish, as does a row of nothing but empties. A
    /// literal whose surviving elements are all char concatenates rows
    /// of text (padding short rows with spaces); otherwise elements are
    /// widened to double — or to complex if any element is complex — and
    /// laid out block by block, with every row of blocks required to
    /// reach the same total width and matching heights.
    fn eval_matrix_literal(&mut self, rows: &[Vec<Expr>], env: &EnvRef) -> EvalResult<Value> {
        let mut mat_rows: Vec<(Vec<LitElem>, usize, usize)> = Vec::new();
        let mut all_char = true;
        let mut any_char = false;
        let mut any_complex = false;

        for row in rows {
            let mut elems = Vec::new();
            let mut total_cols = 0;
            let mut height = 1;
            for expr in row {
                let value = self.eval_expr(expr, env)?;
                if value.is_empty() {
                    continue;
                }
                let d = value.dims();
                let (er, ec) = match &value {
                    Value::Char(_) => {
                        any_char = true;
                        (d.rows.max(1), d.cols)
                    }
                    Value::Double(_) | Value::Logical(_) => {
                        all_char = false;
                        (d.rows, d.cols)
                    }
                    Value::Complex(_) => {
                        all_char = false;
                        any_complex = true;
                        (d.rows, d.cols)
                    }
                    other => {
                        return Err(RuntimeError::TypeMismatch {
                            details: format!(
                                "Cannot concatenate {} values in a matrix literal",
                                other.kind_name()
                            ),
                        });
                    }
                };
                total_cols += ec;
                height = height.max(er);
                elems.push(LitElem { value, rows: er, cols: ec });
            }
            if !elems.is_empty() {
                mat_rows.push((elems, total_cols, height));
            }
        }

        if mat_rows.is_empty() {
            return Ok(Value::Empty);
        }

        if all_char && any_char {
            return Self::assemble_char_rows(&mat_rows);
        }

        let total_cols = mat_rows[0].1;
        let mut total_rows = 0;
        for (elems, cols, height) in &mat_rows {
            if *cols != total_cols {
                return Err(RuntimeError::DimensionMismatch {
                    details: "Dimensions of arrays being concatenated are not consistent"
                        .to_string(),
                });
            }
            for e in elems {
                if e.rows != *height {
                    return Err(RuntimeError::DimensionMismatch {
                        details: "Dimensions of arrays being concatenated are not consistent"
                            .to_string(),
                    });
                }
            }
            total_rows += height;
        }

        if any_complex {
            let mut data = vec![Complex::default(); total_rows * total_cols];
            let mut row_off = 0;
            for (elems, _, height) in &mat_rows {
                let mut col_off = 0;
                for e in elems {
                    for c in 0..e.cols {
                        for r in 0..e.rows {
                            data[(col_off + c) * total_rows + row_off + r] =
                                complex_elem(&e.value, r, c);
                        }
                    }
                    col_off += e.cols;
                }
                row_off += height;
            }
            return Ok(Value::Complex(crate::interpreter::value::core::NumArray::from_vec(
                Dims::new(total_rows, total_cols),
                data,
            )));
        }

        let mut data = vec![0.0f64; total_rows * total_cols];
        let mut row_off = 0;
        for (elems, _, height) in &mat_rows {
            let mut col_off = 0;
            for e in elems {
                for c in 0..e.cols {
                    for r in 0..e.rows {
                        data[(col_off + c) * total_rows + row_off + r] = real_elem(&e.value, r, c);
                    }
                }
                col_off += e.cols;
            }
            row_off += height;
        }
        Ok(Value::matrix(total_rows, total_cols, data))
    }

    /// Assembles an all-char literal: one row concatenates into a string,
    /// several rows into a char matrix padded with spaces.
    fn assemble_char_rows(mat_rows: &[(Vec<LitElem>, usize, usize)]) -> EvalResult<Value> {
        if mat_rows.len() == 1 {
            let mut text = Vec::new();
            for e in &mat_rows[0].0 {
                text.extend_from_slice(e.char_bytes());
            }
            let n = text.len();
            return Ok(Value::Char(crate::interpreter::value::core::NumArray::from_vec(
                Dims::new(1, n),
                text,
            )));
        }

        let max_cols = mat_rows.iter().map(|(_, c, _)| *c).max().unwrap_or(0);
        let total_rows = mat_rows.len();
        let mut data = vec![b' '; total_rows * max_cols];
        for (row, (elems, ..)) in mat_rows.iter().enumerate() {
            let mut col = 0;
            for e in elems {
                for (k, &byte) in e.char_bytes().iter().enumerate() {
                    data[(col + k) * total_rows + row] = byte;
                }
                col += e.char_bytes().len();
            }
        }
        Ok(Value::Char(crate::interpreter::value::core::NumArray::from_vec(
            Dims::new(total_rows, max_cols),
            data,
        )))
    }

    /// Assembles a cell literal; every row must have the same width.
    fn eval_cell_literal(&mut self, rows: &[Vec<Expr>], env: &EnvRef) -> EvalResult<Value> {
        if rows.is_empty() {
            return Ok(Value::Cell(crate::interpreter::value::core::CellArray::new(0, 0)));
        }

        let num_rows = rows.len();
        let num_cols = rows[0].len();
        for row in rows {
            if row.len() != num_cols {
                return Err(RuntimeError::DimensionMismatch {
                    details: "Dimensions of cell arrays being concatenated are not consistent"
                        .to_string(),
                });
            }
        }

        let mut cell = crate::interpreter::value::core::CellArray::new(num_rows, num_cols);
        let dims = cell.dims();
        for (r, row) in rows.iter().enumerate() {
            for (c, expr) in row.iter().enumerate() {
                let value = self.eval_expr(expr, env)?;
                cell.data_mut()[dims.sub2ind(r, c)] = value;
            }
        }
        Ok(Value::Cell(cell))
    }
}

/// One evaluated element of a matrix-literal row.
struct LitElem {
    value: Value,
    rows: usize,
    cols: usize,
}

impl LitElem {
    fn char_bytes(&self) -> &[u8] {
        match &self.value {
            Value::Char(a) => a.data(),
            _ => &[],
        }
    }
}

/// Element access helpers for literal assembly.
fn real_elem(value: &Value, r: usize, c: usize) -> f64 {
    let i = value.dims().sub2ind(r, c);
    match value {
        Value::Double(a) => a.data()[i],
        Value::Logical(a) | Value::Char(a) => f64::from(a.data()[i]),
        _ => 0.0,
    }
}

fn complex_elem(value: &Value, r: usize, c: usize) -> Complex {
    let i = value.dims().sub2ind(r, c);
    match value {
        Value::Complex(a) => a.data()[i],
        _ => Complex::from(real_elem(value, r, c)),
    }
}
