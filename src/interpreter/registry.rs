use std::collections::HashMap;

use crate::{error::RuntimeError, interpreter::value::core::Value};

/// A registered binary operator implementation.
pub type BinaryOpFn = Box<dyn Fn(&Value, &Value) -> Result<Value, RuntimeError>>;
/// A registered unary operator implementation.
pub type UnaryOpFn = Box<dyn Fn(&Value) -> Result<Value, RuntimeError>>;
/// A registered named function: ordered argument values to ordered results.
pub type ExternalFn = Box<dyn Fn(&[Value]) -> Result<Vec<Value>, RuntimeError>>;

/// The three injectable dispatch maps the evaluator consults.
///
/// The registry knows nothing about value kinds; implementations dispatch
/// on kinds internally. The core registers no arithmetic of its own — the
/// standard library populates these maps at startup, and a host may add or
/// replace entries before evaluation.
#[derive(Default)]
pub struct Registry {
    binary_ops: HashMap<String, BinaryOpFn>,
    unary_ops: HashMap<String, UnaryOpFn>,
    functions: HashMap<String, ExternalFn>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binary operator under its canonical symbol.
    pub fn register_binary_op(
        &mut self,
        symbol: &str,
        f: impl Fn(&Value, &Value) -> Result<Value, RuntimeError> + 'static,
    ) {
        self.binary_ops.insert(symbol.to_string(), Box::new(f));
    }

    /// Registers a unary operator under its canonical symbol.
    pub fn register_unary_op(
        &mut self,
        symbol: &str,
        f: impl Fn(&Value) -> Result<Value, RuntimeError> + 'static,
    ) {
        self.unary_ops.insert(symbol.to_string(), Box::new(f));
    }

    /// Registers a named function.
    pub fn register_function(
        &mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Vec<Value>, RuntimeError> + 'static,
    ) {
        self.functions.insert(name.to_string(), Box::new(f));
    }

    /// The binary operator registered under `symbol`, if any.
    #[must_use]
    pub fn binary_op(&self, symbol: &str) -> Option<&BinaryOpFn> {
        self.binary_ops.get(symbol)
    }

    /// The unary operator registered under `symbol`, if any.
    #[must_use]
    pub fn unary_op(&self, symbol: &str) -> Option<&UnaryOpFn> {
        self.unary_ops.get(symbol)
    }

    /// The function registered under `name`, if any.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&ExternalFn> {
        self.functions.get(name)
    }

    /// Whether a function is registered under `name`.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}
