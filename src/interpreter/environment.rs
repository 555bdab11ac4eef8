use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::interpreter::value::core::Value;

/// A shared, mutable reference to an environment.
///
/// Scope chains and closure snapshots share environments freely, so the
/// interpreter passes them around as `Rc<RefCell<_>>`.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A shared, mutable reference to the process-wide global store.
pub type GlobalStoreRef = Rc<RefCell<GlobalStore>>;

/// The process-wide store behind `global` (and `persistent`) declarations.
///
/// The store outlives every local scope; a name declared `global` in a
/// scope reads and writes here instead of the scope's own bindings.
#[derive(Debug, Default)]
pub struct GlobalStore {
    vars: HashMap<String, Value>,
}

impl GlobalStore {
    /// Binds `name` to `value`.
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// The value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Removes the binding for `name`.
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

/// A lexical scope: local bindings, the names declared global here, and a
/// link to the parent scope.
///
/// Read order: a name declared global resolves in the global store; then
/// the local bindings; then the parent chain. Write order: the global
/// store for declared names, otherwise locally.
#[derive(Debug)]
pub struct Environment {
    vars: HashMap<String, Value>,
    globals: HashSet<String>,
    parent: Option<EnvRef>,
    global_store: GlobalStoreRef,
}

impl Environment {
    /// Creates an environment with the given parent and global store.
    #[must_use]
    pub fn new(parent: Option<EnvRef>, global_store: GlobalStoreRef) -> Self {
        Self { vars: HashMap::new(), globals: HashSet::new(), parent, global_store }
    }

    /// Wraps a new environment in an [`EnvRef`].
    #[must_use]
    pub fn new_ref(parent: Option<EnvRef>, global_store: GlobalStoreRef) -> EnvRef {
        Rc::new(RefCell::new(Self::new(parent, global_store)))
    }

    /// Binds `name`, writing to the global store when it is declared
    /// global in this scope and locally otherwise.
    pub fn set(&mut self, name: &str, value: Value) {
        if self.globals.contains(name) {
            self.global_store.borrow_mut().set(name, value);
        } else {
            self.vars.insert(name.to_string(), value);
        }
    }

    /// Binds `name` locally, ignoring any global declaration.
    pub fn set_local(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Resolves `name` following the read order; clones the value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if self.globals.contains(name) {
            return self.global_store.borrow().get(name);
        }
        if let Some(v) = self.vars.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// The local binding for `name`, ignoring globals and parents.
    #[must_use]
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    /// Whether `name` resolves anywhere along the read order.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        if self.globals.contains(name) {
            return self.global_store.borrow().contains(name);
        }
        if self.vars.contains_key(name) {
            return true;
        }
        self.parent.as_ref().is_some_and(|p| p.borrow().has(name))
    }

    /// Declares `name` global in this scope and seeds an empty entry in
    /// the store when absent.
    pub fn declare_global(&mut self, name: &str) {
        self.globals.insert(name.to_string());
        let mut store = self.global_store.borrow_mut();
        if !store.contains(name) {
            store.set(name, Value::Empty);
        }
    }

    /// Whether `name` is declared global in this scope.
    #[must_use]
    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// Removes `name` from the local bindings and global declarations.
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
        self.globals.remove(name);
    }

    /// The locally bound names, unsorted.
    #[must_use]
    pub fn local_names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    /// The global store this scope reads through.
    #[must_use]
    pub fn global_store(&self) -> GlobalStoreRef {
        Rc::clone(&self.global_store)
    }

    fn parent(&self) -> Option<EnvRef> {
        self.parent.clone()
    }
}

/// Takes the binding for `name` out of whichever scope holds it, so the
/// caller can mutate it in place and [`give_back`] it to the same spot.
///
/// The temporary removal keeps the buffer's reference count at one during
/// an indexed write, which lets copy-on-write mutate in place instead of
/// detaching on every write.
#[must_use]
pub fn take(env: &EnvRef, name: &str) -> Option<(Value, Slot)> {
    let mut e = env.borrow_mut();
    if e.globals.contains(name) {
        let store = e.global_store();
        drop(e);
        let value = store.borrow().get(name)?;
        store.borrow_mut().remove(name);
        return Some((value, Slot::Global(store, name.to_string())));
    }
    if let Some(value) = e.vars.remove(name) {
        drop(e);
        return Some((value, Slot::Local(Rc::clone(env), name.to_string())));
    }
    let parent = e.parent()?;
    drop(e);
    take(&parent, name)
}

/// Restores a binding taken with [`take`].
pub fn give_back(slot: Slot, value: Value) {
    match slot {
        Slot::Local(env, name) => {
            env.borrow_mut().vars.insert(name, value);
        }
        Slot::Global(store, name) => {
            store.borrow_mut().set(&name, value);
        }
    }
}

/// Where a binding taken with [`take`] came from.
pub enum Slot {
    /// A local binding of the given environment.
    Local(EnvRef, String),
    /// An entry of the global store.
    Global(GlobalStoreRef, String),
}

/// Creates a deep snapshot of `env` and its parent chain.
///
/// Every scope up to, but not including, the root is value-copied; the
/// copy's chain ends at `new_parent` (the root environment), so top-level
/// bindings created later and `global` variables stay visible through the
/// live root while everything captured is frozen at this moment.
#[must_use]
pub fn snapshot(env: &EnvRef, new_parent: &EnvRef) -> EnvRef {
    let e = env.borrow();
    let snapped_parent = match &e.parent {
        Some(p) if p.borrow().parent.is_some() => snapshot(p, new_parent),
        _ => Rc::clone(new_parent),
    };
    Rc::new(RefCell::new(Environment {
        vars: e.vars.clone(),
        globals: e.globals.clone(),
        parent: Some(snapped_parent),
        global_store: e.global_store(),
    }))
}
