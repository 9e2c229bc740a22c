//! Mutable binding frames with shared parent links.
//!
//! An environment may be referenced by several closures at once (closures
//! created in the same scope share the enclosing frame), so frames live in
//! `Rc<RefCell<…>>` and mutations of a binding are visible to every holder.
//!
//! Two access paths exist: `get`/`assign` walk the enclosing chain by name,
//! while `get_at`/`assign_at` hop exactly `distance` parent links and access
//! that frame directly. The direct path must only be fed distances produced
//! by the resolver for that exact reference.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a binding frame.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    pub enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root frame with no parent (the global environment).
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child frame parented at `enclosing`.
    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Introduce (or overwrite) a binding in *this* frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look a name up, walking the enclosing chain. `None` means the name is
    /// unbound everywhere; the caller turns that into an undefined‑variable
    /// runtime error carrying the offending token.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Assign to an existing binding, walking the enclosing chain.
    /// Returns `false` if no frame defines the name.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// Walk exactly `distance` parent links from `env`.
    /// Returns `None` if the chain is shorter, which indicates a resolver
    /// distance applied to the wrong reference.
    fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut frame: EnvRef = env.clone();

        for _ in 0..distance {
            let parent = frame.borrow().enclosing.clone()?;
            frame = parent;
        }

        Some(frame)
    }

    /// Read `name` from the frame exactly `distance` hops up, without
    /// searching. Only valid with a resolver‑produced distance.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        let frame = Self::ancestor(env, distance)?;
        let value = frame.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` in the frame exactly `distance` hops up, without
    /// searching. Returns `false` when the slot does not exist there.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) -> bool {
        match Self::ancestor(env, distance) {
            Some(frame) => {
                let mut frame = frame.borrow_mut();

                if frame.values.contains_key(name) {
                    frame.values.insert(name.to_string(), value);
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}
