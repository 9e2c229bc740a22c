//! Runtime object model: the callable kinds (native functions, user
//! functions, classes) and instances.
//!
//! Every callable exposes the same capability pair: an `arity` and a `call`
//! performed by the interpreter. User functions carry their captured closure
//! environment; classes act as constructors; instances hold field storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::environment::{EnvRef, Environment};
use crate::token::Token;
use crate::value::Value;

/// A host‑provided function installed into the global environment.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, String>,
}

/// A user function value: the declaration's parameters and body, plus the
/// environment frame that was active at its definition (the closure).
///
/// Binding a method to an instance produces a *new* function whose
/// environment is a fresh child of the original closure with `this` defined;
/// the original function is never mutated.
#[derive(Debug)]
pub struct Function {
    pub declaration_name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: EnvRef,
    pub is_initializer: bool,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.declaration_name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Produce a copy of this function closed over a frame where `this` is
    /// bound to `instance`.
    pub fn bind(&self, instance: Value) -> Function {
        let mut bound_env = Environment::with_enclosing(self.closure.clone());
        bound_env.define("this", instance);

        Function {
            declaration_name: self.declaration_name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: Rc::new(RefCell::new(bound_env)),
            is_initializer: self.is_initializer,
        }
    }
}

/// A class value: method table plus an optional superclass. Calling a class
/// constructs an instance and runs its `init` method if one exists.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    /// Method resolution: own table first, then the superclass chain.
    /// Single chain only, no multiple inheritance.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Constructor arity is `init`'s arity, or zero without an `init`.
    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map(|init| init.arity())
            .unwrap_or(0)
    }
}

/// An instance: a class reference plus per‑instance field storage.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property read. Fields shadow methods; a found method is bound to
    /// `this` fresh on every access, so `handle` (the `Rc` the interpreter
    /// holds) is threaded in for the binding.
    pub fn get(handle: &Rc<RefCell<Instance>>, name: &str) -> Option<Value> {
        if let Some(field) = handle.borrow().fields.get(name) {
            return Some(field.clone());
        }

        let method = handle.borrow().class.find_method(name)?;
        let bound = method.bind(Value::Instance(handle.clone()));

        Some(Value::Function(Rc::new(bound)))
    }

    /// Property write: always writes the field map, creating the field if
    /// absent. Methods are never assignable.
    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}
