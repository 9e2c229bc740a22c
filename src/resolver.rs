//! Static resolver pass for the **Lumen** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String, bool>` tracking
//!    declared/defined).
//! 2. Report static errors (redeclaration, forward‑read in initializer,
//!    invalid `return` / `break` / `this` / `super`, returning a value from
//!    an initializer).
//! 3. Record, for *each* variable occurrence, whether it is a local (and at
//!    what depth) or a global.
//!
//! The output is an explicit [`Locals`] artifact: a map from the parser's
//! per‑node [`ExprId`] to a binding distance. References absent from the map
//! are globals; the interpreter falls back to the global environment for
//! them. The distance recorded for a reference equals the number of
//! environment parent hops between the frame active when the reference
//! executes and the frame defining the name. That equality holds because the
//! interpreter creates environments in exact 1:1 correspondence with the
//! block/function nesting walked here.

use crate::ast::{Expr, ExprId, Stmt};
use crate::error::{LumenError, Result};
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Binding distances, keyed by resolvable‑expression identity.
pub type Locals = HashMap<ExprId, usize>;

/// What kind of function body are we inside? Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Are we inside a class body? Used to validate `this` / `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances into a [`Locals`] map returned to the caller.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    locals: Locals,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        info!("Resolver instantiated");

        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    /// Walk all top‑level statements and return the binding‑distance map.
    /// Any static error is fatal: no execution may happen afterwards.
    ///
    /// Top‑level code runs in a scope of its own, mirroring the global
    /// environment frame. This makes `var a = a;` a static error at the top
    /// level too, not only inside blocks. Names declared in *no* scope
    /// (native functions, forward references resolved at runtime) stay
    /// absent from the map and fall back to the global environment.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<Locals> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.begin_scope();
        let result = self.resolve_all(statements);
        self.end_scope();

        result?;

        Ok(self.locals)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        debug!("Resolving stmt: {:?}", stmt);

        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();

                let result = self.resolve_all(statements);

                // The scope must be popped on the error path too, or every
                // remaining resolution would see a stale frame.
                self.end_scope();

                result?;
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define, so that reading the
                // name inside its own initializer is caught as "declared but
                // not yet defined".
                self.declare(name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.define(name);
            }

            Stmt::Function { name, params, body } => {
                // the function name is visible *inside* its own body,
                // enabling recursion
                self.declare(name)?;
                self.define(name);
                self.resolve_function(params, body, FunctionType::Function)?;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                elif_branches,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;

                for (elif_condition, elif_branch) in elif_branches {
                    self.resolve_expr(elif_condition)?;
                    self.resolve_stmt(elif_branch)?;
                }

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;

                self.loop_depth += 1;
                let result = self.resolve_stmt(body);
                self.loop_depth -= 1;

                result?;
            }

            Stmt::Break(keyword) => {
                if self.loop_depth == 0 {
                    return Err(LumenError::resolve(
                        keyword,
                        "Cannot use 'break' outside of a loop",
                    ));
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LumenError::resolve(
                        keyword,
                        "Cannot return from top-level code",
                    ));
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(LumenError::resolve(
                            keyword,
                            "Cannot return a value from an initializer",
                        ));
                    }

                    self.resolve_expr(expr)?;
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.declare(name)?;
                self.define(name);

                if let Some(superclass_expr) = superclass {
                    if let Expr::Variable {
                        name: super_name, ..
                    } = superclass_expr
                    {
                        if super_name.lexeme == name.lexeme {
                            self.current_class = enclosing_class;

                            return Err(LumenError::resolve(
                                super_name,
                                "A class cannot inherit from itself",
                            ));
                        }
                    }

                    let result = self.resolve_class_body(superclass_expr, methods);
                    self.current_class = enclosing_class;

                    return result;
                }

                let result = self.resolve_methods(methods);
                self.current_class = enclosing_class;

                result?;
            }
        }

        Ok(())
    }

    /// Superclass variant of class resolution: resolve the superclass
    /// reference, then wrap the method scopes in an extra frame binding
    /// `super` — mirroring the extra environment the interpreter creates.
    fn resolve_class_body(&mut self, superclass: &Expr, methods: &[Stmt]) -> Result<()> {
        self.resolve_expr(superclass)?;

        self.begin_scope();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert("super".to_string(), true);
        }

        let result = self.resolve_methods(methods);

        self.end_scope();
        result
    }

    /// Resolve every method inside a scope binding `this`. The initializer
    /// (named `init`) gets its own function kind so `return value;` inside it
    /// can be rejected.
    fn resolve_methods(&mut self, methods: &[Stmt]) -> Result<()> {
        self.begin_scope();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert("this".to_string(), true);
        }

        let mut result = Ok(());

        for method in methods {
            if let Stmt::Function { name, params, body } = method {
                let kind = if name.lexeme == "init" {
                    FunctionType::Initializer
                } else {
                    FunctionType::Method
                };

                result = self.resolve_function(params, body, kind);
                if result.is_err() {
                    break;
                }
            }
        }

        self.end_scope();
        result
    }

    fn resolve_all(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        debug!("Resolving expr: {:?}", expr);

        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Variable { id, name } => {
                // Cannot read a variable in its own initializer
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        return Err(LumenError::resolve(
                            name,
                            "Cannot read local variable in its own initializer",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value)?;
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object)?,

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)?;
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    return Err(LumenError::resolve(
                        keyword,
                        "Cannot use 'this' outside of a class",
                    ));
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                if self.current_class == ClassType::None {
                    return Err(LumenError::resolve(
                        keyword,
                        "Cannot use 'super' outside of a class",
                    ));
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Array(elements) => {
                for element in elements {
                    self.resolve_expr(element)?;
                }
            }

            Expr::ArrayAccessor {
                array,
                index,
                value,
                ..
            } => {
                self.resolve_expr(array)?;
                self.resolve_expr(index)?;

                if let Some(value) = value {
                    self.resolve_expr(value)?;
                }
            }

            Expr::StringGroup(parts) => {
                for part in parts {
                    self.resolve_expr(part)?;
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body. `break` does
    /// not cross function boundaries, so the loop depth is suspended for the
    /// duration of the body.
    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], kind: FunctionType) -> Result<()> {
        let enclosing = self.current_function;
        let enclosing_loop_depth = self.loop_depth;
        self.current_function = kind;
        self.loop_depth = 0;

        self.begin_scope();

        let mut result = Ok(());

        for param in params {
            result = self.declare(param);
            if result.is_err() {
                break;
            }
            self.define(param);
        }

        if result.is_ok() {
            result = self.resolve_all(body);
        }

        self.end_scope();

        self.current_function = enclosing;
        self.loop_depth = enclosing_loop_depth;

        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(LumenError::resolve(
                    name,
                    "Already a variable with this name in this scope",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }

        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as a local at the depth of the
    /// innermost scope containing it. Not found in any scope ⇒ global, which
    /// stays absent from the map.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
