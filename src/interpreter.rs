//! Tree‑walking evaluator for the **Lumen** language.
//!
//! Evaluation is a direct recursive walk over the AST: every expression
//! evaluator returns a [`Value`], every statement executor returns a
//! control‑flow [`Flow`] signal. `return` and `break` are *not* errors —
//! they travel as `Flow::Return` / `Flow::Break` through every intervening
//! block executor, which must propagate them untouched (after restoring its
//! environment) until the owning function call or loop intercepts them.
//! Genuine runtime errors travel separately as `Err` and unwind all the way
//! to the top‑level `interpret` loop, which stops the program.
//!
//! Variable references use the resolver's [`Locals`] map: a recorded
//! distance walks the environment chain directly via `get_at`/`assign_at`;
//! an absent entry means the global environment.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{AccessOp, Expr, ExprId, LiteralValue, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::{LumenError, Result};
use crate::object::{Class, Function, Instance, NativeFunction};
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Control‑flow signal produced by statement execution. `Return` unwinds to
/// the nearest enclosing function call, `Break` to the nearest enclosing
/// loop; neither may be swallowed anywhere else.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

/// Current wall‑clock time in seconds since the Unix epoch.
fn native_clock(_args: &[Value]) -> std::result::Result<Value, String> {
    debug!("Calling native function 'clock'");

    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

/// Print a prompt, then read one line from stdin (without the newline).
fn native_readline(args: &[Value]) -> std::result::Result<Value, String> {
    debug!("Calling native function 'readline'");

    print!("{}", args[0]);
    std::io::stdout()
        .flush()
        .map_err(|e| format!("readline error: {}", e))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("readline error: {}", e))?;

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }

    Ok(Value::Str(line))
}

/// Integer conversion of a string value.
fn native_coerce_to_i(args: &[Value]) -> std::result::Result<Value, String> {
    debug!("Calling native function 'coerce_to_i'");

    match &args[0] {
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n as f64))
            .map_err(|_| format!("Cannot coerce '{}' to an integer", s)),

        Value::Number(n) => Ok(Value::Number(n.trunc())),

        other => Err(format!("Cannot coerce {} to an integer", other.type_name())),
    }
}

#[derive(Debug)]
pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: Locals,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter and installs the native functions
    /// (`clock`, `readline`, `coerce_to_i`) into the global environment.
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        let natives: [(&str, usize, fn(&[Value]) -> std::result::Result<Value, String>); 3] = [
            ("clock", 0, native_clock),
            ("readline", 1, native_readline),
            ("coerce_to_i", 1, native_coerce_to_i),
        ];

        for (name, arity, func) in natives {
            debug!("Defining native function '{}'", name);

            globals.borrow_mut().define(
                name,
                Value::NativeFunction(Rc::new(NativeFunction {
                    name: name.to_string(),
                    arity,
                    func,
                })),
            );
        }

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Interprets a program: top‑level statements in order against the
    /// global environment, using the resolver's binding distances. The first
    /// uncaught runtime error aborts the entire remaining statement list.
    pub fn interpret(&mut self, statements: &[Stmt], locals: Locals) -> Result<()> {
        debug!(
            "Interpreting {} statements with {} resolved locals",
            statements.len(),
            locals.len()
        );

        self.locals = locals;

        for stmt in statements {
            debug!("Executing statement: {:?}", stmt);

            match self.execute(stmt)? {
                Flow::Normal => {}

                // The resolver rejects stray return/break, so a signal
                // reaching here means a corrupted pipeline.
                Flow::Return(_) | Flow::Break => {
                    return Err(LumenError::Runtime {
                        message: "Unexpected control-flow signal at top level".to_string(),
                        line: 0,
                        location: "end".to_string(),
                    });
                }
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Read a global binding. Test and tooling hook; program execution goes
    /// through the environment chain.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    // ───────────────────────── statement execution ─────────────────────────

    /// Executes a single statement, yielding a control‑flow signal.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);

                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let enclosing = self.environment.clone();
                let block_env = Rc::new(RefCell::new(Environment::with_enclosing(enclosing)));

                self.execute_block(statements, block_env)
            }

            Stmt::If {
                condition,
                then_branch,
                elif_branches,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                }

                for (elif_condition, elif_branch) in elif_branches {
                    if self.evaluate(elif_condition)?.is_truthy() {
                        return self.execute(elif_branch);
                    }
                }

                if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }

                Ok(Flow::Normal)
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Break(_) => Ok(Flow::Break),

            Stmt::Function { name, params, body } => {
                debug!("Defining function '{}'", name.lexeme);

                // The environment captured here is the closure: the frame
                // active at declaration time, not at call time.
                let function = Function {
                    declaration_name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    closure: self.environment.clone(),
                    is_initializer: false,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Execute `statements` inside `env`, restoring the previous environment
    /// on *every* exit path — normal, return, break, or error — so a nested
    /// call can never corrupt its caller's active frame.
    pub fn execute_block(&mut self, statements: &[Stmt], env: EnvRef) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, env);

        let mut flow = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    flow = other;
                    break;
                }
            }
        }

        self.environment = previous;
        flow
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Stmt],
    ) -> Result<Flow> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<Class>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    return Err(LumenError::runtime(name, "Superclass must be a class"));
                }
            },
            None => None,
        };

        // The class name is bound before the methods are built so methods
        // can refer to the class itself.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        // Methods close over the environment active at class definition.
        // With a superclass, an extra frame binding `super` is interposed;
        // the resolver's scope layout mirrors this exactly.
        let method_closure: EnvRef = match &superclass {
            Some(class) => {
                let mut super_env = Environment::with_enclosing(self.environment.clone());
                super_env.define("super", Value::Class(class.clone()));
                Rc::new(RefCell::new(super_env))
            }
            None => self.environment.clone(),
        };

        let mut method_table: HashMap<String, Rc<Function>> = HashMap::new();

        for method in methods {
            if let Stmt::Function {
                name: method_name,
                params,
                body,
            } = method
            {
                let function = Function {
                    declaration_name: method_name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    closure: method_closure.clone(),
                    is_initializer: method_name.lexeme == "init",
                };

                method_table.insert(method_name.lexeme.clone(), Rc::new(function));
            }
        }

        let class = Class {
            name: name.lexeme.clone(),
            superclass,
            methods: method_table,
        };

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)));

        Ok(Flow::Normal)
    }

    // ───────────────────────── expression evaluation ────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;

                // Short-circuit: the result is the actual operand value,
                // never a coerced boolean.
                match operator.token_type {
                    TokenType::OR if left_val.is_truthy() => Ok(left_val),
                    TokenType::AND if !left_val.is_truthy() => Ok(left_val),
                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                let assigned = match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                    ),
                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                if !assigned {
                    return Err(LumenError::runtime(
                        name,
                        format!("Undefined variable '{}'", name.lexeme),
                    ));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                debug!("Evaluating call expression");

                let callee_val = self.evaluate(callee)?;

                let mut arg_values = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                self.invoke_callable(callee_val, paren, arg_values)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => Instance::get(&instance, &name.lexeme)
                        .ok_or_else(|| {
                            LumenError::runtime(
                                name,
                                format!("Undefined property '{}'", name.lexeme),
                            )
                        }),

                    _ => Err(LumenError::runtime(name, "Only instances have properties")),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.borrow_mut().set(&name.lexeme, value.clone());
                        Ok(value)
                    }

                    _ => Err(LumenError::runtime(name, "Only instances have fields")),
                }
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }

                Ok(Value::Array(Rc::new(RefCell::new(values))))
            }

            Expr::ArrayAccessor {
                array,
                square,
                index,
                value,
                op,
            } => self.evaluate_array_accessor(array, square, index, value.as_deref(), *op),

            Expr::StringGroup(parts) => {
                let mut out = String::new();

                for part in parts {
                    let value = self.evaluate(part)?;

                    // Non-text parts are coerced to their textual form.
                    match value {
                        Value::Str(s) => out.push_str(&s),
                        other => out.push_str(&other.to_string()),
                    }
                }

                Ok(Value::Str(out))
            }
        }
    }

    /// Consult the resolver's distance for this reference; fall back to the
    /// global environment when it recorded none.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        let value = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| {
            LumenError::runtime(name, format!("Undefined variable '{}'", name.lexeme))
        })
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> Result<Value> {
        let right_val = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LumenError::runtime(op, "Operand must be a number")),
            },

            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),

            _ => Err(LumenError::runtime(op, "Invalid unary operator")),
        }
    }

    /// Evaluates a binary expression. Every arithmetic and comparison
    /// operator — including `*` and `%` — requires numeric operands; `+`
    /// additionally accepts two strings.
    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                _ => Err(LumenError::runtime(
                    op,
                    "Operands must be two numbers or two strings",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;

                if b == 0.0 {
                    return Err(LumenError::runtime(op, "Division by zero"));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::MODULO => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;

                if b == 0.0 {
                    return Err(LumenError::runtime(op, "Modulo by zero"));
                }

                Ok(Value::Number(a % b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::LESS => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::GREATER => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = self.check_number_operands(op, left_val, right_val)?;
                Ok(Value::Bool(a >= b))
            }

            _ => Err(LumenError::runtime(op, "Invalid binary operator")),
        }
    }

    fn check_number_operands(
        &self,
        op: &Token,
        left: Value,
        right: Value,
    ) -> Result<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            _ => Err(LumenError::runtime(op, "Operands must be numbers")),
        }
    }

    fn evaluate_array_accessor(
        &mut self,
        array: &Expr,
        square: &Token,
        index: &Expr,
        value: Option<&Expr>,
        op: AccessOp,
    ) -> Result<Value> {
        let array_val = self.evaluate(array)?;

        let elements: Rc<RefCell<Vec<Value>>> = match array_val {
            Value::Array(elements) => elements,
            other => {
                return Err(LumenError::runtime(
                    square,
                    format!("Cannot index a {}", other.type_name()),
                ));
            }
        };

        let index_val = self.evaluate(index)?;

        let idx: usize = match index_val {
            Value::Number(n) if n.fract() == 0.0 && n >= 0.0 => n as usize,
            _ => {
                return Err(LumenError::runtime(
                    square,
                    "Array index must be a non-negative integer",
                ));
            }
        };

        let len = elements.borrow().len();
        if idx >= len {
            return Err(LumenError::runtime(
                square,
                format!("Array index {} out of range (length {})", idx, len),
            ));
        }

        match op {
            AccessOp::Get => {
                let element = elements.borrow()[idx].clone();
                Ok(element)
            }

            AccessOp::Set => {
                // parser guarantees a value expression on writes
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                elements.borrow_mut()[idx] = value.clone();
                Ok(value)
            }
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = match self.locals.get(&id) {
            Some(&distance) => distance,
            None => {
                return Err(LumenError::runtime(
                    keyword,
                    "Cannot use 'super' in a class with no superclass",
                ));
            }
        };

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Some(Value::Class(class)) => class,
            _ => {
                return Err(LumenError::runtime(
                    keyword,
                    "Cannot use 'super' in a class with no superclass",
                ));
            }
        };

        // `this` lives in the binding frame one hop below `super`.
        let instance = distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, "this"))
            .ok_or_else(|| LumenError::runtime(keyword, "Cannot use 'super' outside of a method"))?;

        let found = superclass.find_method(&method.lexeme).ok_or_else(|| {
            LumenError::runtime(
                method,
                format!("Undefined property '{}'", method.lexeme),
            )
        })?;

        Ok(Value::Function(Rc::new(found.bind(instance))))
    }

    // ───────────────────────── callable invocation ──────────────────────────

    /// Invokes a callable: a native function, a user function, or a class
    /// acting as constructor. Anything else is a runtime error.
    fn invoke_callable(
        &mut self,
        callee: Value,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        match callee {
            Value::NativeFunction(native) => {
                debug!("Calling native function '{}'", native.name);

                self.check_arity(native.arity, arguments.len(), paren)?;

                (native.func)(&arguments).map_err(|message| LumenError::runtime(paren, message))
            }

            Value::Function(function) => {
                debug!("Calling function '{}'", function.name());

                self.check_arity(function.arity(), arguments.len(), paren)?;
                self.call_function(&function, arguments)
            }

            Value::Class(class) => {
                debug!("Constructing instance of '{}'", class.name);

                self.check_arity(class.arity(), arguments.len(), paren)?;

                let instance = Rc::new(RefCell::new(Instance::new(class.clone())));

                // Run `init` bound to the fresh instance; its own return
                // value is ignored — construction always yields the instance.
                if let Some(init) = class.find_method("init") {
                    let bound = init.bind(Value::Instance(instance.clone()));
                    self.call_function(&bound, arguments)?;
                }

                Ok(Value::Instance(instance))
            }

            other => Err(LumenError::runtime(
                paren,
                format!("Can only call functions and classes, not a {}", other.type_name()),
            )),
        }
    }

    fn check_arity(&self, expected: usize, got: usize, paren: &Token) -> Result<()> {
        if expected != got {
            return Err(LumenError::runtime(
                paren,
                format!("Expected {} arguments but got {}", expected, got),
            ));
        }

        Ok(())
    }

    /// Call a user function: bind parameters positionally into a fresh
    /// environment parented at the function's *closure* (lexical scoping,
    /// never the caller's environment) and run the body.
    fn call_function(&mut self, function: &Function, arguments: Vec<Value>) -> Result<Value> {
        let mut call_env = Environment::with_enclosing(function.closure.clone());

        for (param, arg) in function.params.iter().zip(arguments) {
            call_env.define(&param.lexeme, arg);
        }

        let flow = self.execute_block(&function.body, Rc::new(RefCell::new(call_env)))?;

        // An initializer always yields the bound instance, whatever the
        // body did.
        if function.is_initializer {
            return Environment::get_at(&function.closure, 0, "this").ok_or_else(|| {
                LumenError::runtime(&function.declaration_name, "Initializer lost its instance")
            });
        }

        match flow {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }
}
