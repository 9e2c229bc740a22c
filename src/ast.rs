//! AST node definitions for the **Lumen** language.
//!
//! Expressions and statements are closed sum types so the resolver and the
//! interpreter can match exhaustively; there is no visitor indirection.
//! Nodes are plain owned records: tokens are copied out of the scanner's
//! stream at parse time so the tree (and any closure holding part of it at
//! runtime) is self‑contained.
//!
//! Every expression that names a binding (`Variable`, `Assign`, `This`,
//! `Super`) carries an [`ExprId`] assigned by the parser. Two syntactically
//! identical references at different source positions get distinct ids, so
//! the resolver can record an independent binding distance for each.

use crate::token::Token;

/// Stable per‑node identity for resolvable expressions, assigned by the
/// parser in creation order. Used as the key of the resolver's output map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree; the
/// parser copies (or converts) the value at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// Whether an `ArrayAccessor` node reads or writes the indexed slot.
/// Decided at parse time by the presence of a trailing `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOp {
    Get,
    Set,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*
/// in Lumen.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        /// Operand to which the operator is applied.
        right: Box<Expr>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        /// Operator token such as `+`, `*`, `%`, `==`, …
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Variable access ‑ resolves to the identifier's current value at runtime.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑ or method‑call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        /// Expression that evaluates to a callable (variable, property, etc.).
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        /// Argument list (may be empty).
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The 'this' keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method` inside a subclass method.
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    /// Array literal: `[e1, e2, …]`.
    Array(Vec<Expr>),

    /// Indexed read `a[i]` or write `a[i] = v`, distinguished by `op`.
    ArrayAccessor {
        array: Box<Expr>,
        /// The `[` token ‑ retained for error reporting.
        square: Token,
        index: Box<Expr>,
        /// Present only when `op` is [`AccessOp::Set`].
        value: Option<Box<Expr>>,
        op: AccessOp,
    },

    /// Interpolated string: concatenation of literal and expression parts,
    /// evaluated left to right.
    StringGroup(Vec<Expr>),
}

/// **Abstract‑Syntax‑Tree node** for *statements* (complete executable
/// constructs). A program is a sequence of these nodes returned by
/// [`crate::parser::Parser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `elif` / `else` conditional. Each elif clause pairs a
    /// condition with its branch, tested in order after the `if` condition.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        elif_branches: Vec<(Expr, Stmt)>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop. `for` loops are desugared into this at parse time.
    While { condition: Expr, body: Box<Stmt> },

    /// `break` out of the nearest enclosing loop.
    Break(Token),

    /// Function declaration ‑ becomes a first‑class callable value.
    Function {
        name: Token,

        /// Parameter name tokens (arity ≤ 255).
        params: Vec<Token>,

        /// Body executed when the function is called.
        body: Vec<Stmt>,
    },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for runtime error locations).
        keyword: Token,

        /// Optional expression to return.
        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Class declaration with an optional superclass and a method list.
    /// Every element of `methods` is a `Stmt::Function`.
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Stmt>,
    },
}
