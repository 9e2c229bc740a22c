//! Parenthesized prefix printing of expressions, for the `parse` subcommand
//! and for parser tests asserting precedence/associativity.

use crate::ast::{AccessOp, Expr, LiteralValue};

pub struct Ast;

impl Ast {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
                LiteralValue::Str(s) => s.clone(),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Grouping(inner) => format!("(group {})", self.print(inner)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));

                for arg in arguments {
                    out.push(' ');
                    out.push_str(&self.print(arg));
                }

                out.push(')');
                out
            }

            Expr::Get { object, name } => {
                format!("(get {} {})", self.print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(set {} {} {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            Expr::Array(elements) => {
                let mut out = String::from("(array");

                for element in elements {
                    out.push(' ');
                    out.push_str(&self.print(element));
                }

                out.push(')');
                out
            }

            Expr::ArrayAccessor {
                array,
                index,
                value,
                op,
                ..
            } => match (op, value) {
                (AccessOp::Set, Some(value)) => format!(
                    "(index-set {} {} {})",
                    self.print(array),
                    self.print(index),
                    self.print(value)
                ),
                _ => format!("(index {} {})", self.print(array), self.print(index)),
            },

            Expr::StringGroup(parts) => {
                let mut out = String::from("(interp");

                for part in parts {
                    out.push(' ');
                    out.push_str(&self.print(part));
                }

                out.push(')');
                out
            }
        }
    }
}
