//! Abstract Syntax Tree definitions for Aurora
//!
//! Everything in Aurora is an expression. Nodes are built once by the parser
//! and only read afterwards, so function bodies are shared behind `Rc`.

use std::fmt;
use std::rc::Rc;

use crate::token::Span;
use crate::value::Number;

/// One `condition then body` arm of an `if`
#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Expr,
    pub body: Expr,
}

/// Expression nodes
#[derive(Debug, Clone)]
pub enum Expr {
    /// Number literal: 42, 3.14
    Number { value: Number, span: Span },

    /// String literal: "hello"
    String { value: String, span: Span },

    /// Variable reference: foo
    VarAccess { name: String, span: Span },

    /// Assignment: set x = expr
    VarAssign {
        name: String,
        value: Box<Expr>,
        span: Span,
    },

    /// Binary operation: a + b, x and y
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },

    /// Unary operation: -x, not y
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// if c then a eli d then b else e
    If {
        cases: Vec<IfCase>,
        else_case: Option<Box<Expr>>,
        span: Span,
    },

    /// for i = start to end step s then body
    For {
        var: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
        span: Span,
    },

    /// while cond then body
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },

    /// fun name(a, b) -> body, name optional
    FunctionDef {
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Expr>,
        span: Span,
    },

    /// Function call: foo(a, b)
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::String { span, .. } => span,
            Expr::VarAccess { span, .. } => span,
            Expr::VarAssign { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::If { span, .. } => span,
            Expr::For { span, .. } => span,
            Expr::While { span, .. } => span,
            Expr::FunctionDef { span, .. } => span,
            Expr::Call { span, .. } => span,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Pow, // ^
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Gt,  // >
    Le,  // <=
    Ge,  // >=
    And, // and
    Or,  // or
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        f.write_str(symbol)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Not, // not
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Not => f.write_str("not"),
        }
    }
}

/// Compact, parenthesised rendering used in debug logs and parser tests
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{}", value),
            Expr::String { value, .. } => write!(f, "{:?}", value),
            Expr::VarAccess { name, .. } => write!(f, "{}", name),
            Expr::VarAssign { name, value, .. } => write!(f, "(set {} {})", name, value),
            Expr::Binary { left, op, right, .. } => write!(f, "({} {} {})", left, op, right),
            Expr::Unary { op, operand, .. } => write!(f, "({} {})", op, operand),
            Expr::If { cases, else_case, .. } => {
                write!(f, "(if")?;
                for case in cases {
                    write!(f, " [{} {}]", case.condition, case.body)?;
                }
                if let Some(else_case) = else_case {
                    write!(f, " [else {}]", else_case)?;
                }
                write!(f, ")")
            }
            Expr::For { var, start, end, step, body, .. } => {
                write!(f, "(for {} {} {}", var, start, end)?;
                if let Some(step) = step {
                    write!(f, " {}", step)?;
                }
                write!(f, " {})", body)
            }
            Expr::While { condition, body, .. } => write!(f, "(while {} {})", condition, body),
            Expr::FunctionDef { name, params, body, .. } => write!(
                f,
                "(fun {}({}) {})",
                name.as_deref().unwrap_or(""),
                params.join(" "),
                body
            ),
            Expr::Call { callee, args, .. } => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
