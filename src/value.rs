//! Runtime value types for Aurora
//!
//! Values are plain data: cloning one yields an independent copy. Operators
//! are defined per pair of value kinds; any other pairing is an illegal
//! operation.

use std::fmt;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr};
use crate::environment::Context;
use crate::error::ErrorKind;
use crate::token::Span;

/// Longest string, in bytes, that repetition may produce
pub const MAX_STRING_LEN: usize = 1 << 24;

/// Result of applying an operator. The interpreter attaches span and context.
pub type OpResult = std::result::Result<Value, ErrorKind>;

/// A number that remembers whether it is integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    fn truncate(self) -> Number {
        match self {
            Number::Int(_) => self,
            Number::Float(f) => Number::Int(f as i64),
        }
    }

    /// Integer arithmetic while it fits, float arithmetic otherwise
    fn arith(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        if let (Number::Int(a), Number::Int(b)) = (self, other) {
            if let Some(n) = int_op(a, b) {
                return Number::Int(n);
            }
        }
        Number::Float(float_op(self.as_f64(), other.as_f64()))
    }

    pub fn add(self, other: Number) -> Number {
        self.arith(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.arith(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.arith(other, i64::checked_mul, |a, b| a * b)
    }

    /// True division; always a float. Callers check for a zero divisor.
    pub fn div(self, other: Number) -> Number {
        Number::Float(self.as_f64() / other.as_f64())
    }

    pub fn pow(self, other: Number) -> Number {
        self.arith(
            other,
            |a, b| u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
            f64::powf,
        )
    }

    fn compare(self, other: Number) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) if x.is_nan() => write!(f, "nan"),
            Number::Float(x) if !x.is_finite() || x == 0.0 => write!(f, "{:?}", x),
            Number::Float(x) if (1e-4..1e16).contains(&x.abs()) => write!(f, "{:?}", x),
            Number::Float(x) => {
                // Scientific form with a signed, two-digit exponent: 1e+300, 2.5e-07
                let sci = format!("{:e}", x);
                let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{}e{}{:02}", mantissa, sign, exp.abs())
            }
        }
    }
}

fn flag(b: bool) -> Number {
    Number::Int(i64::from(b))
}

/// A user-defined function together with the context it was defined in
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Expr>,
    pub closure: Rc<Context>,
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.display_name())
    }
}

/// The kinds of runtime value
#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(Number),
    String(String),
    Function(Rc<Function>),
}

/// A runtime value stamped with the source span that produced it
#[derive(Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub span: Span,
}

impl Value {
    pub fn new(kind: ValueKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn number(n: Number, span: Span) -> Self {
        Self::new(ValueKind::Number(n), span)
    }

    pub fn string(s: impl Into<String>, span: Span) -> Self {
        Self::new(ValueKind::String(s.into()), span)
    }

    pub fn function(f: Function, span: Span) -> Self {
        Self::new(ValueKind::Function(Rc::new(f)), span)
    }

    /// Re-stamp this value with a new span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn as_number(&self) -> Option<Number> {
        match self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match &self.kind {
            ValueKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Truthiness for `if` and `while`. Both 0 (`false`) and -1 (`null`) are
    /// false for numbers.
    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(n) => {
                let x = n.as_f64();
                x != 0.0 && x != -1.0
            }
            ValueKind::String(s) => !s.is_empty(),
            ValueKind::Function(_) => false,
        }
    }

    /// Apply a binary operator with `self` on the left
    pub fn binary_op(&self, op: BinaryOp, other: &Value) -> OpResult {
        match op {
            BinaryOp::Add => self.added_to(other),
            BinaryOp::Sub => self.numeric(other, Number::sub),
            BinaryOp::Mul => self.multiplied_by(other),
            BinaryOp::Div => self.divided_by(other),
            BinaryOp::Pow => self.numeric(other, Number::pow),
            BinaryOp::Eq => self.compared(other, |o| o.is_eq()),
            BinaryOp::Ne => self.compared(other, |o| o.is_ne()),
            BinaryOp::Lt => self.compared(other, |o| o.is_lt()),
            BinaryOp::Gt => self.compared(other, |o| o.is_gt()),
            BinaryOp::Le => self.compared(other, |o| o.is_le()),
            BinaryOp::Ge => self.compared(other, |o| o.is_ge()),
            BinaryOp::And => {
                self.numeric(other, |a, b| (if a.is_zero() { a } else { b }).truncate())
            }
            BinaryOp::Or => {
                self.numeric(other, |a, b| (if a.is_zero() { b } else { a }).truncate())
            }
        }
    }

    /// Arithmetic negation; numbers only
    pub fn negate(&self) -> OpResult {
        match self.kind {
            ValueKind::Number(n) => Ok(Value::number(n.mul(Number::Int(-1)), self.span.clone())),
            _ => Err(ErrorKind::IllegalOperation),
        }
    }

    /// Logical negation: 1 for a zero number, 0 otherwise
    pub fn not(&self) -> OpResult {
        match self.kind {
            ValueKind::Number(n) => Ok(Value::number(flag(n.is_zero()), self.span.clone())),
            _ => Err(ErrorKind::IllegalOperation),
        }
    }

    fn result(&self, other: &Value, kind: ValueKind) -> OpResult {
        Ok(Value::new(kind, self.span.to(&other.span)))
    }

    fn numeric(&self, other: &Value, op: impl Fn(Number, Number) -> Number) -> OpResult {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                self.result(other, ValueKind::Number(op(*a, *b)))
            }
            _ => Err(ErrorKind::IllegalOperation),
        }
    }

    fn compared(&self, other: &Value, test: fn(std::cmp::Ordering) -> bool) -> OpResult {
        self.numeric(other, |a, b| flag(a.compare(b).is_some_and(test)))
    }

    fn added_to(&self, other: &Value) -> OpResult {
        match (&self.kind, &other.kind) {
            (ValueKind::String(a), ValueKind::String(b)) => {
                self.result(other, ValueKind::String(format!("{}{}", a, b)))
            }
            _ => self.numeric(other, Number::add),
        }
    }

    fn multiplied_by(&self, other: &Value) -> OpResult {
        match (&self.kind, &other.kind) {
            (ValueKind::String(s), ValueKind::Number(Number::Int(n))) => {
                let times = usize::try_from(*n).unwrap_or(0);
                match s.len().checked_mul(times) {
                    Some(len) if len <= MAX_STRING_LEN => {
                        self.result(other, ValueKind::String(s.repeat(times)))
                    }
                    _ => Err(ErrorKind::IllegalOperation),
                }
            }
            _ => self.numeric(other, Number::mul),
        }
    }

    fn divided_by(&self, other: &Value) -> OpResult {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(_), ValueKind::Number(b)) if b.is_zero() => {
                Err(ErrorKind::DivisionByZero)
            }
            _ => self.numeric(other, Number::div),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(n) => write!(f, "{}", n),
            ValueKind::String(s) => write!(f, "\"{}\"", s),
            ValueKind::Function(func) => write!(f, "<function {}>", func.display_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => a.compare(*b).is_some_and(|o| o.is_eq()),
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Function(a), ValueKind::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
