//! Tree-walking evaluator for Aurora
//!
//! Evaluation is a single exhaustive match over the node kinds. Every runtime
//! failure becomes an `AuroraError` carrying the active context; the first
//! one aborts the whole evaluation.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{BinaryOp, Expr, IfCase, UnaryOp};
use crate::environment::{Context, SymbolTable};
use crate::error::{AuroraError, ErrorKind, Result};
use crate::token::Span;
use crate::value::{Function, Number, Value};

/// Evaluates expressions against a context
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `expr` in `ctx`. Loops and `if`s without a taken branch
    /// produce no value.
    pub fn visit(&self, expr: &Expr, ctx: &Rc<Context>) -> Result<Option<Value>> {
        match expr {
            Expr::Number { value, span } => Ok(Some(Value::number(*value, span.clone()))),
            Expr::String { value, span } => Ok(Some(Value::string(value.clone(), span.clone()))),
            Expr::VarAccess { name, span } => self.var_access(name, span, ctx).map(Some),
            Expr::VarAssign { name, value, .. } => {
                let value = self.value_of(value, ctx)?;
                ctx.define(name.clone(), value.clone());
                Ok(Some(value))
            }
            Expr::Binary { left, op, right, span } => {
                self.binary(left, *op, right, span, ctx).map(Some)
            }
            Expr::Unary { op, operand, span } => self.unary(*op, operand, span, ctx).map(Some),
            Expr::If { cases, else_case, .. } => self.if_expr(cases, else_case.as_deref(), ctx),
            Expr::For { var, start, end, step, body, span } => {
                self.for_expr(var, start, end, step.as_deref(), body, span, ctx)?;
                Ok(None)
            }
            Expr::While { condition, body, .. } => {
                self.while_expr(condition, body, ctx)?;
                Ok(None)
            }
            Expr::FunctionDef { name, params, body, span } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(ctx),
                };
                let value = Value::function(function, span.clone());
                if let Some(name) = name {
                    ctx.define(name.clone(), value.clone());
                }
                Ok(Some(value))
            }
            Expr::Call { callee, args, span } => self.call(callee, args, span, ctx),
        }
    }

    /// Evaluate an expression whose value is required
    fn value_of(&self, expr: &Expr, ctx: &Rc<Context>) -> Result<Value> {
        self.visit(expr, ctx)?
            .ok_or_else(|| AuroraError::runtime(ErrorKind::NoValue, expr.span().clone(), ctx))
    }

    fn var_access(&self, name: &str, span: &Span, ctx: &Rc<Context>) -> Result<Value> {
        match ctx.lookup(name) {
            Some(value) => Ok(value.with_span(span.clone())),
            None => Err(AuroraError::runtime(
                ErrorKind::Undefined(name.to_string()),
                span.clone(),
                ctx,
            )),
        }
    }

    fn binary(
        &self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Result<Value> {
        let left = self.value_of(left, ctx)?;
        let right = self.value_of(right, ctx)?;

        match left.binary_op(op, &right) {
            Ok(value) => Ok(value.with_span(span.clone())),
            Err(ErrorKind::DivisionByZero) => Err(AuroraError::runtime(
                ErrorKind::DivisionByZero,
                right.span.clone(),
                ctx,
            )),
            Err(kind) => Err(AuroraError::runtime(kind, left.span.to(&right.span), ctx)),
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Expr, span: &Span, ctx: &Rc<Context>) -> Result<Value> {
        let value = self.value_of(operand, ctx)?;

        let result = match op {
            UnaryOp::Neg => value.negate(),
            UnaryOp::Not => value.not(),
        };

        result
            .map(|v| v.with_span(span.clone()))
            .map_err(|kind| AuroraError::runtime(kind, value.span.clone(), ctx))
    }

    fn if_expr(
        &self,
        cases: &[IfCase],
        else_case: Option<&Expr>,
        ctx: &Rc<Context>,
    ) -> Result<Option<Value>> {
        for case in cases {
            if self.value_of(&case.condition, ctx)?.is_true() {
                return self.visit(&case.body, ctx);
            }
        }

        match else_case {
            Some(expr) => self.visit(expr, ctx),
            None => Ok(None),
        }
    }

    fn number_of(&self, expr: &Expr, ctx: &Rc<Context>) -> Result<Number> {
        let value = self.value_of(expr, ctx)?;
        value.as_number().ok_or_else(|| {
            AuroraError::runtime(ErrorKind::IllegalOperation, value.span.clone(), ctx)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn for_expr(
        &self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Result<()> {
        let mut i = self.number_of(start, ctx)?;
        let end = self.number_of(end, ctx)?;
        let step = match step {
            Some(expr) => self.number_of(expr, ctx)?,
            None => Number::Int(1),
        };

        let ascending = step.as_f64() >= 0.0;
        let in_range = |i: Number| {
            if ascending {
                i.as_f64() < end.as_f64()
            } else {
                i.as_f64() > end.as_f64()
            }
        };

        let mut iterations = 0usize;
        while in_range(i) {
            ctx.define(var, Value::number(i, span.clone()));
            i = i.add(step);
            self.visit(body, ctx)?;
            iterations += 1;
        }

        trace!(var, iterations, "for loop finished");
        Ok(())
    }

    fn while_expr(&self, condition: &Expr, body: &Expr, ctx: &Rc<Context>) -> Result<()> {
        let mut iterations = 0usize;
        while self.value_of(condition, ctx)?.is_true() {
            self.visit(body, ctx)?;
            iterations += 1;
        }

        trace!(iterations, "while loop finished");
        Ok(())
    }

    fn call(
        &self,
        callee: &Expr,
        args: &[Expr],
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Result<Option<Value>> {
        let callee = self.value_of(callee, ctx)?;
        let Some(function) = callee.as_function().cloned() else {
            return Err(AuroraError::runtime(ErrorKind::IllegalOperation, callee.span.clone(), ctx));
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.value_of(arg, ctx)?);
        }

        self.execute(&function, values, span, ctx)
    }

    /// Run `function` with positional `args` in a fresh frame entered at `span`
    pub fn execute(
        &self,
        function: &Function,
        args: Vec<Value>,
        span: &Span,
        ctx: &Rc<Context>,
    ) -> Result<Option<Value>> {
        let name = function.display_name();
        let expected = function.params.len();
        let given = args.len();

        if given > expected {
            return Err(AuroraError::runtime(
                ErrorKind::TooManyArgs { name: name.to_string(), given, expected },
                span.clone(),
                ctx,
            ));
        }
        if given < expected {
            return Err(AuroraError::runtime(
                ErrorKind::TooFewArgs { name: name.to_string(), given, expected },
                span.clone(),
                ctx,
            ));
        }

        let symbols = SymbolTable::with_parent(Rc::clone(&function.closure.symbols));
        let frame = Context::child(name, ctx, span.start.clone(), symbols);
        for (param, arg) in function.params.iter().zip(args) {
            frame.define(param.clone(), arg);
        }

        debug!(function = name, depth = frame.depth(), "call");
        self.visit(&function.body, &frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn eval(source: &str) -> Result<Option<Value>> {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in(source, &ctx)
    }

    fn eval_in(source: &str, ctx: &Rc<Context>) -> Result<Option<Value>> {
        let ast = parse(tokenize("<test>", source)?)?;
        Interpreter::new().visit(&ast, ctx)
    }

    fn show(source: &str) -> String {
        match eval(source) {
            Ok(Some(value)) => value.to_string(),
            Ok(None) => "<none>".to_string(),
            Err(err) => err.details(),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(show("2+3*4"), "14");
        assert_eq!(show("2^3^2"), "512");
        assert_eq!(show("(2+3)*4"), "20");
        assert_eq!(show("10 - 4 - 3"), "3");
        assert_eq!(show("-3 + 1"), "-2");
        assert_eq!(show("1.5 * 2"), "3.0");
    }

    #[test]
    fn test_division_by_zero_points_at_divisor() {
        let err = eval("5 / 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.span.start.index, 4);
    }

    #[test]
    fn test_illegal_operation_spans_both_operands() {
        let err = eval("\"a\" - 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalOperation);
        assert_eq!(err.span.start.index, 0);
        assert_eq!(err.span.end.index, 7);
    }

    #[test]
    fn test_left_operand_errors_first() {
        let err = eval("a + b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Undefined("a".to_string()));
    }

    #[test]
    fn test_assignment_returns_value() {
        let ctx = Context::root("<program>", SymbolTable::new());
        assert_eq!(eval_in("set x = 5", &ctx).unwrap().unwrap().to_string(), "5");
        assert_eq!(eval_in("x + 1", &ctx).unwrap().unwrap().to_string(), "6");
    }

    #[test]
    fn test_if_without_branch_is_empty() {
        assert_eq!(show("if 0 then 1"), "<none>");
        assert_eq!(show("if 0 then 1 eli 2 then 3"), "3");
        assert_eq!(show("(if 0 then 1) + 1"), "Expression produced no value");
    }

    #[test]
    fn test_not_and_negation() {
        assert_eq!(show("not 0"), "1");
        assert_eq!(show("not 5"), "0");
        assert_eq!(show("-\"x\""), "Illegal operation");
    }

    #[test]
    fn test_for_rebinds_in_current_scope() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("set total = 0", &ctx).unwrap();
        eval_in("for i = 1 to 5 then set total = total + i", &ctx).unwrap();
        assert_eq!(ctx.lookup("total").unwrap().to_string(), "10");
        assert_eq!(ctx.lookup("i").unwrap().to_string(), "4");
    }

    #[test]
    fn test_for_descending() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("set n = 0", &ctx).unwrap();
        eval_in("for i = 3 to 0 step -1 then set n = n + 1", &ctx).unwrap();
        assert_eq!(ctx.lookup("n").unwrap().to_string(), "3");
    }

    #[test]
    fn test_for_bounds_must_be_numbers() {
        assert_eq!(show("for i = \"a\" to 3 then i"), "Illegal operation");
    }

    #[test]
    fn test_while() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("set x = 0", &ctx).unwrap();
        assert!(eval_in("while x < 10 then set x = x + 3", &ctx).unwrap().is_none());
        assert_eq!(ctx.lookup("x").unwrap().to_string(), "12");
    }

    #[test]
    fn test_calling_a_number_is_illegal() {
        assert_eq!(show("5(1)"), "Illegal operation");
    }

    #[test]
    fn test_anonymous_function() {
        assert_eq!(show("(fun (a) -> a * 2)(21)"), "42");
        assert_eq!(show("fun (a) -> a"), "<function <anonymous>>");
    }

    #[test]
    fn test_arity_errors() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("fun add(a, b) -> a + b", &ctx).unwrap();
        let few = eval_in("add(1)", &ctx).unwrap_err();
        assert_eq!(few.details(), "Too few args (1/2 needed) passed into 'add'");
        let many = eval_in("add(1, 2, 3)", &ctx).unwrap_err();
        assert_eq!(many.details(), "Too many args (3/2) passed into 'add'");
    }

    #[test]
    fn test_function_scope_is_isolated() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("set x = 1", &ctx).unwrap();
        eval_in("fun f() -> set x = 99", &ctx).unwrap();
        assert_eq!(eval_in("f()", &ctx).unwrap().unwrap().to_string(), "99");
        assert_eq!(ctx.lookup("x").unwrap().to_string(), "1");
    }

    #[test]
    fn test_runtime_error_inside_call_carries_frame() {
        let ctx = Context::root("<program>", SymbolTable::new());
        eval_in("fun boom() -> 1 / 0", &ctx).unwrap();
        let err = eval_in("boom()", &ctx).unwrap_err();
        let frame = err.context.unwrap();
        assert_eq!(frame.name, "boom");
        assert_eq!(frame.parent.as_ref().unwrap().name, "<program>");
    }
}
