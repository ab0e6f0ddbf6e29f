//! Parser for Aurora
//!
//! Recursive descent over the token stream with a single cursor and one token
//! of lookahead. Precedence, lowest first:
//!
//! ```text
//! expr     := 'set' IDENT '=' expr | com_expr (('and' | 'or') com_expr)*
//! com_expr := 'not' com_expr | ar_expr (('==' | '!=' | '<' | '>' | '<=' | '>=') ar_expr)*
//! ar_expr  := term (('+' | '-') term)*
//! term     := factor (('*' | '/') factor)*
//! factor   := ('+' | '-') factor | power
//! power    := call ('^' factor)?
//! call     := atom ('(' (expr (',' expr)*)? ')')?
//! atom     := INT | FLOAT | STRING | IDENT | '(' expr ')' | if | for | while | fun
//! ```

use std::rc::Rc;

use tracing::debug;

use crate::ast::{BinaryOp, Expr, IfCase, UnaryOp};
use crate::error::{AuroraError, Result};
use crate::token::{Keyword, Position, Source, Span, Token, TokenKind};
use crate::value::Number;

const EXPECTED_OPERATOR: &str =
    "Expected '+', '-', '*', '/', '^', '==', '!=', '<', '>', '<=', '>=', 'and' or 'or'";
const EXPECTED_EXPRESSION: &str =
    "Expected 'set', 'if', 'for', 'while', 'fun', int, float, string, identifier, '+', '-', '(' or 'not'";
const EXPECTED_ARGUMENT: &str =
    "Expected ')', 'set', 'if', 'for', 'while', 'fun', int, float, string, identifier, '+', '-', '(' or 'not'";
const EXPECTED_ATOM: &str =
    "Expected int, float, string, identifier, '+', '-', '(', 'if', 'for', 'while' or 'fun'";

/// The parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a new parser from tokens. An EOF token is appended when the
    /// stream does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let eof = match tokens.last() {
            Some(last) if matches!(last.kind, TokenKind::Eof) => None,
            Some(last) => Some(last.span.end.clone()),
            None => Some(Position::start(Source::new("<empty>", ""))),
        };
        if let Some(start) = eof {
            let end = start.advanced(None);
            tokens.push(Token::new(TokenKind::Eof, start, end));
        }
        Self { tokens, current: 0 }
    }

    /// Parse the whole token stream into a single expression
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(AuroraError::syntax(EXPECTED_OPERATOR, self.peek().span.clone()));
        }

        debug!(ast = %expr, "parsed");
        Ok(expr)
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Expr> {
        if self.check_keyword(Keyword::Set) {
            return self.assignment();
        }

        let start = self.current;
        let result = self.binary_chain(Self::comparison, |kind| match kind {
            TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
            TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
            _ => None,
        });
        self.widen(result, start, EXPECTED_EXPRESSION)
    }

    fn assignment(&mut self) -> Result<Expr> {
        self.advance(); // consume 'set'

        let (name, name_span) = self.expect_ident("Expected identifier")?;
        self.expect(&TokenKind::Equal, "Expected '='")?;
        let value = self.expression()?;

        let span = Span::new(name_span.start, value.span().end.clone());
        Ok(Expr::VarAssign {
            name,
            value: Box::new(value),
            span,
        })
    }

    fn comparison(&mut self) -> Result<Expr> {
        if self.check_keyword(Keyword::Not) {
            let op_span = self.advance().span;
            let operand = self.comparison()?;
            let span = Span::new(op_span.start, operand.span().end.clone());
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }

        self.binary_chain(Self::arithmetic, |kind| match kind {
            TokenKind::EqualEqual => Some(BinaryOp::Eq),
            TokenKind::BangEqual => Some(BinaryOp::Ne),
            TokenKind::Less => Some(BinaryOp::Lt),
            TokenKind::Greater => Some(BinaryOp::Gt),
            TokenKind::LessEqual => Some(BinaryOp::Le),
            TokenKind::GreaterEqual => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn arithmetic(&mut self) -> Result<Expr> {
        self.binary_chain(Self::term, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_chain(Self::factor, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::Minus) {
            let op_span = self.advance().span;
            let operand = self.factor()?;
            let span = Span::new(op_span.start, operand.span().end.clone());
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }

        // Unary plus is the identity
        if self.match_token(&TokenKind::Plus) {
            return self.factor();
        }

        self.power()
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.call()?;

        if !self.match_token(&TokenKind::Caret) {
            return Ok(base);
        }

        // Recursing into factor makes '^' right-associative
        let exponent = self.factor()?;
        let span = base.span().to(exponent.span());
        Ok(Expr::Binary {
            left: Box::new(base),
            op: BinaryOp::Pow,
            right: Box::new(exponent),
            span,
        })
    }

    fn call(&mut self) -> Result<Expr> {
        let callee = self.atom()?;

        if !self.match_token(&TokenKind::LeftParen) {
            return Ok(callee);
        }

        let mut args = Vec::new();
        if !self.match_token(&TokenKind::RightParen) {
            loop {
                let start = self.current;
                let arg = self.expression();
                args.push(self.widen(arg, start, EXPECTED_ARGUMENT)?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen, "Expected ',' or ')'")?;
        }

        let span = match args.last() {
            Some(last) => callee.span().to(last.span()),
            None => callee.span().clone(),
        };
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn atom(&mut self) -> Result<Expr> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Number { value: Number::Int(n), span: token.span })
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(Expr::Number { value: Number::Float(n), span: token.span })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::String { value, span: token.span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::VarAccess { name, span: token.span })
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&TokenKind::RightParen, "Expected ')'")?;
                Ok(expr)
            }
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Fun) => self.function_def(),
            _ => Err(AuroraError::syntax(EXPECTED_ATOM, token.span)),
        }
    }

    fn if_expr(&mut self) -> Result<Expr> {
        self.advance(); // consume 'if'

        let mut cases = vec![self.if_case()?];
        while self.match_keyword(Keyword::Eli) {
            cases.push(self.if_case()?);
        }

        let else_case = if self.match_keyword(Keyword::Else) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        let first = cases[0].condition.span();
        let last = match &else_case {
            Some(expr) => expr.span(),
            None => cases[cases.len() - 1].body.span(),
        };
        let span = first.to(last);

        Ok(Expr::If { cases, else_case, span })
    }

    fn if_case(&mut self) -> Result<IfCase> {
        let condition = self.expression()?;
        self.expect_keyword(Keyword::Then, "Expected 'then'")?;
        let body = self.expression()?;
        Ok(IfCase { condition, body })
    }

    fn for_expr(&mut self) -> Result<Expr> {
        self.advance(); // consume 'for'

        let (var, var_span) = self.expect_ident("Expected identifier")?;
        self.expect(&TokenKind::Equal, "Expected '='")?;
        let start = self.expression()?;

        self.expect_keyword(Keyword::To, "Expected 'to'")?;
        let end = self.expression()?;

        let step = if self.match_keyword(Keyword::Step) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        self.expect_keyword(Keyword::Then, "Expected 'then'")?;
        let body = self.expression()?;

        let span = Span::new(var_span.start, body.span().end.clone());
        Ok(Expr::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            span,
        })
    }

    fn while_expr(&mut self) -> Result<Expr> {
        self.advance(); // consume 'while'

        let condition = self.expression()?;
        self.expect_keyword(Keyword::Then, "Expected 'then'")?;
        let body = self.expression()?;

        let span = condition.span().to(body.span());
        Ok(Expr::While {
            condition: Box::new(condition),
            body: Box::new(body),
            span,
        })
    }

    fn function_def(&mut self) -> Result<Expr> {
        self.advance(); // consume 'fun'

        let mut span_start = None;
        let name = match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                span_start = Some(self.advance().span.start);
                self.expect(&TokenKind::LeftParen, "Expected '('")?;
                Some(name)
            }
            _ => {
                self.expect(&TokenKind::LeftParen, "Expected identifier or '('")?;
                None
            }
        };

        let mut params = Vec::new();
        if matches!(self.peek().kind, TokenKind::Ident(_)) {
            loop {
                let (param, param_span) = self.expect_ident("Expected identifier")?;
                span_start.get_or_insert(param_span.start);
                params.push(param);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen, "Expected ',' or ')'")?;
        } else {
            self.expect(&TokenKind::RightParen, "Expected identifier or ')'")?;
        }

        self.expect(&TokenKind::Arrow, "Expected '->'")?;
        let body = self.expression()?;

        let end = body.span().end.clone();
        let start = span_start.unwrap_or_else(|| body.span().start.clone());
        Ok(Expr::FunctionDef {
            name,
            params,
            body: Rc::new(body),
            span: Span::new(start, end),
        })
    }

    // ==================== Helpers ====================

    /// Parse a left-associative chain of `operand` joined by operators `select` accepts
    fn binary_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr>,
        select: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr> {
        let mut left = operand(self)?;

        while let Some(op) = select(&self.peek().kind) {
            self.advance();
            let right = operand(self)?;
            let span = left.span().to(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Replace an error raised before any token was consumed with a broader
    /// message. Errors from deeper in the input are kept as they are.
    fn widen(&self, result: Result<Expr>, start: usize, message: &str) -> Result<Expr> {
        match result {
            Err(_) if self.current == start => {
                Err(AuroraError::syntax(message, self.peek().span.clone()))
            }
            other => other,
        }
    }

    // Never empty: `new` guarantees a trailing EOF
    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind.is_keyword(keyword)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(AuroraError::syntax(message, self.peek().span.clone()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> Result<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(AuroraError::syntax(message, self.peek().span.clone()))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<(String, Span)> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(AuroraError::syntax(message, self.peek().span.clone()))
        }
    }
}

/// Parse a token stream in one call
pub fn parse(tokens: Vec<Token>) -> Result<Expr> {
    Parser::new(tokens).parse()
}
