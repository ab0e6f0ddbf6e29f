//! Error types for Aurora
//!
//! Every error carries the span it points at. Runtime errors also carry the
//! context chain that was active when they were raised, which is walked to
//! render a traceback.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::environment::Context;
use crate::token::{Position, Span};

/// Error kinds in Aurora. The `Display` form is the error's details line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexer errors
    #[error("'{0}'")]
    IllegalCharacter(char),
    #[error("{0}")]
    ExpectedCharacter(String),

    // Parser errors
    #[error("{0}")]
    InvalidSyntax(String),

    // Runtime errors
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Illegal operation")]
    IllegalOperation,
    #[error("'{0}' is not defined")]
    Undefined(String),
    #[error("Too many args ({given}/{expected}) passed into '{name}'")]
    TooManyArgs {
        name: String,
        given: usize,
        expected: usize,
    },
    #[error("Too few args ({given}/{expected} needed) passed into '{name}'")]
    TooFewArgs {
        name: String,
        given: usize,
        expected: usize,
    },
    #[error("Expression produced no value")]
    NoValue,
}

impl ErrorKind {
    /// The name printed in front of the details
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::IllegalCharacter(_) => "IllegalCharacter",
            ErrorKind::ExpectedCharacter(_) => "ExpectedCharacter",
            ErrorKind::InvalidSyntax(_) => "InvalidSyntax",
            _ => "RuntimeErr",
        }
    }

    pub fn is_runtime(&self) -> bool {
        !matches!(
            self,
            ErrorKind::IllegalCharacter(_)
                | ErrorKind::ExpectedCharacter(_)
                | ErrorKind::InvalidSyntax(_)
        )
    }
}

/// An Aurora error with location information
#[derive(Debug, Clone)]
pub struct AuroraError {
    pub kind: ErrorKind,
    pub span: Span,
    pub context: Option<Rc<Context>>,
}

impl AuroraError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: None,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::InvalidSyntax(message.into()), span)
    }

    pub fn runtime(kind: ErrorKind, span: Span, context: &Rc<Context>) -> Self {
        Self {
            kind,
            span,
            context: Some(Rc::clone(context)),
        }
    }

    /// The error's details line without kind name or location
    pub fn details(&self) -> String {
        self.kind.to_string()
    }

    /// Render the full, multi-line report shown to users
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn traceback(&self) -> String {
        let mut frames = Vec::new();
        let mut pos = Some(&self.span.start);
        let mut context = self.context.as_deref();

        while let (Some(ctx), Some(at)) = (context, pos) {
            frames.push(format!(
                "    File {}, line {}, in {}\n",
                at.source.name,
                at.line + 1,
                ctx.name
            ));
            pos = ctx.entry.as_ref().or(pos);
            context = ctx.parent.as_deref();
        }

        let mut result = String::from("Traceback (most recent call last):\n");
        for frame in frames.iter().rev() {
            result.push_str(frame);
        }
        result
    }
}

impl fmt::Display for AuroraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = point_at(&self.span.start.source.text, &self.span.start, &self.span.end);

        if self.kind.is_runtime() {
            write!(
                f,
                "{}{}: {}\n{}",
                self.traceback(),
                self.kind.name(),
                self.kind,
                pointer
            )
        } else {
            write!(
                f,
                "{}: {}\nFile {}, line {}\n{}",
                self.kind.name(),
                self.kind,
                self.span.start.source.name,
                self.span.start.line + 1,
                pointer
            )
        }
    }
}

impl std::error::Error for AuroraError {}

/// Result type for Aurora operations
pub type Result<T> = std::result::Result<T, AuroraError>;

/// Underline the text between `start` and `end` with carets, one source line
/// at a time. Every rendered line gets at least one caret.
pub fn point_at(text: &str, start: &Position, end: &Position) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = end.line.max(start.line);
    let mut rendered = Vec::new();

    for line_no in start.line..=last {
        let Some(line) = lines.get(line_no) else {
            break;
        };
        let line = line.trim_end_matches('\r').replace('\t', " ");
        let width = line.chars().count();

        let col_start = if line_no == start.line { start.column } else { 0 };
        let col_end = if line_no == last { end.column } else { width };
        let col_end = col_end.min(width).max(col_start + 1);

        rendered.push(format!(
            "{}\n{}{}",
            line,
            " ".repeat(col_start),
            "^".repeat(col_end - col_start)
        ));
    }

    rendered.join("\n")
}
