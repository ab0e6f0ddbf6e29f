//! A program session: the root environment shared by successive evaluations
//!
//! Top-level `set` and `fun` bindings persist in the session between calls
//! to [`Session::evaluate`], including bindings made before a runtime error.

use std::rc::Rc;

use tracing::debug;

use crate::environment::{Context, SymbolTable};
use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::token::{Position, Source, Span};
use crate::value::{Number, Value};

/// Name of the root frame shown at the top of tracebacks
pub const ROOT_CONTEXT: &str = "<program>";

pub struct Session {
    context: Rc<Context>,
    interpreter: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Self::with_name(ROOT_CONTEXT)
    }

    /// Create a session whose root frame is called `name`
    pub fn with_name(name: &str) -> Self {
        Self {
            context: Context::root(name, builtins()),
            interpreter: Interpreter::new(),
        }
    }

    /// Lex, parse and evaluate `text` against the session's root environment.
    ///
    /// Lexical and syntax errors abort before anything is evaluated.
    pub fn evaluate(&mut self, source_name: &str, text: &str) -> Result<Option<Value>> {
        let tokens = Lexer::new(source_name, text).tokenize()?;
        let ast = Parser::new(tokens).parse()?;

        let result = self.interpreter.visit(&ast, &self.context);
        if let Err(err) = &result {
            debug!(kind = err.kind.name(), details = %err.kind, "evaluation failed");
        }
        result
    }

    /// The root context, for running an already parsed tree through
    /// [`Interpreter::visit`] against this session's bindings
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Look up a binding in the root environment
    pub fn get(&self, name: &str) -> Option<Value> {
        self.context.lookup(name)
    }

    /// Drop every binding made so far
    pub fn reset(&mut self) {
        let name = self.context.name.clone();
        self.context = Context::root(name, builtins());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The bindings every root environment starts with
fn builtins() -> SymbolTable {
    let pos = Position::start(Source::new("<builtin>", ""));
    let span = Span::new(pos.clone(), pos);

    let mut table = SymbolTable::new();
    table.set("null", Value::number(Number::Int(-1), span.clone()));
    table.set("false", Value::number(Number::Int(0), span.clone()));
    table.set("true", Value::number(Number::Int(1), span));
    table
}
