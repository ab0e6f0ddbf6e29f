//! Aurora - a small expression-oriented scripting language
//!
//! Source text goes through the [`Lexer`], the [`Parser`] and the
//! [`Interpreter`]; a [`Session`] ties the three together around a root
//! environment that persists between evaluations.

pub mod token;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod environment;
pub mod interpreter;
pub mod session;
pub mod error;

pub use error::{AuroraError, ErrorKind, Result};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use session::Session;
pub use value::Value;

/// Evaluate `source` in a fresh session
pub fn run(source: &str) -> Result<Option<Value>> {
    Session::new().evaluate("<stdin>", source)
}

/// Version of the Aurora language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
