//! Execution environment for Aurora
//!
//! A `SymbolTable` holds the bindings of one lexical scope and chains to the
//! scope it was defined in. A `Context` names the frame currently executing,
//! chains to its caller and owns the symbol table the frame evaluates in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::token::Position;
use crate::value::Value;

/// Shared, mutable handle to a symbol table
pub type Scope = Rc<RefCell<SymbolTable>>;

/// Variable bindings with lexical parent lookup
#[derive(Debug, Default)]
pub struct SymbolTable {
    values: HashMap<String, Value>,
    parent: Option<Scope>,
}

impl SymbolTable {
    /// Create a root table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table whose misses fall through to `parent`
    pub fn with_parent(parent: Scope) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn into_scope(self) -> Scope {
        Rc::new(RefCell::new(self))
    }

    /// Look a name up through the parent chain, returning an independent copy
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref()?.borrow().get(name),
        }
    }

    /// Bind a name in this table only; parents are never written
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }
}

/// A frame of execution, used to attribute runtime errors and build tracebacks
pub struct Context {
    pub name: String,
    pub parent: Option<Rc<Context>>,
    /// Where in the parent this frame was entered from
    pub entry: Option<Position>,
    pub symbols: Scope,
}

impl Context {
    /// Create a top-level context with its own root table
    pub fn root(name: impl Into<String>, symbols: SymbolTable) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            parent: None,
            entry: None,
            symbols: symbols.into_scope(),
        })
    }

    /// Create a frame entered from `parent` at `entry`
    pub fn child(
        name: impl Into<String>,
        parent: &Rc<Context>,
        entry: Position,
        symbols: SymbolTable,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            parent: Some(Rc::clone(parent)),
            entry: Some(entry),
            symbols: symbols.into_scope(),
        })
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.symbols.borrow().get(name)
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.symbols.borrow_mut().set(name, value);
    }

    /// Number of frames from this context up to the root, inclusive
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<context {}>", self.name)
    }
}
