//! Token definitions for Aurora
//!
//! Tokens represent the atomic units of meaning in source code, each tagged
//! with the span of source text it was scanned from.

use std::fmt;
use std::rc::Rc;

/// A named piece of source text shared by every position pointing into it
#[derive(Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            text: text.into(),
        })
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.name)
    }
}

/// A cursor location in source code.
///
/// `index` counts characters, `line` and `column` are zero-based. Positions
/// are cloned whenever a token or error captures one, so they never alias the
/// lexer's live cursor.
#[derive(Clone, PartialEq)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub source: Rc<Source>,
}

impl Position {
    /// Position of the first character of `source`
    pub fn start(source: Rc<Source>) -> Self {
        Self {
            index: 0,
            line: 0,
            column: 0,
            source,
        }
    }

    /// Step past `current`, wrapping to the next line after a newline
    pub fn advance(&mut self, current: Option<char>) {
        self.index += 1;
        self.column += 1;

        if current == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
    }

    /// A copy of this position moved one character forward
    pub fn advanced(&self, current: Option<char>) -> Self {
        let mut next = self.clone();
        next.advance(current);
        next
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source.name, self.line + 1, self.column)
    }
}

/// Start and end positions delimiting a run of source text (end exclusive)
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span from the start of `self` to the end of `other`
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }
}

/// Reserved words of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Set,
    And,
    Or,
    Not,
    If,
    Then,
    Eli,
    Else,
    For,
    To,
    Step,
    While,
    Fun,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Set => "set",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Eli => "eli",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::To => "to",
            Keyword::Step => "step",
            Keyword::While => "while",
            Keyword::Fun => "fun",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token types in Aurora
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),

    Ident(String),
    Keyword(Keyword),

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Caret,      // ^

    // Comparison
    Equal,        // =
    EqualEqual,   // ==
    BangEqual,    // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,
    Arrow,      // ->

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "{}", n),
            TokenKind::Float(n) => write!(f, "{}", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::Keyword(k) => write!(f, "{}", k),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its kind and location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: Position, end: Position) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Check if a string is a keyword and return the corresponding keyword
pub fn lookup_keyword(ident: &str) -> Option<Keyword> {
    match ident {
        "set" => Some(Keyword::Set),
        "and" => Some(Keyword::And),
        "or" => Some(Keyword::Or),
        "not" => Some(Keyword::Not),
        "if" => Some(Keyword::If),
        "then" => Some(Keyword::Then),
        "eli" => Some(Keyword::Eli),
        "else" => Some(Keyword::Else),
        "for" => Some(Keyword::For),
        "to" => Some(Keyword::To),
        "step" => Some(Keyword::Step),
        "while" => Some(Keyword::While),
        "fun" => Some(Keyword::Fun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wraps_on_newline() {
        let mut pos = Position::start(Source::new("<test>", "a\nb"));
        pos.advance(Some('a'));
        assert_eq!((pos.index, pos.line, pos.column), (1, 0, 1));
        pos.advance(Some('\n'));
        assert_eq!((pos.index, pos.line, pos.column), (2, 1, 0));
    }

    #[test]
    fn test_advanced_leaves_original_untouched() {
        let pos = Position::start(Source::new("<test>", "xy"));
        let next = pos.advanced(Some('x'));
        assert_eq!(pos.index, 0);
        assert_eq!(next.index, 1);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(lookup_keyword("eli"), Some(Keyword::Eli));
        assert_eq!(lookup_keyword("fun"), Some(Keyword::Fun));
        assert_eq!(lookup_keyword("function"), None);
    }
}
