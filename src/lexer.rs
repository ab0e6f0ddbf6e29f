//! Lexer for Aurora
//!
//! Converts source code into a stream of tokens. Scanning stops at the first
//! bad character; no partial token list is returned alongside an error.

use std::rc::Rc;

use tracing::trace;

use crate::error::{AuroraError, ErrorKind, Result};
use crate::token::{lookup_keyword, Position, Source, Span, Token, TokenKind};

/// The lexer state
pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    /// Create a new lexer over `text`, reported under `name` in errors
    pub fn new(name: &str, text: &str) -> Self {
        Self::from_source(Source::new(name, text))
    }

    pub fn from_source(source: Rc<Source>) -> Self {
        let chars: Vec<char> = source.text.chars().collect();
        let current = chars.first().copied();
        Self {
            chars,
            pos: Position::start(source),
            current,
        }
    }

    /// Tokenize the entire source, ending with an EOF token
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        let start = self.pos.clone();
        let end = start.advanced(None);
        tokens.push(Token::new(TokenKind::Eof, start, end));

        trace!(count = tokens.len(), source = %self.pos.source.name, "tokenized");
        Ok(tokens)
    }

    /// Get the next token, or `None` at end of input
    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.current else {
            return Ok(None);
        };

        let token = match ch {
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_ascii_alphabetic() => self.scan_identifier(),
            '"' => self.scan_string()?,

            '+' => self.single(TokenKind::Plus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '^' => self.single(TokenKind::Caret),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            ',' => self.single(TokenKind::Comma),

            '-' => self.either('>', TokenKind::Arrow, TokenKind::Minus),
            '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '!' => self.scan_not_equal()?,

            _ => {
                let start = self.pos.clone();
                self.advance();
                return Err(AuroraError::new(
                    ErrorKind::IllegalCharacter(ch),
                    Span::new(start, self.pos.clone()),
                ));
            }
        };

        Ok(Some(token))
    }

    /// Advance the cursor one character
    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = self.chars.get(self.pos.index).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.current {
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();
        Token::new(kind, start, self.pos.clone())
    }

    /// Scan a one-character token, or the two-character one when `next` follows
    fn either(&mut self, next: char, long: TokenKind, short: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();

        let kind = if self.current == Some(next) {
            self.advance();
            long
        } else {
            short
        };

        Token::new(kind, start, self.pos.clone())
    }

    fn scan_not_equal(&mut self) -> Result<Token> {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();
            return Ok(Token::new(TokenKind::BangEqual, start, self.pos.clone()));
        }

        self.advance();
        Err(AuroraError::new(
            ErrorKind::ExpectedCharacter("'=' (after '!')".to_string()),
            Span::new(start, self.pos.clone()),
        ))
    }

    /// Scan a number literal. A second '.' ends the number.
    fn scan_number(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.current {
            if c == '.' {
                if seen_dot {
                    break;
                }
                seen_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }

        let kind = if seen_dot {
            TokenKind::Float(text.parse().unwrap_or(f64::NAN))
        } else {
            // Literals too wide for i64 degrade to floats
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => TokenKind::Float(text.parse().unwrap_or(f64::INFINITY)),
            }
        };

        Token::new(kind, start, self.pos.clone())
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();

        while let Some(c) = self.current {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match lookup_keyword(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(text),
        };

        Token::new(kind, start, self.pos.clone())
    }

    /// Scan a string literal, translating backslash escapes
    fn scan_string(&mut self) -> Result<Token> {
        let start = self.pos.clone();
        let mut value = String::new();

        // Consume opening quote
        self.advance();

        loop {
            match self.current {
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::String(value), start, self.pos.clone()));
                }
                Some('\\') => {
                    self.advance();
                    let Some(escaped) = self.current else {
                        break;
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        other => other,
                    });
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => break,
            }
        }

        Err(AuroraError::new(
            ErrorKind::ExpectedCharacter("'\"' (to close string)".to_string()),
            Span::new(start, self.pos.clone()),
        ))
    }
}

/// Tokenize `text` in one call
pub fn tokenize(name: &str, text: &str) -> Result<Vec<Token>> {
    Lexer::new(name, text).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize("<test>", source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect()
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("set if then eli else for to step while fun and or not");
        assert_eq!(tokens, vec![
            TokenKind::Keyword(Keyword::Set),
            TokenKind::Keyword(Keyword::If),
            TokenKind::Keyword(Keyword::Then),
            TokenKind::Keyword(Keyword::Eli),
            TokenKind::Keyword(Keyword::Else),
            TokenKind::Keyword(Keyword::For),
            TokenKind::Keyword(Keyword::To),
            TokenKind::Keyword(Keyword::Step),
            TokenKind::Keyword(Keyword::While),
            TokenKind::Keyword(Keyword::Fun),
            TokenKind::Keyword(Keyword::And),
            TokenKind::Keyword(Keyword::Or),
            TokenKind::Keyword(Keyword::Not),
        ]);
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ - * / ^ = == != < <= > >= -> ( ) ,");
        assert_eq!(tokens, vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Caret,
            TokenKind::Equal,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Arrow,
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::Comma,
        ]);
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("42 2.5 0 100.0");
        assert_eq!(tokens, vec![
            TokenKind::Int(42),
            TokenKind::Float(2.5),
            TokenKind::Int(0),
            TokenKind::Float(100.0),
        ]);
    }

    #[test]
    fn test_second_dot_ends_number() {
        let err = tokenize("<test>", "1.2.3").unwrap_err();
        // The stray '.' left behind is not a token of its own
        assert_eq!(err.kind, ErrorKind::IllegalCharacter('.'));
        assert_eq!(err.span.start.column, 3);
    }

    #[test]
    fn test_identifiers_are_ascii() {
        assert_eq!(kinds("a_1 b2"), vec![
            TokenKind::Ident("a_1".to_string()),
            TokenKind::Ident("b2".to_string()),
        ]);

        let err = tokenize("<test>", "x\u{e9}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalCharacter('\u{e9}'));
        assert_eq!(err.span.start.column, 1);
        assert_eq!(err.span.end.column, 2);
    }

    #[test]
    fn test_strings_and_escapes() {
        let tokens = kinds(r#""hello" "a\tb\n" "q\"x""#);
        assert_eq!(tokens, vec![
            TokenKind::String("hello".to_string()),
            TokenKind::String("a\tb\n".to_string()),
            TokenKind::String("q\"x".to_string()),
        ]);
    }

    #[test]
    fn test_identifiers() {
        let tokens = kinds("foo bar_baz x1 setter");
        assert_eq!(tokens, vec![
            TokenKind::Ident("foo".to_string()),
            TokenKind::Ident("bar_baz".to_string()),
            TokenKind::Ident("x1".to_string()),
            TokenKind::Ident("setter".to_string()),
        ]);
    }

    #[test]
    fn test_newlines_are_insignificant() {
        let tokens = tokenize("<test>", "1\n+\n2").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].span.start.line, 2);
        assert_eq!(tokens[2].span.start.column, 0);
    }

    #[test]
    fn test_eof_always_appended() {
        let tokens = tokenize("<test>", "").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_illegal_character_span() {
        let err = tokenize("<test>", "1 + @").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalCharacter('@'));
        assert_eq!(err.span.start.index, 4);
        assert_eq!(err.span.end.index, 5);
    }

    #[test]
    fn test_lone_bang() {
        let err = tokenize("<test>", "1 ! 2").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ExpectedCharacter(_)));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("<test>", "\"abc").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ExpectedCharacter(_)));
        assert_eq!(err.span.start.index, 0);
    }
}
