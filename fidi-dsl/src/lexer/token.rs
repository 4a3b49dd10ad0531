//! Lexer token types

use std::fmt;

/// Token kinds for the fidi request language.
///
/// Integer tokens carry the raw signed-digit lexeme rather than a parsed
/// value: the scanner recognizes shape only, range checking belongs to the
/// validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier(String),
    /// Double-quoted string, surrounding quotes preserved in the value.
    QuotedString(String),
    /// `-?[0-9]+`, raw lexeme.
    Integer(String),

    // Punctuation
    LBracket,
    RBracket,
    Comma,
    Eq,
    Arrow,
    Dot,

    // Special
    Eof,
    Error(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::QuotedString(s) => write!(f, "string {}", s),
            TokenKind::Integer(s) => write!(f, "integer {}", s),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Error(msg) => write!(f, "invalid input ({})", msg),
        }
    }
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
