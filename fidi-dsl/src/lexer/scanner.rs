//! Scanner implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

/// Scanner for the fidi request language.
///
/// The scanner is driven lazily by the parser, one token at a time, because
/// edge payloads are not tokenized at all: when the parser has consumed the
/// opening bracket of a payload it switches the scanner into blob mode
/// ([`Scanner::scan_blob`]), which captures the verbatim text up to the
/// matching close bracket.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Get the next token from the source.
    ///
    /// Unrecognized characters are returned as [`TokenKind::Error`] tokens
    /// rather than failures; the token stream itself never ends before
    /// [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '[' => {
                    self.advance();
                    TokenKind::LBracket
                }
                ']' => {
                    self.advance();
                    TokenKind::RBracket
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                '=' => {
                    self.advance();
                    TokenKind::Eq
                }
                '.' => {
                    self.advance();
                    TokenKind::Dot
                }
                '-' => {
                    self.advance();
                    if self.peek_char() == Some('>') {
                        self.advance();
                        TokenKind::Arrow
                    } else if self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                        self.scan_integer(start_pos)
                    } else {
                        TokenKind::Error("unexpected character: -".to_string())
                    }
                }
                '"' => self.scan_string(),
                c if c.is_ascii_digit() => self.scan_integer(start_pos),
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(start_pos),
                c => {
                    self.advance();
                    TokenKind::Error(format!("unexpected character: {}", c))
                }
            },
        };

        Token {
            kind,
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Capture the verbatim text up to the bracket matching an already
    /// consumed `[`, and consume that closing bracket.
    ///
    /// Nested brackets are depth-counted; double-quoted spans are skipped so
    /// a bracket inside a string does not unbalance the count. Returns the
    /// inner text, without the surrounding brackets, or an error token when
    /// the input ends before the bracket closes.
    pub fn scan_blob(&mut self) -> Result<String, Token> {
        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;
        let mut depth = 0usize;

        loop {
            match self.peek_char() {
                None => {
                    return Err(Token {
                        kind: TokenKind::Error("unterminated payload".to_string()),
                        span: Span {
                            start: start_pos,
                            end: self.pos,
                            line: start_line,
                            column: start_col,
                        },
                    });
                }
                Some('[') => {
                    depth += 1;
                    self.advance();
                }
                Some(']') => {
                    if depth == 0 {
                        let blob = self.source[start_pos..self.pos].to_string();
                        self.advance();
                        return Ok(blob);
                    }
                    depth -= 1;
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    while let Some(c) = self.peek_char() {
                        self.advance();
                        if c == '"' {
                            break;
                        }
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan an identifier.
    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Identifier(self.source[start..self.pos].to_string())
    }

    /// Scan a signed integer lexeme. The leading `-`, if any, has already
    /// been consumed.
    fn scan_integer(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Integer(self.source[start..self.pos].to_string())
    }

    /// Scan a quoted string. The grammar has no escape sequences; the token
    /// value keeps the surrounding quotes, the parser strips them where
    /// canonicalization requires.
    fn scan_string(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance(); // consume opening quote

        loop {
            match self.peek_char() {
                None => return TokenKind::Error("unterminated string".to_string()),
                Some('"') => {
                    self.advance();
                    return TokenKind::QuotedString(self.source[start..self.pos].to_string());
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Skip whitespace and `//` line comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_next_char() == Some('/') {
                        while let Some(c) = self.peek_char() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }
}
