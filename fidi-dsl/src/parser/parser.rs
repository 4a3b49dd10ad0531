//! Parser implementation

use super::model::*;
use crate::lexer::*;
use thiserror::Error;

/// A recoverable syntax diagnostic with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Recursive-descent parser for the request grammar.
///
/// ```text
/// request      := '[' attrs (',' attrs)* ']'
/// attrs        := attribute | node | edge
/// attribute    := ident '=' value
/// node         := '.' ident '[' attribute (',' attribute)* ','? ']'
/// edge         := '->' ident edge_qual* '[' BLOB ']'
/// edge_qual    := ident '=' integer
/// value        := string | integer | ident
/// ```
///
/// Parsing is total: a syntax error is recorded with its position, the
/// parser skips to the next `,` or `]` at the current bracket depth, and
/// resumes, so one pass reports every error in the document. The parser
/// drives the scanner one token at a time; an edge payload is never
/// tokenized, it is captured verbatim in the scanner's blob mode.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    errors: Vec<ParseError>,
    model: RequestModel,
}

impl<'a> Parser<'a> {
    /// Create a parser over the given source.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self {
            scanner,
            current,
            errors: Vec::new(),
            model: RequestModel::default(),
        }
    }

    /// Parse to end of input, returning the model and every diagnostic.
    pub fn parse(mut self) -> (RequestModel, Vec<ParseError>) {
        self.parse_request();
        (self.model, self.errors)
    }

    fn parse_request(&mut self) {
        if !self.check(&TokenKind::LBracket) {
            let msg = format!("expected '[' to open the request, found {}", self.current.kind);
            self.record(msg);
            return;
        }
        self.advance();

        loop {
            if let Err(err) = self.parse_entry() {
                self.errors.push(err);
                self.recover();
            }

            let closed = loop {
                match &self.current.kind {
                    TokenKind::Comma => {
                        self.advance();
                        break false;
                    }
                    TokenKind::RBracket => {
                        self.advance();
                        break true;
                    }
                    TokenKind::Eof => {
                        self.record("unexpected end of input inside request".to_string());
                        break true;
                    }
                    other => {
                        let msg = format!("expected ',' or ']', found {}", other);
                        self.record(msg);
                        self.recover();
                    }
                }
            };
            if closed {
                break;
            }
        }

        if !self.check(&TokenKind::Eof) {
            let msg = format!(
                "expected end of input after request, found {}",
                self.current.kind
            );
            self.record(msg);
        }
    }

    /// Parse one comma-separated request entry.
    fn parse_entry(&mut self) -> Result<(), ParseError> {
        match &self.current.kind {
            TokenKind::Dot => self.parse_node(),
            TokenKind::Arrow => self.parse_edge(),
            TokenKind::Identifier(_) => {
                let (key, value) = self.parse_attribute()?;
                self.model.top_attributes.insert(key, value);
                Ok(())
            }
            other => Err(self.error_here(format!(
                "expected an attribute, node, or edge, found {}",
                other
            ))),
        }
    }

    /// Parse `ident '=' value`.
    fn parse_attribute(&mut self) -> Result<(String, String), ParseError> {
        let key = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_value()?;
        Ok((key, value))
    }

    fn parse_value(&mut self) -> Result<String, ParseError> {
        let value = match &self.current.kind {
            TokenKind::QuotedString(s) | TokenKind::Integer(s) | TokenKind::Identifier(s) => {
                s.clone()
            }
            other => return Err(self.error_here(format!("expected a value, found {}", other))),
        };
        self.advance();
        Ok(value)
    }

    /// Parse a node declaration. Repeated declarations of the same name
    /// merge their attribute maps, later keys overriding earlier ones.
    fn parse_node(&mut self) -> Result<(), ParseError> {
        self.expect(&TokenKind::Dot)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LBracket)?;

        let mut attrs = Attributes::new();
        loop {
            let (key, value) = self.parse_attribute()?;
            attrs.insert(key, value);
            match &self.current.kind {
                TokenKind::Comma => {
                    self.advance();
                    if self.check(&TokenKind::RBracket) {
                        break; // trailing comma
                    }
                }
                TokenKind::RBracket => break,
                other => {
                    return Err(self.error_here(format!(
                        "expected ',' or ']' in node {}, found {}",
                        name, other
                    )))
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;

        let entry = self.model.nodes.entry(name).or_default();
        for (key, value) in attrs {
            entry.insert(key, value);
        }
        // The grammar makes hostnames quoted strings; the HTTP client wants
        // them bare. Canonical stored form has the quotes stripped.
        if let Some(hostname) = entry.get_mut("hostname") {
            hostname.retain(|c| c != '"');
        }
        Ok(())
    }

    /// Parse an edge declaration with optional repeat/sequence qualifiers
    /// and a verbatim payload.
    fn parse_edge(&mut self) -> Result<(), ParseError> {
        self.expect(&TokenKind::Arrow)?;
        let destination = self.expect_identifier()?;

        let mut repeat = 1i64;
        let mut sequence = 1i64;
        while matches!(self.current.kind, TokenKind::Identifier(_)) {
            let qual = self.expect_identifier()?;
            self.expect(&TokenKind::Eq)?;
            let raw = match &self.current.kind {
                TokenKind::Integer(s) => s.clone(),
                other => {
                    return Err(self.error_here(format!(
                        "expected an integer for edge qualifier {}, found {}",
                        qual, other
                    )))
                }
            };
            self.advance();
            let value: i64 = raw.parse().map_err(|_| {
                self.error_here(format!("edge qualifier {} value {} is out of range", qual, raw))
            })?;
            match qual.as_str() {
                "repeat" => repeat = value,
                "sequence" => sequence = value,
                _ => {
                    return Err(self.error_here(format!(
                        "unknown edge qualifier '{}', expected repeat or sequence",
                        qual
                    )))
                }
            }
        }

        if !self.check(&TokenKind::LBracket) {
            return Err(self.error_here(format!(
                "expected '[' to open the payload for {}, found {}",
                destination, self.current.kind
            )));
        }
        // Do not advance past the bracket through the token stream: the
        // payload is opaque and must be captured verbatim.
        let payload = match self.scanner.scan_blob() {
            Ok(blob) => blob,
            Err(token) => {
                let err = ParseError {
                    message: format!("payload for {} is unterminated", destination),
                    line: token.span.line,
                    column: token.span.column,
                };
                self.current = Token {
                    kind: TokenKind::Eof,
                    span: token.span,
                };
                return Err(err);
            }
        };
        self.current = self.scanner.next_token();

        self.model.destinations.insert(destination.clone());
        self.model.edges.push(EdgeDescriptor {
            destination,
            repeat,
            sequence,
            payload,
        });
        Ok(())
    }

    /// Skip to the next `,` or `]` at the bracket depth where the error
    /// occurred, leaving that token current.
    fn recover(&mut self) {
        let mut depth = 0usize;
        loop {
            match &self.current.kind {
                TokenKind::Comma if depth == 0 => return,
                TokenKind::RBracket if depth == 0 => return,
                TokenKind::Eof => return,
                TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBracket => {
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn advance(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.scanner.next_token())
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("expected {}, found {}", kind, self.current.kind)))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected an identifier, found {}", other))),
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        ParseError {
            message,
            line: self.current.span.line,
            column: self.current.span.column,
        }
    }

    fn record(&mut self, message: String) {
        let err = self.error_here(message);
        self.errors.push(err);
    }
}

/// Parse one request document.
pub fn parse(source: &str) -> (RequestModel, Vec<ParseError>) {
    Parser::new(source).parse()
}
