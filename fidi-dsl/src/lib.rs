//! fidi request language: scanner, parser, and validator.
//!
//! One request document describes how a mock node responds, which peers it
//! knows about, and the downstream calls it fans out, each call carrying
//! its own nested request in the same language:
//!
//! ```text
//! [ response = 200, predelay = 10,
//!   .frontend [ hostname = "10.0.0.1", port = 8080 ],
//!   -> frontend sequence = 1 repeat = 2 [ response = 200 ]
//! ]
//! ```
//!
//! Architecture:
//! ```text
//! Request text
//!     ↓
//! Scanner (lazy tokens + verbatim payload capture)
//!     ↓
//! Parser (recursive descent, error recovery)
//!     ↓
//! RequestModel (attributes, node table, edges)
//!     ↓
//! Validator (semantic checks, total and pure)
//! ```
//!
//! The executor and the lint tool both consume the same model; this crate
//! knows nothing about HTTP.

pub mod lexer;
pub mod parser;
pub mod validator;

pub use lexer::{Scanner, Span, Token, TokenKind};
pub use parser::{parse, unquote, Attributes, EdgeDescriptor, ParseError, Parser, RequestModel};
pub use validator::{validate, Validation};
