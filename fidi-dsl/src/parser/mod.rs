//! Parser for the fidi request language.

mod model;
mod parser;

pub use model::{unquote, Attributes, EdgeDescriptor, RequestModel};
pub use parser::{parse, ParseError, Parser};
