//! Query parser for MATCH statements
//!
//! Turns query text into the syntax tree in `ast`; the pattern compiler
//! takes it from there.

pub mod ast;
pub mod core;
pub mod lexer;
pub mod parser;

pub use core::{ParseError, ParseErrorKind, Token, TokenKind};
pub use parser::Parser;

use crate::core::error::DBResult;
use ast::MatchStatement;

/// Parses a complete MATCH statement.
pub fn parse_match(query: &str) -> DBResult<MatchStatement> {
    let mut parser = Parser::new(query)?;
    Ok(parser.parse_statement()?)
}
