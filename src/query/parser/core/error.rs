//! Parse errors
//!
//! Every lexer and parser failure carries the position it was detected at.

use std::fmt;

use crate::core::error::{DBError, QueryError};
use crate::query::parser::core::token::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed input at the character level.
    LexicalError,
    /// Well-formed tokens in an unexpected order.
    SyntaxError,
    /// Token found where another one was required.
    UnexpectedToken,
    /// Input ended too early.
    UnexpectedEof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn lexical_error(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::LexicalError, message, position)
    }

    pub fn syntax_error(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::SyntaxError, message, position)
    }

    pub fn unexpected_token(expected: &str, found: impl fmt::Display, position: Position) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            format!("expected {}, found {}", expected, found),
            position,
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        QueryError::parse_error_at(err.message, err.position.line, err.position.column)
    }
}

impl From<ParseError> for DBError {
    fn from(err: ParseError) -> Self {
        DBError::Query(err.into())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
