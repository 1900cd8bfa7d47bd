pub mod error;
pub mod token;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use token::{Position, Token, TokenKind};
