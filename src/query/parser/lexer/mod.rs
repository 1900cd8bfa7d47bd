//! Lexer module for the MATCH parser

pub mod lexer;

pub use lexer::Lexer;
