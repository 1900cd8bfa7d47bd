//! Token definitions for the MATCH parser
//!
//! This module defines the lexical tokens used by the parser.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
    /// Byte offsets of the token in the query text.
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, position: Position, start: usize, end: usize) -> Self {
        Self {
            kind,
            lexeme,
            position,
            start,
            end,
        }
    }

    /// Whether the token can be used as a name (identifier or keyword lexeme).
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            kind if kind.is_keyword() => Some(&self.lexeme),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Match,
    Return,
    Not,
    And,
    Or,
    As,
    Distinct,
    Group,
    Order,
    By,
    Asc,
    Desc,
    Skip,
    Offset,
    Limit,
    True,
    False,
    Null,
    Is,
    In,
    Contains,
    Matches,

    // Literals and names
    Identifier(String),
    /// `$name`
    ContextVariable(String),
    /// `@name`
    RecordAttribute(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    /// `->`
    Arrow,
    /// `<-`
    LeftArrow,

    Eof,
}

impl TokenKind {
    /// Looks up a keyword, case-insensitively.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "MATCH" => TokenKind::Match,
            "RETURN" => TokenKind::Return,
            "NOT" => TokenKind::Not,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "AS" => TokenKind::As,
            "DISTINCT" => TokenKind::Distinct,
            "GROUP" => TokenKind::Group,
            "ORDER" => TokenKind::Order,
            "BY" => TokenKind::By,
            "ASC" => TokenKind::Asc,
            "DESC" => TokenKind::Desc,
            "SKIP" => TokenKind::Skip,
            "OFFSET" => TokenKind::Offset,
            "LIMIT" => TokenKind::Limit,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "NULL" => TokenKind::Null,
            "IS" => TokenKind::Is,
            "IN" => TokenKind::In,
            "CONTAINS" => TokenKind::Contains,
            "MATCHES" => TokenKind::Matches,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Match
                | TokenKind::Return
                | TokenKind::Not
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::As
                | TokenKind::Distinct
                | TokenKind::Group
                | TokenKind::Order
                | TokenKind::By
                | TokenKind::Asc
                | TokenKind::Desc
                | TokenKind::Skip
                | TokenKind::Offset
                | TokenKind::Limit
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Is
                | TokenKind::In
                | TokenKind::Contains
                | TokenKind::Matches
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::ContextVariable(name) => write!(f, "'${}'", name),
            TokenKind::RecordAttribute(name) => write!(f, "'@{}'", name),
            TokenKind::IntegerLiteral(i) => write!(f, "integer {}", i),
            TokenKind::FloatLiteral(x) => write!(f, "float {}", x),
            TokenKind::StringLiteral(s) => write!(f, "string '{}'", s),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "{:?}", other),
        }
    }
}
