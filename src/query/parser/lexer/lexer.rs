//! Lexer implementation for the MATCH parser
//!
//! Converts a query string into a token vector, tracking line/column for
//! error reporting and byte offsets so the parser can recover source text.

use crate::query::parser::core::{ParseError, ParseResult, Position, Token, TokenKind as Tk};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the whole input; the last token is always `Eof`.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == Tk::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        self.chars.get(self.pos + 1).map(|(_, c)| *c)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.read_char();
                }
                // `//` line comment
                Some('/') if self.peek_next_char() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.read_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace_and_comments();
        let position = self.position();
        let start = self.byte_offset();

        let Some(ch) = self.read_char() else {
            return Ok(Token::new(Tk::Eof, String::new(), position, start, start));
        };

        let kind = match ch {
            '{' => Tk::LBrace,
            '}' => Tk::RBrace,
            '(' => Tk::LParen,
            ')' => Tk::RParen,
            '[' => Tk::LBracket,
            ']' => Tk::RBracket,
            ',' => Tk::Comma,
            ':' => Tk::Colon,
            '.' => Tk::Dot,
            '+' => Tk::Plus,
            '*' => Tk::Star,
            '/' => Tk::Slash,
            '%' => Tk::Percent,
            '-' => {
                if self.peek_char() == Some('>') {
                    self.read_char();
                    Tk::Arrow
                } else {
                    Tk::Minus
                }
            }
            '=' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Tk::EqEq
                } else {
                    Tk::Eq
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Tk::NotEq
                } else {
                    return Err(ParseError::lexical_error("unexpected character '!'", position));
                }
            }
            '<' => match self.peek_char() {
                Some('=') => {
                    self.read_char();
                    Tk::Le
                }
                Some('>') => {
                    self.read_char();
                    Tk::NotEq
                }
                Some('-') => {
                    self.read_char();
                    Tk::LeftArrow
                }
                _ => Tk::Lt,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Tk::Ge
                } else {
                    Tk::Gt
                }
            }
            '\'' | '"' => Tk::StringLiteral(self.read_string(ch, position)?),
            '`' => Tk::Identifier(self.read_quoted_identifier(position)?),
            '$' => {
                let name = self.read_word();
                if name.is_empty() {
                    return Err(ParseError::lexical_error("expected a name after '$'", position));
                }
                Tk::ContextVariable(name)
            }
            '@' => {
                let name = self.read_word();
                if name.is_empty() {
                    return Err(ParseError::lexical_error("expected a name after '@'", position));
                }
                Tk::RecordAttribute(name)
            }
            c if c.is_ascii_digit() => self.read_number(c, position)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                word.push_str(&self.read_word());
                Tk::keyword(&word).unwrap_or(Tk::Identifier(word))
            }
            other => {
                return Err(ParseError::lexical_error(
                    format!("unexpected character '{}'", other),
                    position,
                ))
            }
        };

        let end = self.byte_offset();
        let lexeme = self.input.get(start..end).unwrap_or_default().to_string();
        Ok(Token::new(kind, lexeme, position, start, end))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.read_char();
            } else {
                break;
            }
        }
        word
    }

    fn read_number(&mut self, first: char, position: Position) -> ParseResult<Tk> {
        let mut text = String::from(first);
        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.read_char();
            } else if c == '.'
                && !is_float
                && self.peek_next_char().is_some_and(|n| n.is_ascii_digit())
            {
                is_float = true;
                text.push(c);
                self.read_char();
            } else if (c == 'e' || c == 'E')
                && self
                    .peek_next_char()
                    .is_some_and(|n| n.is_ascii_digit() || n == '-' || n == '+')
            {
                is_float = true;
                text.push(c);
                self.read_char();
                if let Some(sign) = self.peek_char().filter(|s| *s == '-' || *s == '+') {
                    text.push(sign);
                    self.read_char();
                }
            } else {
                break;
            }
        }
        if is_float {
            text.parse::<f64>()
                .map(Tk::FloatLiteral)
                .map_err(|_| ParseError::lexical_error(format!("invalid number '{}'", text), position))
        } else {
            text.parse::<i64>().map(Tk::IntegerLiteral).map_err(|_| {
                ParseError::lexical_error(format!("integer literal '{}' out of range", text), position)
            })
        }
    }

    fn read_string(&mut self, quote: char, position: Position) -> ParseResult<String> {
        let mut value = String::new();
        loop {
            match self.read_char() {
                None => {
                    return Err(ParseError::lexical_error("unterminated string literal", position))
                }
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.read_char() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        return Err(ParseError::lexical_error(
                            "unterminated string literal",
                            position,
                        ))
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn read_quoted_identifier(&mut self, position: Position) -> ParseResult<String> {
        let mut name = String::new();
        loop {
            match self.read_char() {
                None => {
                    return Err(ParseError::lexical_error(
                        "unterminated quoted identifier",
                        position,
                    ))
                }
                Some('`') => return Ok(name),
                Some(c) => name.push(c),
            }
        }
    }
}
