//! Recursive-descent parser for MATCH statements
//!
//! `Parser` owns the token vector and the helpers shared by the statement,
//! pattern and expression sub-parsers (`pattern_parser.rs`, `expr_parser.rs`).

use crate::query::parser::ast::{
    MatchStatement, OrderItem, PseudoTarget, ReturnClause, ReturnItem, ReturnTarget,
};
use crate::query::parser::core::{ParseError, ParseResult, Token, TokenKind as Tk};
use crate::query::parser::lexer::Lexer;

pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            input,
            tokens,
            pos: 0,
        })
    }

    // ==================== token helpers ====================

    pub(crate) fn current_token(&self) -> &Token {
        // the lexer always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_token(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    pub(crate) fn next_token(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// End offset of the most recently consumed token.
    pub(crate) fn previous_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].end
        }
    }

    pub(crate) fn check(&self, kind: &Tk) -> bool {
        &self.current_token().kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: &Tk) -> bool {
        if self.check(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(&mut self, kind: Tk, what: &str) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Identifier, or a keyword used as a plain name.
    pub(crate) fn expect_name(&mut self, what: &str) -> ParseResult<String> {
        match self.current_token().as_name() {
            Some(name) => {
                let name = name.to_string();
                self.next_token();
                Ok(name)
            }
            None => Err(self.unexpected(what)),
        }
    }

    pub(crate) fn unexpected(&self, what: &str) -> ParseError {
        let token = self.current_token();
        ParseError::unexpected_token(what, &token.kind, token.position)
    }

    pub(crate) fn source_text(&self, start: usize, end: usize) -> String {
        self.input.get(start..end).unwrap_or_default().trim().to_string()
    }

    // ==================== statement ====================

    /// `MATCH pattern (, [NOT] pattern)* RETURN ...`
    pub fn parse_statement(&mut self) -> ParseResult<MatchStatement> {
        self.expect_token(Tk::Match, "MATCH")?;

        let mut patterns = vec![self.parse_match_expression()?];
        let mut not_patterns = Vec::new();
        while self.match_token(&Tk::Comma) {
            if self.match_token(&Tk::Not) {
                not_patterns.push(self.parse_match_expression()?);
            } else {
                patterns.push(self.parse_match_expression()?);
            }
        }

        self.expect_token(Tk::Return, "RETURN")?;
        let return_clause = self.parse_return_clause()?;

        if !self.check(&Tk::Eof) {
            return Err(self.unexpected("end of query"));
        }

        Ok(MatchStatement {
            patterns,
            not_patterns,
            return_clause,
        })
    }

    fn is_clause_boundary(token: &Token) -> bool {
        matches!(
            token.kind,
            Tk::Eof | Tk::Group | Tk::Order | Tk::Skip | Tk::Offset | Tk::Limit
        )
    }

    fn parse_return_clause(&mut self) -> ParseResult<ReturnClause> {
        let distinct = self.match_token(&Tk::Distinct);

        let pseudo = match &self.current_token().kind {
            Tk::ContextVariable(name) => PseudoTarget::from_name(name),
            _ => None,
        };
        let target = match pseudo {
            Some(p) if Self::is_clause_boundary(self.peek_token(1)) => {
                self.next_token();
                ReturnTarget::Pseudo(p)
            }
            _ => ReturnTarget::Items(self.parse_return_items()?),
        };

        let mut clause = ReturnClause {
            distinct,
            target,
            group_by: Vec::new(),
            order_by: Vec::new(),
            skip: None,
            limit: None,
        };
        let mut seen_group = false;
        let mut seen_order = false;
        let mut seen_skip = false;
        let mut seen_limit = false;

        loop {
            let token = self.current_token().clone();
            let duplicate = |seen: bool| -> ParseResult<()> {
                if seen {
                    Err(ParseError::syntax_error(
                        format!("duplicate {} clause", token.lexeme.to_uppercase()),
                        token.position,
                    ))
                } else {
                    Ok(())
                }
            };
            match token.kind {
                Tk::Group => {
                    duplicate(seen_group)?;
                    seen_group = true;
                    self.next_token();
                    self.expect_token(Tk::By, "BY")?;
                    clause.group_by.push(self.parse_expression()?);
                    while self.match_token(&Tk::Comma) {
                        clause.group_by.push(self.parse_expression()?);
                    }
                }
                Tk::Order => {
                    duplicate(seen_order)?;
                    seen_order = true;
                    self.next_token();
                    self.expect_token(Tk::By, "BY")?;
                    clause.order_by.push(self.parse_order_item()?);
                    while self.match_token(&Tk::Comma) {
                        clause.order_by.push(self.parse_order_item()?);
                    }
                }
                Tk::Skip | Tk::Offset => {
                    duplicate(seen_skip)?;
                    seen_skip = true;
                    self.next_token();
                    clause.skip = self.parse_row_count()?;
                }
                Tk::Limit => {
                    duplicate(seen_limit)?;
                    seen_limit = true;
                    self.next_token();
                    clause.limit = self.parse_row_count()?;
                }
                _ => break,
            }
        }
        Ok(clause)
    }

    fn parse_return_items(&mut self) -> ParseResult<Vec<ReturnItem>> {
        let mut items = vec![self.parse_return_item()?];
        while self.match_token(&Tk::Comma) {
            items.push(self.parse_return_item()?);
        }
        Ok(items)
    }

    fn parse_return_item(&mut self) -> ParseResult<ReturnItem> {
        let start = self.current_token().start;
        let expression = self.parse_expression()?;
        let text = self.source_text(start, self.previous_end());
        let alias = if self.match_token(&Tk::As) {
            Some(self.expect_name("column alias")?)
        } else {
            None
        };
        Ok(ReturnItem {
            expression,
            alias,
            text,
        })
    }

    fn parse_order_item(&mut self) -> ParseResult<OrderItem> {
        let expression = self.parse_expression()?;
        let descending = if self.match_token(&Tk::Desc) {
            true
        } else {
            self.match_token(&Tk::Asc);
            false
        };
        Ok(OrderItem {
            expression,
            descending,
        })
    }

    /// SKIP/LIMIT operand; a negative count disables the clause.
    fn parse_row_count(&mut self) -> ParseResult<Option<u64>> {
        let negative = self.match_token(&Tk::Minus);
        match self.current_token().kind {
            Tk::IntegerLiteral(n) => {
                self.next_token();
                Ok(if negative { None } else { Some(n as u64) })
            }
            _ => Err(self.unexpected("row count")),
        }
    }
}
