//! Pattern parsing for MATCH
//!
//! Handles the node filter block `{...}`, the method traversal forms
//! (`.out()`, `.outE(){...}.inV()`) and the arrow forms (`-label->`,
//! `<-label-`, `-label-`) including arrow quantifiers.

use crate::core::{Direction, VertexId};
use crate::query::parser::ast::{
    ArrowQuantifier, EdgeSyntax, MatchExpression, MatchFilter, MatchPathItem,
};
use crate::query::parser::core::{ParseError, ParseResult, TokenKind as Tk};
use crate::query::parser::parser::Parser;

impl<'a> Parser<'a> {
    /// `{origin}` followed by any number of traversal steps.
    pub(crate) fn parse_match_expression(&mut self) -> ParseResult<MatchExpression> {
        let origin = self.parse_match_filter()?;
        let mut items = Vec::new();
        loop {
            match self.current_token().kind {
                Tk::Dot => items.push(self.parse_method_item()?),
                Tk::Minus | Tk::LeftArrow => items.push(self.parse_arrow_item()?),
                _ => break,
            }
        }
        Ok(MatchExpression { origin, items })
    }

    pub(crate) fn parse_match_filter(&mut self) -> ParseResult<MatchFilter> {
        let position = self.expect_token(Tk::LBrace, "'{'")?.position;
        let mut filter = MatchFilter {
            position,
            ..MatchFilter::default()
        };
        if self.match_token(&Tk::RBrace) {
            return Ok(filter);
        }

        loop {
            let key_token = self.current_token().clone();
            let key = self.expect_name("filter key")?;
            self.expect_token(Tk::Colon, "':'")?;

            let duplicate =
                || ParseError::syntax_error(format!("duplicate filter key '{}'", key), key_token.position);

            match key.to_ascii_lowercase().as_str() {
                "class" => {
                    if filter.class.is_some() {
                        return Err(duplicate());
                    }
                    filter.class = Some(self.parse_name_or_string("class name")?);
                }
                "rid" => {
                    if filter.rid.is_some() {
                        return Err(duplicate());
                    }
                    filter.rid = Some(self.parse_rid()?);
                }
                "as" => {
                    if filter.alias.is_some() {
                        return Err(duplicate());
                    }
                    filter.alias = Some(self.parse_name_or_string("alias")?);
                }
                "where" => {
                    if filter.where_clause.is_some() {
                        return Err(duplicate());
                    }
                    filter.where_clause = Some(self.parse_expression()?);
                }
                "while" => {
                    if filter.while_clause.is_some() {
                        return Err(duplicate());
                    }
                    filter.while_clause = Some(self.parse_expression()?);
                }
                "maxdepth" => {
                    if filter.max_depth.is_some() {
                        return Err(duplicate());
                    }
                    filter.max_depth = Some(self.parse_unsigned("maxDepth value")?);
                }
                "optional" => {
                    filter.optional = match self.current_token().kind {
                        Tk::True => true,
                        Tk::False => false,
                        _ => return Err(self.unexpected("true or false")),
                    };
                    self.next_token();
                }
                "depthalias" => {
                    if filter.depth_alias.is_some() {
                        return Err(duplicate());
                    }
                    filter.depth_alias = Some(self.parse_name_or_string("depth alias")?);
                }
                "pathalias" => {
                    if filter.path_alias.is_some() {
                        return Err(duplicate());
                    }
                    filter.path_alias = Some(self.parse_name_or_string("path alias")?);
                }
                _ => {
                    return Err(ParseError::syntax_error(
                        format!("unknown filter key '{}'", key),
                        key_token.position,
                    ))
                }
            }

            if self.match_token(&Tk::Comma) {
                continue;
            }
            self.expect_token(Tk::RBrace, "'}'")?;
            return Ok(filter);
        }
    }

    fn parse_name_or_string(&mut self, what: &str) -> ParseResult<String> {
        if let Tk::StringLiteral(s) = &self.current_token().kind {
            let s = s.clone();
            self.next_token();
            return Ok(s);
        }
        self.expect_name(what)
    }

    /// A record id, either `'#12'` or a bare `12`.
    fn parse_rid(&mut self) -> ParseResult<VertexId> {
        let token = self.current_token().clone();
        let id = match &token.kind {
            Tk::IntegerLiteral(n) => VertexId::try_from(*n).ok(),
            Tk::StringLiteral(s) => s.strip_prefix('#').unwrap_or(s).parse::<VertexId>().ok(),
            _ => None,
        };
        match id {
            Some(id) => {
                self.next_token();
                Ok(id)
            }
            None => Err(ParseError::syntax_error(
                "expected a record id such as '#12'",
                token.position,
            )),
        }
    }

    fn parse_unsigned(&mut self, what: &str) -> ParseResult<u32> {
        match self.current_token().kind {
            Tk::IntegerLiteral(n) if n >= 0 && n <= u32::MAX as i64 => {
                self.next_token();
                Ok(n as u32)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Label list inside `(...)`, the opening paren already consumed.
    fn parse_label_arguments(&mut self) -> ParseResult<Vec<String>> {
        let mut labels = Vec::new();
        if self.match_token(&Tk::RParen) {
            return Ok(labels);
        }
        loop {
            labels.push(self.parse_name_or_string("edge label")?);
            if self.match_token(&Tk::Comma) {
                continue;
            }
            self.expect_token(Tk::RParen, "')'")?;
            return Ok(labels);
        }
    }

    fn parse_optional_filter(&mut self) -> ParseResult<MatchFilter> {
        if self.check(&Tk::LBrace) {
            self.parse_match_filter()
        } else {
            Ok(MatchFilter {
                position: self.current_token().position,
                ..MatchFilter::default()
            })
        }
    }

    /// `.out('l'){...}` or `.outE('l'){...}.inV(){...}`
    fn parse_method_item(&mut self) -> ParseResult<MatchPathItem> {
        let position = self.expect_token(Tk::Dot, "'.'")?.position;
        let method_token = self.current_token().clone();
        let method = self.expect_name("traversal method")?;
        self.expect_token(Tk::LParen, "'('")?;
        let labels = self.parse_label_arguments()?;

        let (direction, edge_form) = match method.to_ascii_lowercase().as_str() {
            "out" => (Direction::Out, false),
            "in" => (Direction::In, false),
            "both" => (Direction::Both, false),
            "oute" => (Direction::Out, true),
            "ine" => (Direction::In, true),
            "bothe" => (Direction::Both, true),
            _ => {
                return Err(ParseError::syntax_error(
                    format!("unknown traversal method '{}'", method),
                    method_token.position,
                ))
            }
        };

        if !edge_form {
            let filter = self.parse_optional_filter()?;
            return Ok(MatchPathItem {
                syntax: EdgeSyntax::Method,
                direction,
                labels,
                quantifier: None,
                edge_filter: None,
                filter,
                position,
            });
        }

        let edge_filter = self.parse_optional_filter()?;
        self.expect_token(Tk::Dot, "'.'")?;
        let vertex_token = self.current_token().clone();
        let vertex_method = self.expect_name("inV/outV/bothV")?;
        let expected = match direction {
            Direction::Out => "inv",
            Direction::In => "outv",
            Direction::Both => "bothv",
        };
        if vertex_method.to_ascii_lowercase() != expected {
            return Err(ParseError::syntax_error(
                format!("'{}' cannot follow '{}'", vertex_method, method),
                vertex_token.position,
            ));
        }
        self.expect_token(Tk::LParen, "'('")?;
        self.expect_token(Tk::RParen, "')'")?;
        let filter = self.parse_optional_filter()?;

        Ok(MatchPathItem {
            syntax: EdgeSyntax::EdgeThenVertex,
            direction,
            labels,
            quantifier: None,
            edge_filter: Some(edge_filter),
            filter,
            position,
        })
    }

    /// `-label->`, `<-label-`, `-label-`, each with an optional quantifier.
    fn parse_arrow_item(&mut self) -> ParseResult<MatchPathItem> {
        let position = self.current_token().position;
        let incoming = if self.match_token(&Tk::LeftArrow) {
            true
        } else {
            self.expect_token(Tk::Minus, "'-'")?;
            false
        };

        let labels = match &self.current_token().kind {
            Tk::Identifier(name) => {
                let name = name.clone();
                self.next_token();
                vec![name]
            }
            _ => Vec::new(),
        };
        let quantifier = self.parse_arrow_quantifier()?;

        let direction = if incoming {
            self.expect_token(Tk::Minus, "'-'")?;
            Direction::In
        } else if self.match_token(&Tk::Arrow) {
            Direction::Out
        } else if self.match_token(&Tk::Minus) {
            Direction::Both
        } else {
            return Err(self.unexpected("'->' or '-'"));
        };

        let filter = self.parse_optional_filter()?;
        Ok(MatchPathItem {
            syntax: EdgeSyntax::Arrow,
            direction,
            labels,
            quantifier,
            edge_filter: None,
            filter,
            position,
        })
    }

    /// `*`, `+`, `{n}`, `{m,n}` or `{m,}` written directly after the label.
    fn parse_arrow_quantifier(&mut self) -> ParseResult<Option<ArrowQuantifier>> {
        match self.current_token().kind {
            Tk::Star => {
                self.next_token();
                Ok(Some(ArrowQuantifier::Star))
            }
            Tk::Plus => {
                self.next_token();
                Ok(Some(ArrowQuantifier::Plus))
            }
            Tk::LBrace if matches!(self.peek_token(1).kind, Tk::IntegerLiteral(_)) => {
                self.next_token();
                let min = self.parse_unsigned("minimum repetition")?;
                let max = if self.match_token(&Tk::Comma) {
                    if self.check(&Tk::RBrace) {
                        None
                    } else {
                        Some(self.parse_unsigned("maximum repetition")?)
                    }
                } else {
                    Some(min)
                };
                self.expect_token(Tk::RBrace, "'}'")?;
                Ok(Some(ArrowQuantifier::Range { min, max }))
            }
            _ => Ok(None),
        }
    }
}
