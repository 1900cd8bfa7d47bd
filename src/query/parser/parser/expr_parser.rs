//! 表达式解析模块
//!
//! 按优先级自顶向下解析：OR → AND → NOT → 比较 → 加减 → 乘除 → 一元 → 后缀 → 基本项。

use crate::core::types::expression::Expression;
use crate::core::types::operators::{BinaryOperator, UnaryOperator};
use crate::core::value::Value;
use crate::query::parser::core::{ParseError, ParseErrorKind, ParseResult, TokenKind as Tk};
use crate::query::parser::parser::Parser;

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and_expression()?;
        while self.match_token(&Tk::Or) {
            let right = self.parse_and_expression()?;
            left = Expression::binary(left, BinaryOperator::Or, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not_expression()?;
        while self.match_token(&Tk::And) {
            let right = self.parse_not_expression()?;
            left = Expression::binary(left, BinaryOperator::And, right);
        }
        Ok(left)
    }

    fn parse_not_expression(&mut self) -> ParseResult<Expression> {
        if self.match_token(&Tk::Not) {
            let operand = self.parse_not_expression()?;
            Ok(Expression::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_comparison_expression()
        }
    }

    fn parse_comparison_expression(&mut self) -> ParseResult<Expression> {
        let left = self.parse_additive_expression()?;

        let op = match self.current_token().kind {
            Tk::Eq | Tk::EqEq => BinaryOperator::Equal,
            Tk::NotEq => BinaryOperator::NotEqual,
            Tk::Lt => BinaryOperator::LessThan,
            Tk::Le => BinaryOperator::LessThanOrEqual,
            Tk::Gt => BinaryOperator::GreaterThan,
            Tk::Ge => BinaryOperator::GreaterThanOrEqual,
            Tk::In => BinaryOperator::In,
            Tk::Contains => BinaryOperator::Contains,
            Tk::Matches => BinaryOperator::Matches,
            // `a<-1` 被词法分析为 `<-`
            Tk::LeftArrow => {
                self.next_token();
                let right = self.parse_additive_expression()?;
                let negated = Expression::Unary {
                    op: UnaryOperator::Minus,
                    operand: Box::new(right),
                };
                return Ok(Expression::binary(left, BinaryOperator::LessThan, negated));
            }
            Tk::Is => {
                self.next_token();
                let negated = self.match_token(&Tk::Not);
                self.expect_token(Tk::Null, "NULL")?;
                return Ok(Expression::IsNull {
                    operand: Box::new(left),
                    negated,
                });
            }
            _ => return Ok(left),
        };
        self.next_token();
        let right = self.parse_additive_expression()?;
        Ok(Expression::binary(left, op, right))
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative_expression()?;
        loop {
            let op = match self.current_token().kind {
                Tk::Plus => BinaryOperator::Add,
                Tk::Minus => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.next_token();
            let right = self.parse_multiplicative_expression()?;
            left = Expression::binary(left, op, right);
        }
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expression()?;
        loop {
            let op = match self.current_token().kind {
                Tk::Star => BinaryOperator::Multiply,
                Tk::Slash => BinaryOperator::Divide,
                Tk::Percent => BinaryOperator::Modulo,
                _ => return Ok(left),
            };
            self.next_token();
            let right = self.parse_unary_expression()?;
            left = Expression::binary(left, op, right);
        }
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        match self.current_token().kind {
            Tk::Minus => {
                self.next_token();
                let operand = self.parse_unary_expression()?;
                // 负数字面量直接折叠
                Ok(match operand {
                    Expression::Literal(Value::Int(n)) => Expression::Literal(Value::Int(-n)),
                    Expression::Literal(Value::Float(f)) => Expression::Literal(Value::Float(-f)),
                    other => Expression::Unary {
                        op: UnaryOperator::Minus,
                        operand: Box::new(other),
                    },
                })
            }
            Tk::Plus => {
                self.next_token();
                self.parse_unary_expression()
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// 属性访问、方法调用与下标
    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary_expression()?;
        loop {
            if self.match_token(&Tk::Dot) {
                let name = match &self.current_token().kind {
                    Tk::RecordAttribute(attr) => {
                        let name = format!("@{}", attr);
                        self.next_token();
                        name
                    }
                    _ => self.expect_name("property or method name")?,
                };
                if self.match_token(&Tk::LParen) {
                    let args = self.parse_call_arguments()?;
                    expr = Expression::method(expr, name, args);
                } else {
                    expr = Expression::property(expr, name);
                }
            } else if self.match_token(&Tk::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(Tk::RBracket, "']'")?;
                expr = Expression::Subscript {
                    collection: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let token = self.current_token().clone();
        let expr = match token.kind {
            Tk::IntegerLiteral(n) => Expression::literal(n),
            Tk::FloatLiteral(f) => Expression::literal(f),
            Tk::StringLiteral(s) => Expression::literal(s),
            Tk::True => Expression::literal(true),
            Tk::False => Expression::literal(false),
            Tk::Null => Expression::Literal(Value::Null),
            Tk::ContextVariable(name) => Expression::ContextVariable(name),
            Tk::RecordAttribute(name) => Expression::Identifier(format!("@{}", name)),
            Tk::LParen => {
                self.next_token();
                let inner = self.parse_expression()?;
                self.expect_token(Tk::RParen, "')'")?;
                return Ok(inner);
            }
            Tk::LBracket => {
                self.next_token();
                let mut elements = Vec::new();
                if !self.match_token(&Tk::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if self.match_token(&Tk::Comma) {
                            continue;
                        }
                        self.expect_token(Tk::RBracket, "']'")?;
                        break;
                    }
                }
                return Ok(Expression::List(elements));
            }
            Tk::Identifier(name) => {
                self.next_token();
                if self.match_token(&Tk::LParen) {
                    let args = self.parse_call_arguments()?;
                    return Ok(Expression::function(name, args));
                }
                return Ok(Expression::Identifier(name));
            }
            // `in('ManagerOf')` 这类与关键字同名的函数
            ref kind if kind.is_keyword() && self.peek_token(1).kind == Tk::LParen => {
                self.next_token();
                self.next_token();
                let args = self.parse_call_arguments()?;
                return Ok(Expression::function(token.lexeme.clone(), args));
            }
            Tk::Eof => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedEof,
                    "unexpected end of input in expression",
                    token.position,
                ))
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.next_token();
        Ok(expr)
    }

    /// 左括号之后的实参列表，消费右括号
    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.match_token(&Tk::RParen) {
            return Ok(args);
        }
        if self.check(&Tk::Star) && self.peek_token(1).kind == Tk::RParen {
            self.next_token();
            self.next_token();
            return Ok(vec![Expression::Wildcard]);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.match_token(&Tk::Comma) {
                continue;
            }
            self.expect_token(Tk::RParen, "')'")?;
            return Ok(args);
        }
    }
}
