// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recursive-descent parser for template token streams
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! template    := (STRING | '$' expression | <skipped>)* EOF
//! expression  := comparison ('?' expression ':' expression)?
//! comparison  := additive (('==' | '!=' | '<' | '<=' | '>' | '>=') additive)*
//! additive    := term (('+' | '-') term)*
//! term        := factor (('*' | '/') factor)*
//! factor      := '$' expression
//!              | IDENT '(' args? ')' accessor*
//!              | IDENT accessor*
//!              | NUMBER | STRING | '(' expression ')' | array
//! args        := arg (',' arg)*
//! arg         := NUMBER | STRING | '$' expression | array | IDENT
//! array       := '[' args? ']'
//! accessor    := '.' IDENT | '[' (NUMBER | IDENT | '$' expression) ']'
//! ```
//!
//! A bare `IDENT` in an argument list is a string literal, while a bare
//! `IDENT` inside an index is a variable reference. A `$` in operand
//! position opens a whole expression, so `$a - $b - 1` is `a - (b - 1)`.
//!
//! Nesting is budgeted: every nested expression, array literal and binary
//! operator takes one level, and going past the limit fails with
//! [`ParseError::NestingTooDeep`] before the AST gets deep enough to
//! exhaust the stack.

use super::DEFAULT_MAX_EXPRESSION_DEPTH;
use super::error::{ParseError, ParseResult};
use super::tokenizer::{Token, TokenKind};
use crate::ast::{Accessor, BinaryOperator, ExpressionNode, TemplateNode, TemplatePart};
use crate::model::Value;
use smallvec::SmallVec;

/// Parser over a token stream ending in [`TokenKind::EndOfInput`]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over the given tokens
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_max_depth(tokens, DEFAULT_MAX_EXPRESSION_DEPTH)
    }

    /// Create a parser with an explicit nesting budget
    pub fn with_max_depth(tokens: &'a [Token], max_depth: usize) -> Self {
        let end = tokens.last().map_or(0, |t| t.position);
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::EndOfInput, "", end),
            depth: 0,
            max_depth,
        }
    }

    /// Parse a full template: text runs and `$` expressions
    pub fn parse_template(&mut self) -> ParseResult<TemplateNode> {
        let mut parts = Vec::new();
        while !self.check(TokenKind::EndOfInput) {
            match self.current().kind {
                TokenKind::StringLiteral => {
                    parts.push(TemplatePart::Text(self.advance().text));
                }
                TokenKind::Dollar => {
                    parts.push(TemplatePart::Expression(self.parse_dollar_expression()?));
                }
                _ => {
                    let stray = self.advance();
                    log::trace!(
                        "skipping stray {} token '{}' at {}",
                        stray.kind,
                        stray.text,
                        stray.position
                    );
                }
            }
        }
        Ok(TemplateNode::new(parts))
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Return the current token and move past it (never past the end)
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::EndOfInput => token.kind.describe().to_string(),
            kind => format!("{kind} '{}'", token.text),
        };
        ParseError::unexpected(expected, found, token.position)
    }

    /// Take one nesting level, failing once the budget is spent
    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
                position: self.current().position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one level deeper; levels taken inside are released on return
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let depth = self.depth;
        self.descend()?;
        let result = parse(self);
        self.depth = depth;
        result
    }

    fn parse_dollar_expression(&mut self) -> ParseResult<ExpressionNode> {
        self.expect(TokenKind::Dollar)?;
        self.parse_expression()
    }

    /// Parse an expression at the lowest precedence level
    pub fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        self.nested(Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> ParseResult<ExpressionNode> {
        let condition = self.parse_comparison()?;
        if self.matches(TokenKind::Question) {
            let then_expr = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let else_expr = self.parse_expression()?;
            return Ok(ExpressionNode::conditional(condition, then_expr, else_expr));
        }
        Ok(condition)
    }

    fn comparison_operator(&self) -> Option<BinaryOperator> {
        match self.current().kind {
            TokenKind::Equal => Some(BinaryOperator::Equal),
            TokenKind::NotEqual => Some(BinaryOperator::NotEqual),
            TokenKind::Less => Some(BinaryOperator::LessThan),
            TokenKind::LessEqual => Some(BinaryOperator::LessThanOrEqual),
            TokenKind::Greater => Some(BinaryOperator::GreaterThan),
            TokenKind::GreaterEqual => Some(BinaryOperator::GreaterThanOrEqual),
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.comparison_operator() {
            self.advance();
            self.descend()?;
            let right = self.parse_additive()?;
            left = ExpressionNode::binary_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_term()?;
            left = ExpressionNode::binary_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_factor()?;
            left = ExpressionNode::binary_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<ExpressionNode> {
        match self.current().kind {
            TokenKind::Dollar => self.parse_dollar_expression(),
            TokenKind::Identifier => {
                let name = self.advance().text;
                self.parse_identifier_tail(name)
            }
            TokenKind::Number => self.parse_number(),
            TokenKind::StringLiteral => Ok(ExpressionNode::literal(self.advance().text)),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_identifier_tail(&mut self, name: String) -> ParseResult<ExpressionNode> {
        if self.check(TokenKind::LeftParen) {
            let args = self.parse_argument_list()?;
            let accessors = self.parse_accessors()?;
            Ok(ExpressionNode::function_call(name, args, accessors))
        } else {
            let accessors = self.parse_accessors()?;
            Ok(ExpressionNode::variable_with(name, accessors))
        }
    }

    fn parse_number(&mut self) -> ParseResult<ExpressionNode> {
        let token = self.expect(TokenKind::Number)?;
        let text = token.text.as_str();
        let value = if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            // Integers too large for i64 degrade to floats
            text.parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .ok()
        };
        value
            .map(ExpressionNode::Literal)
            .ok_or_else(|| ParseError::InvalidNumber {
                text: token.text.clone(),
                position: token.position,
            })
    }

    fn parse_accessors(&mut self) -> ParseResult<Vec<Accessor>> {
        let mut accessors = Vec::new();
        loop {
            if self.matches(TokenKind::Dot) {
                let field = self.expect(TokenKind::Identifier)?;
                accessors.push(Accessor::Field(field.text));
            } else if self.matches(TokenKind::LeftBracket) {
                let index = self.parse_index()?;
                self.expect(TokenKind::RightBracket)?;
                accessors.push(Accessor::Index(index));
            } else {
                return Ok(accessors);
            }
        }
    }

    fn parse_index(&mut self) -> ParseResult<ExpressionNode> {
        match self.current().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::Identifier => Ok(ExpressionNode::variable(self.advance().text)),
            TokenKind::Dollar => self.parse_dollar_expression(),
            _ => Err(self.unexpected("index")),
        }
    }

    fn parse_argument_list(&mut self) -> ParseResult<SmallVec<[ExpressionNode; 4]>> {
        self.expect(TokenKind::LeftParen)?;
        let args = self.parse_arguments_until(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_iter().collect())
    }

    fn parse_array_literal(&mut self) -> ParseResult<ExpressionNode> {
        self.expect(TokenKind::LeftBracket)?;
        self.nested(|parser| {
            let elements = parser.parse_arguments_until(TokenKind::RightBracket)?;
            parser.expect(TokenKind::RightBracket)?;
            Ok(ExpressionNode::ArrayLiteral(elements))
        })
    }

    fn parse_arguments_until(&mut self, close: TokenKind) -> ParseResult<Vec<ExpressionNode>> {
        let mut args = Vec::new();
        if self.check(close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_argument()?);
            if !self.matches(TokenKind::Comma) {
                return Ok(args);
            }
        }
    }

    fn parse_argument(&mut self) -> ParseResult<ExpressionNode> {
        match self.current().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::StringLiteral => Ok(ExpressionNode::literal(self.advance().text)),
            TokenKind::Dollar => self.parse_dollar_expression(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            // Bare words are literal strings
            TokenKind::Identifier => Ok(ExpressionNode::literal(self.advance().text)),
            _ => Err(self.unexpected("argument")),
        }
    }
}
