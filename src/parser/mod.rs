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

//! Template string parser
//!
//! Turns a string leaf into a [`TemplateNode`](crate::ast::TemplateNode) in
//! two steps: [`tokenizer`] splits it into text and expression tokens, then
//! [`grammar`] builds the AST.

pub mod error;
pub mod grammar;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use grammar::Parser;
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerOptions, tokenize, tokenize_with};

use crate::ast::TemplateNode;

/// Check whether a string contains the expression sentinel
#[inline]
pub fn has_expression(text: &str) -> bool {
    text.contains('$')
}

/// Default limit on expression nesting within one string leaf
pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 128;

/// Options for tokenizing and parsing one template string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Tokenizer mode
    pub tokenizer: TokenizerOptions,
    /// Nesting budget; every parenthesis, array, nested `$` and binary
    /// operator counts one level
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            max_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
        }
    }
}

/// Parse a token stream into a template
pub fn parse_tokens(tokens: &[Token]) -> ParseResult<TemplateNode> {
    Parser::new(tokens).parse_template()
}

/// Tokenize and parse a template string with default options
pub fn parse(input: &str) -> ParseResult<TemplateNode> {
    parse_with(input, ParseOptions::default())
}

/// Tokenize and parse a template string
pub fn parse_with(input: &str, options: ParseOptions) -> ParseResult<TemplateNode> {
    let tokens = tokenize_with(input, options.tokenizer);
    Parser::with_max_depth(&tokens, options.max_depth).parse_template()
}
