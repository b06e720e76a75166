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

//! Tokenizer for strings containing embedded `$` expressions
//!
//! Scanning alternates between two modes:
//!
//! - **text mode** collects literal characters up to the next `$`;
//! - **expression mode** starts at `$` and emits expression tokens until it
//!   meets a character it does not recognize, then falls back to text mode.
//!
//! Tokenizing never fails. Whatever the expression scanner cannot use is
//! left for text mode, and the stream always ends with
//! [`TokenKind::EndOfInput`].

use std::fmt;

/// Token kinds produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal text outside expressions, or a quoted string inside one
    StringLiteral,
    /// Expression sentinel (`$`)
    Dollar,
    /// Function, variable or field name
    Identifier,
    /// Member access (`.`)
    Dot,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// Numeric literal, kept as raw text
    Number,
    /// `==` (extended operators only)
    Equal,
    /// `!=` (extended operators only)
    NotEqual,
    /// `<` (extended operators only)
    Less,
    /// `<=` (extended operators only)
    LessEqual,
    /// `>` (extended operators only)
    Greater,
    /// `>=` (extended operators only)
    GreaterEqual,
    /// `?` (extended operators only)
    Question,
    /// `:` (extended operators only)
    Colon,
    /// End of input
    EndOfInput,
}

impl TokenKind {
    /// Human readable name used in parse errors
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::StringLiteral => "string",
            TokenKind::Dollar => "'$'",
            TokenKind::Identifier => "identifier",
            TokenKind::Dot => "'.'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Number => "number",
            TokenKind::Equal => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::EndOfInput => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its decoded text and the byte offset where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,
    /// Decoded text (string literals have escapes resolved)
    pub text: String,
    /// Byte offset of the first character in the source
    pub position: usize,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Tokenizer options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Emit comparison (`== != < <= > >=`) and conditional (`? :`) tokens
    pub extended_operators: bool,
}

/// Two-mode tokenizer over a template string
pub struct Tokenizer<'input> {
    input: &'input str,
    pos: usize,
    options: TokenizerOptions,
    tokens: Vec<Token>,
}

#[inline]
fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer with default options
    pub fn new(input: &'input str) -> Self {
        Self::with_options(input, TokenizerOptions::default())
    }

    /// Create a tokenizer with explicit options
    pub fn with_options(input: &'input str, options: TokenizerOptions) -> Self {
        Self {
            input,
            pos: 0,
            options,
            tokens: Vec::with_capacity(16),
        }
    }

    /// Tokenize the whole input
    pub fn tokenize_all(mut self) -> Vec<Token> {
        while !self.at_end() {
            if self.peek() == Some('$') {
                self.scan_expression();
                if self.peek() != Some('$') {
                    self.scan_text();
                }
            } else {
                self.scan_text();
            }
        }
        let end = self.input.len();
        self.tokens.push(Token::new(TokenKind::EndOfInput, "", end));
        self.tokens
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, position: usize) {
        self.tokens.push(Token::new(kind, text, position));
    }

    /// Emit a single-character token at the current position
    fn push_char(&mut self, kind: TokenKind) {
        let start = self.pos;
        if let Some(ch) = self.bump() {
            self.push(kind, ch.to_string(), start);
        }
    }

    /// Emit a two-character operator at the current position
    fn push_pair(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.bump();
        self.bump();
        let text = self.input[start..self.pos].to_string();
        self.push(kind, text, start);
    }

    fn scan_text(&mut self) {
        let start = self.pos;
        let len = self.input[start..].find('$').unwrap_or(self.input.len() - start);
        self.pos += len;
        if len > 0 {
            let text = self.input[start..self.pos].to_string();
            self.push(TokenKind::StringLiteral, text, start);
        }
    }

    fn read_identifier(&mut self) -> &'input str {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_char) {
            self.bump();
        }
        &input[start..self.pos]
    }

    /// Consume `$` and the name that directly follows it
    fn scan_dollar(&mut self) {
        self.push_char(TokenKind::Dollar);
        self.scan_identifier();
    }

    fn scan_identifier(&mut self) {
        let start = self.pos;
        let ident = self.read_identifier();
        if !ident.is_empty() {
            self.push(TokenKind::Identifier, ident, start);
        }
    }

    fn scan_expression(&mut self) {
        self.scan_dollar();

        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                // A dot is member access only when a name follows it
                '.' => {
                    if !self.peek_nth(1).is_some_and(is_identifier_char) {
                        break;
                    }
                    self.push_char(TokenKind::Dot);
                    self.scan_identifier();
                }
                '(' => self.push_char(TokenKind::LeftParen),
                ')' => self.push_char(TokenKind::RightParen),
                '[' => self.push_char(TokenKind::LeftBracket),
                ']' => self.push_char(TokenKind::RightBracket),
                ',' => self.push_char(TokenKind::Comma),
                '+' => self.push_char(TokenKind::Plus),
                '-' => self.push_char(TokenKind::Minus),
                '*' => self.push_char(TokenKind::Star),
                '/' => self.push_char(TokenKind::Slash),
                '$' => self.scan_dollar(),
                '"' | '\'' => self.scan_string(ch),
                c if c.is_ascii_digit() => self.scan_number(),
                c if c.is_alphanumeric() || c == '_' => self.scan_identifier(),
                _ if self.options.extended_operators && self.scan_operator(ch) => {}
                _ => break,
            }
        }
    }

    /// Comparison and conditional operators, returns false when `ch` is none
    fn scan_operator(&mut self, ch: char) -> bool {
        let followed_by_eq = self.peek_nth(1) == Some('=');
        match (ch, followed_by_eq) {
            ('=', true) => self.push_pair(TokenKind::Equal),
            ('!', true) => self.push_pair(TokenKind::NotEqual),
            ('<', true) => self.push_pair(TokenKind::LessEqual),
            ('>', true) => self.push_pair(TokenKind::GreaterEqual),
            ('<', false) => self.push_char(TokenKind::Less),
            ('>', false) => self.push_char(TokenKind::Greater),
            ('?', _) => self.push_char(TokenKind::Question),
            (':', _) => self.push_char(TokenKind::Colon),
            _ => return false,
        }
        true
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            let next = self.peek_nth(1);
            let next_is_digit = next.is_some_and(|c| c.is_ascii_digit());
            match ch {
                c if c.is_ascii_digit() => {}
                '.' if next_is_digit => {}
                'e' | 'E' if next_is_digit => {}
                'e' | 'E'
                    if matches!(next, Some('+' | '-'))
                        && self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()) =>
                {
                    // Exponent sign belongs to the number
                    self.bump();
                }
                _ => break,
            }
            self.bump();
        }
        let text = self.input[start..self.pos].to_string();
        self.push(TokenKind::Number, text, start);
    }

    fn scan_string(&mut self, quote: char) {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '\\' => match self.bump() {
                    Some(escaped @ ('"' | '\'' | '\\')) => value.push(escaped),
                    Some('n') => value.push('\n'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => value.push('\\'),
                },
                c if c == quote => break,
                c => value.push(c),
            }
        }
        self.push(TokenKind::StringLiteral, value, start);
    }
}

/// Tokenize with default options
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).tokenize_all()
}

/// Tokenize with explicit options
pub fn tokenize_with(input: &str, options: TokenizerOptions) -> Vec<Token> {
    Tokenizer::with_options(input, options).tokenize_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_plain_text() {
        let tokens = tokenize("just text");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::StringLiteral, "just text", 0),
                Token::new(TokenKind::EndOfInput, "", 9),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn test_text_expression_text() {
        use TokenKind::*;
        assert_eq!(
            kinds("Hello $user.name!"),
            vec![
                StringLiteral,
                Dollar,
                Identifier,
                Dot,
                Identifier,
                StringLiteral,
                EndOfInput
            ]
        );
        assert_eq!(
            texts("Hello $user.name!"),
            vec!["Hello ", "$", "user", ".", "name", "!", ""]
        );
    }

    #[test]
    fn test_positions_are_start_offsets() {
        let tokens = tokenize("ab $x.y");
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_trailing_period_is_text() {
        use TokenKind::*;
        assert_eq!(
            kinds("Hi $name."),
            vec![StringLiteral, Dollar, Identifier, StringLiteral, EndOfInput]
        );
        assert_eq!(texts("Hi $name.")[3], ".");
    }

    #[test]
    fn test_operators_and_nested_dollar() {
        use TokenKind::*;
        assert_eq!(
            kinds("$f($a, 2) * ($b - 1) / 3"),
            vec![
                Dollar, Identifier, LeftParen, Dollar, Identifier, Comma, Number, RightParen,
                Star, LeftParen, Dollar, Identifier, Minus, Number, RightParen, Slash, Number,
                EndOfInput
            ]
        );
    }

    #[test]
    fn test_minus_after_number_is_operator() {
        assert_eq!(texts("$a*2-1"), vec!["$", "a", "*", "2", "-", "1", ""]);
    }

    #[test]
    fn test_unicode_identifier() {
        // Names take any alphanumeric char; positions stay byte offsets
        assert_eq!(
            tokenize("$café!"),
            vec![
                Token::new(TokenKind::Dollar, "$", 0),
                Token::new(TokenKind::Identifier, "café", 1),
                Token::new(TokenKind::StringLiteral, "!", 6),
                Token::new(TokenKind::EndOfInput, "", 7),
            ]
        );
        assert_eq!(texts("$名前 + $x")[1], "名前");
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(texts("$x[1.5e-3]")[3], "1.5e-3");
        assert_eq!(texts("$x[2E10]")[3], "2E10");
        // `e` without digits is not part of the number
        assert_eq!(texts("$f(2each)")[3], "2");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"$f('it\'s', "a\"b", 'x\ny', 'q\tz', 'end\\')"#);
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::StringLiteral)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(strings, vec!["it's", "a\"b", "x\ny", "q\\tz", "end\\"]);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = tokenize("$f('open");
        assert_eq!(tokens[3].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[3].text, "open");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfInput);
    }

    #[test]
    fn test_unrecognized_char_ends_expression() {
        use TokenKind::*;
        assert_eq!(
            kinds("$a == $b"),
            vec![Dollar, Identifier, StringLiteral, Dollar, Identifier, EndOfInput]
        );
    }

    #[test]
    fn test_extended_operators() {
        use TokenKind::*;
        let options = TokenizerOptions {
            extended_operators: true,
        };
        let tokens: Vec<_> = tokenize_with("$a >= 2 ? 'y' : 'n'", options)
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Dollar,
                Identifier,
                GreaterEqual,
                Number,
                Question,
                StringLiteral,
                Colon,
                StringLiteral,
                EndOfInput
            ]
        );
    }

    #[test]
    fn test_adjacent_expressions() {
        use TokenKind::*;
        assert_eq!(
            kinds("$a$b"),
            vec![Dollar, Identifier, EndOfInput]
        );
        assert_eq!(texts("$a$b")[1], "a$b");
        assert_eq!(
            kinds("$a $b"),
            vec![Dollar, Identifier, Dollar, Identifier, EndOfInput]
        );
    }

    #[test]
    fn test_tokenizing_is_deterministic() {
        let text = "Total: $sum([1, 2, $x]) for $user.name[0]!";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
