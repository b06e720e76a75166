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

//! Error types for template parsing

use crate::error::ErrorKind;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while parsing an embedded expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A specific token kind was required but something else was found
    #[error("Expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        /// What the parser was looking for
        expected: String,
        /// Description of the token actually found
        found: String,
        /// Byte offset of the offending token
        position: usize,
    },

    /// A number token could not be converted to a numeric value
    #[error("Invalid number literal '{text}' at position {position}")]
    InvalidNumber {
        /// Raw number text
        text: String,
        /// Byte offset of the number token
        position: usize,
    },

    /// Expression nesting went past the configured budget
    #[error("Expression nesting exceeds {limit} levels at position {position}")]
    NestingTooDeep {
        /// Configured nesting budget
        limit: usize,
        /// Byte offset of the token that opened the level
        position: usize,
    },
}

impl ParseError {
    /// Create an unexpected token error
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, position: usize) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            position,
        }
    }

    /// Error classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::NestingTooDeep { .. } => ErrorKind::ResourceExhausted,
            _ => ErrorKind::Syntax,
        }
    }

    /// Byte offset where the error was detected
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }
}
