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

//! Error types for template rendering
//!
//! Each stage has its own error enum ([`ParseError`], [`EvaluationError`],
//! [`RenderError`], [`ExtensionError`]). All of them report an [`ErrorKind`]
//! so callers can classify failures without matching every variant.
//! [`RjsonError`] unifies them at the crate boundary.

use crate::evaluator::EvaluationError;
use crate::parser::ParseError;
use crate::registry::extension::ExtensionError;
use crate::renderer::RenderError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, RjsonError>;

/// Classification of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed expression
    Syntax,
    /// Function name absent from the registry
    Name,
    /// Division by numeric zero
    ZeroDivision,
    /// Value of the wrong shape (bad repeat count, unorderable operands)
    Value,
    /// Function invocation or sub-document rendering failed
    Runtime,
    /// Depth or iteration budget exceeded
    ResourceExhausted,
    /// Reading or decoding an input file failed
    Io,
    /// Extension loading or teardown failed
    Extension,
}

impl ErrorKind {
    /// Conventional name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Name => "NameError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::ResourceExhausted => "ResourceExhausted",
            ErrorKind::Io => "IoError",
            ErrorKind::Extension => "ExtensionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum RjsonError {
    /// Template string could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Expression evaluation failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Document rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Extension loading or teardown failed
    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// File could not be read or written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File did not contain valid JSON
    #[error("Invalid JSON in '{}': {source}", path.display())]
    Json {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// File did not contain valid YAML
    #[error("Invalid YAML in '{}': {source}", path.display())]
    Yaml {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// Initial context was not a JSON object
    #[error("Context must be a JSON object, got {actual}")]
    InvalidContext {
        /// Type name of the value found
        actual: &'static str,
    },
}

impl RjsonError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RjsonError::Parse(e) => e.kind(),
            RjsonError::Evaluation(e) => e.kind(),
            RjsonError::Render(e) => e.kind(),
            RjsonError::Extension(_) => ErrorKind::Extension,
            RjsonError::Io { .. } | RjsonError::Json { .. } | RjsonError::Yaml { .. } => {
                ErrorKind::Io
            }
            RjsonError::InvalidContext { .. } => ErrorKind::Value,
        }
    }
}
