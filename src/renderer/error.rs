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

//! Error types for document rendering

use crate::error::ErrorKind;
use crate::evaluator::EvaluationError;
use crate::model::Value;
use crate::parser::ParseError;
use std::fmt;
use thiserror::Error;

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Budgeted resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Document nesting depth
    Depth,
    /// Total repeat iterations
    Iterations,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Depth => f.write_str("nesting depth"),
            Resource::Iterations => f.write_str("repeat iteration"),
        }
    }
}

/// Errors that can occur while rendering a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A sub-document failed; carries its location and content
    #[error("Failed to render template at {path}: {source}")]
    Template {
        /// JSONPath-like location of the failing sub-document
        path: String,
        /// The failing sub-document
        document: Value,
        /// Underlying failure
        #[source]
        source: Box<RenderError>,
    },

    /// A string leaf could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A string leaf could not be evaluated
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// `_repeat` did not resolve to a count
    #[error("Repeat count must be numeric, got {actual} {value}")]
    InvalidRepeatCount {
        /// The resolved count value
        value: Value,
        /// Its type name
        actual: &'static str,
    },

    /// A configured limit was exceeded
    #[error("{resource} limit of {limit} exceeded")]
    ResourceExhausted {
        /// Which budget ran out
        resource: Resource,
        /// Configured limit
        limit: usize,
    },
}

impl RenderError {
    /// Error classification.
    ///
    /// A wrapped failure is a runtime error unless it ran out of budget.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Template { source, .. } => match source.kind() {
                ErrorKind::ResourceExhausted => ErrorKind::ResourceExhausted,
                _ => ErrorKind::Runtime,
            },
            RenderError::Parse(e) => e.kind(),
            RenderError::Evaluation(e) => e.kind(),
            RenderError::InvalidRepeatCount { .. } => ErrorKind::Value,
            RenderError::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
        }
    }

    /// Kind of the innermost cause
    pub fn root_kind(&self) -> ErrorKind {
        self.root_cause().kind()
    }

    /// The innermost cause
    pub fn root_cause(&self) -> &RenderError {
        match self {
            RenderError::Template { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Location of the failing sub-document, if known
    pub fn path(&self) -> Option<&str> {
        match self {
            RenderError::Template { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The failing sub-document, if known
    pub fn document(&self) -> Option<&Value> {
        match self {
            RenderError::Template { document, .. } => Some(document),
            _ => None,
        }
    }
}
