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

//! Rendering configuration

use crate::parser::{DEFAULT_MAX_EXPRESSION_DEPTH, ParseOptions, TokenizerOptions};
use serde::{Deserialize, Serialize};

/// Limits and language options for a render call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum nesting depth of the template document
    pub max_depth: usize,

    /// Maximum number of repeat iterations across one render call
    pub max_iterations: usize,

    /// Maximum nesting depth of a single embedded expression
    pub max_expression_depth: usize,

    /// Enable comparison and conditional operators in expressions
    pub extended_operators: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_iterations: 100_000,
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
            extended_operators: false,
        }
    }
}

impl RenderConfig {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the repeat iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the expression nesting budget
    pub fn with_max_expression_depth(mut self, max_expression_depth: usize) -> Self {
        self.max_expression_depth = max_expression_depth;
        self
    }

    /// Enable or disable comparison and conditional operators
    pub fn with_extended_operators(mut self, enabled: bool) -> Self {
        self.extended_operators = enabled;
        self
    }

    /// Parser options implied by this configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            tokenizer: TokenizerOptions {
                extended_operators: self.extended_operators,
            },
            max_depth: self.max_expression_depth,
        }
    }
}
