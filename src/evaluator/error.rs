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

// Error types for expression evaluation

use crate::error::ErrorKind;
use crate::model::Value;
use crate::registry::function::FunctionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur during expression evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Function is not in the registry
    #[error("Function '{name}' is not defined")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Division by zero after numeric coercion
    #[error("Division by zero in template expression")]
    DivisionByZero,

    /// Operation not applicable to its operands
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Error message
        message: String,
    },

    /// Native function failed
    #[error("Error calling function '{name}' with args {}: {source}", format_arguments(.arguments))]
    FunctionFailed {
        /// Function name
        name: String,
        /// Evaluated arguments passed to the function
        arguments: Vec<Value>,
        /// Underlying function error
        #[source]
        source: FunctionError,
    },
}

fn format_arguments(arguments: &[Value]) -> String {
    let items: Vec<serde_json::Value> = arguments.iter().cloned().map(Into::into).collect();
    serde_json::Value::Array(items).to_string()
}

impl EvaluationError {
    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Error classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationError::UnknownFunction { .. } => ErrorKind::Name,
            EvaluationError::DivisionByZero => ErrorKind::ZeroDivision,
            EvaluationError::InvalidOperation { .. } => ErrorKind::Value,
            EvaluationError::FunctionFailed { .. } => ErrorKind::Runtime,
        }
    }
}
