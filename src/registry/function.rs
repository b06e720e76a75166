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

//! Function registry consumed by the evaluator

use crate::model::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// Invalid argument type
    #[error("Function '{name}' argument {index} expects {expected}, got {actual}")]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index
        index: usize,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

impl FunctionError {
    /// Create an argument type error from the offending value
    pub fn argument_type(
        name: impl Into<String>,
        index: usize,
        expected: impl Into<String>,
        actual: &Value,
    ) -> Self {
        Self::InvalidArgumentType {
            name: name.into(),
            index,
            expected: expected.into(),
            actual: actual.type_name().to_string(),
        }
    }

    /// Create a runtime evaluation error
    pub fn evaluation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EvaluationError {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A native function callable from template expressions
pub trait TemplateFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Accepted argument count as `(min, max)`; `None` means unbounded
    fn arity(&self) -> (usize, Option<usize>) {
        (0, None)
    }

    /// Evaluate the function with already evaluated arguments
    fn evaluate(&self, args: &[Value]) -> FunctionResult<Value>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Validate the argument count before evaluation
    fn validate_args(&self, args: &[Value]) -> FunctionResult<()> {
        let (min, max) = self.arity();
        let actual = args.len();
        if actual < min || max.is_some_and(|max| actual > max) {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min,
                max,
                actual,
            });
        }
        Ok(())
    }
}

type NativeFn = dyn Fn(&[Value]) -> FunctionResult<Value> + Send + Sync;

/// Adapter that turns a closure into a [`TemplateFunction`]
struct ClosureFunction {
    name: String,
    func: Box<NativeFn>,
}

impl TemplateFunction for ClosureFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, args: &[Value]) -> FunctionResult<Value> {
        (self.func)(args)
    }
}

/// Mapping from function name to implementation.
///
/// Rendering only reads the registry. Populating it is up to the caller,
/// usually through an [`ExtensionManager`](crate::registry::ExtensionManager).
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn TemplateFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its own name, replacing any previous entry
    pub fn register<F: TemplateFunction + 'static>(&mut self, function: F) {
        self.register_arc(Arc::new(function));
    }

    /// Register a shared function implementation
    pub fn register_arc(&mut self, function: Arc<dyn TemplateFunction>) {
        let name = function.name().to_string();
        if self.functions.insert(name.clone(), function).is_some() {
            log::debug!("function '{name}' replaced");
        }
    }

    /// Register a closure under the given name
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[Value]) -> FunctionResult<Value> + Send + Sync + 'static,
    {
        self.register(ClosureFunction {
            name: name.into(),
            func: Box::new(func),
        });
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn TemplateFunction>> {
        self.functions.get(name)
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Remove a function, returning it if it was registered
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn TemplateFunction>> {
        self.functions.remove(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if no functions are registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
