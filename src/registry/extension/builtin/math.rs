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

//! Numeric helpers over lists

use crate::model::Value;
use crate::registry::extension::{ExtensionMetadata, ExtensionResult, TemplateExtension};
use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult, TemplateFunction};

/// Extension providing list arithmetic
pub struct MathExtension {
    metadata: ExtensionMetadata,
}

impl MathExtension {
    /// Create a new math extension
    pub fn new() -> Self {
        Self {
            metadata: ExtensionMetadata::new(
                "math",
                "Math Utilities",
                env!("CARGO_PKG_VERSION"),
                "Arithmetic over lists of numbers",
                "OctoFHIR Team",
            ),
        }
    }
}

impl Default for MathExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateExtension for MathExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn register_functions(&self, registry: &mut FunctionRegistry) -> ExtensionResult<()> {
        registry.register(SumListFunction);
        Ok(())
    }
}

/// `sum_list(list)`: float sum of every element
pub struct SumListFunction;

impl SumListFunction {
    fn element(index: usize, value: &Value) -> FunctionResult<f64> {
        match value {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Bool(b) => Ok(f64::from(u8::from(*b))),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
                FunctionError::evaluation(
                    "sum_list",
                    format!("element {index} is not a number: '{s}'"),
                )
            }),
            other => Err(FunctionError::evaluation(
                "sum_list",
                format!("element {index} is not a number: {}", other.type_name()),
            )),
        }
    }
}

impl TemplateFunction for SumListFunction {
    fn name(&self) -> &str {
        "sum_list"
    }

    fn arity(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn evaluate(&self, args: &[Value]) -> FunctionResult<Value> {
        let [list] = args else {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min: 1,
                max: Some(1),
                actual: args.len(),
            });
        };
        let Some(items) = list.as_array() else {
            return Err(FunctionError::argument_type(self.name(), 0, "array", list));
        };

        let mut total = 0.0;
        for (index, item) in items.iter().enumerate() {
            total += Self::element(index, item)?;
        }
        Ok(Value::Float(total))
    }

    fn documentation(&self) -> &str {
        "Sum a list of numbers as a float"
    }
}
