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

//! String helpers

use crate::model::{Value, to_index};
use crate::registry::extension::{ExtensionMetadata, ExtensionResult, TemplateExtension};
use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult};

/// Extension providing `shout` and `repeat`
pub struct TextExtension {
    metadata: ExtensionMetadata,
}

impl TextExtension {
    /// Create a new text extension
    pub fn new() -> Self {
        Self {
            metadata: ExtensionMetadata::new(
                "text",
                "Text Utilities",
                env!("CARGO_PKG_VERSION"),
                "Simple string transformations",
                "OctoFHIR Team",
            ),
        }
    }
}

impl Default for TextExtension {
    fn default() -> Self {
        Self::new()
    }
}

fn shout(args: &[Value]) -> FunctionResult<Value> {
    match args {
        [value] => Ok(Value::String(format!(
            "{}!",
            value.to_template_string().to_uppercase()
        ))),
        _ => Err(FunctionError::InvalidArity {
            name: "shout".into(),
            min: 1,
            max: Some(1),
            actual: args.len(),
        }),
    }
}

fn repeat(args: &[Value]) -> FunctionResult<Value> {
    let [value, count] = args else {
        return Err(FunctionError::InvalidArity {
            name: "repeat".into(),
            min: 2,
            max: Some(2),
            actual: args.len(),
        });
    };
    let count = to_index(count)
        .ok_or_else(|| FunctionError::argument_type("repeat", 1, "integer", count))?;
    let count = usize::try_from(count.max(0))
        .map_err(|e| FunctionError::evaluation("repeat", e.to_string()))?;
    Ok(Value::String(value.to_template_string().repeat(count)))
}

impl TemplateExtension for TextExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn register_functions(&self, registry: &mut FunctionRegistry) -> ExtensionResult<()> {
        registry.register_fn("shout", shout);
        registry.register_fn("repeat", repeat);
        Ok(())
    }
}
