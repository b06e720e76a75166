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

//! JSON documents as templates
//!
//! `rjson` renders JSON documents whose string values may contain `$`
//! expressions. Rendering walks the document and replaces every string with
//! the value of its expressions, evaluated against a [`Context`]. Objects can
//! expand into lists with the `_repeat` directive and publish values to later
//! parts of the document with `_set.<name>` keys.
//!
//! ```
//! use rjson::{Context, FunctionRegistry, Value, render_string};
//!
//! let context = Context::new().with("name", "Ada");
//! let rendered = render_string("Hello $name", &context, &FunctionRegistry::new()).unwrap();
//! assert_eq!(rendered, Value::from("Hello Ada"));
//! ```
//!
//! The pipeline is tokenizer → parser → evaluator → renderer:
//!
//! - [`parser`] turns template text into a [`TemplateNode`](ast::TemplateNode)
//! - [`evaluator`] computes values from the AST
//! - [`renderer`] walks documents and applies the directives
//! - [`registry`] holds the callable functions and the extension system

#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod model;
pub mod parser;
pub mod registry;
pub mod renderer;

pub use config::RenderConfig;
pub use error::{ErrorKind, Result, RjsonError};
pub use evaluator::{Context, EvaluationError, Evaluator};
pub use model::Value;
pub use parser::{ParseError, parse};
pub use registry::{
    ExtensionError, ExtensionManager, FunctionError, FunctionRegistry, TemplateExtension,
    TemplateFunction,
};
pub use renderer::{RenderError, Rendered, Renderer};

/// Render a single template string with the default configuration
pub fn render_string(text: &str, context: &Context, functions: &FunctionRegistry) -> Result<Value> {
    Ok(Renderer::new(functions).render(&Value::from(text), context)?)
}

/// Render a template document with the default configuration
pub fn render_template(
    template: &Value,
    context: &Context,
    functions: &FunctionRegistry,
) -> Result<Value> {
    Ok(Renderer::new(functions).render(template, context)?)
}
