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

//! Structural renderer for template documents
//!
//! Objects are rendered key by key in document order against a private
//! copy of the enclosing context. Two directives are consumed on the way:
//!
//! - `_repeat: <count>` turns an object into an array of rendered copies.
//!   Each iteration starts from a fresh copy of the context with `_index`
//!   and `_repeat` bound, and a repeated key also sees the items rendered
//!   so far under its own name.
//! - `_set.<name>: <value>` renders the value and hoists it as `<name>`
//!   without emitting anything.
//!
//! Only hoisted bindings leave a scope. They flow back as the `effects` of
//! a [`Rendered`] result and are absorbed by every enclosing object, so a
//! `_set` made in one iteration is visible to the next and to the parent.

use super::error::{RenderError, RenderResult, Resource};
use crate::config::RenderConfig;
use crate::evaluator::{Bindings, Context, Evaluator};
use crate::model::{Object, Value};
use crate::parser;
use crate::registry::FunctionRegistry;
use std::fmt::Write;

const REPEAT_KEY: &str = "_repeat";
const INDEX_KEY: &str = "_index";
const SET_PREFIX: &str = "_set.";

/// A rendered value plus the hoisted bindings it produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    /// Rendered document
    pub value: Value,
    /// Hoisted bindings produced while rendering, in write order
    pub effects: Bindings,
}

impl Rendered {
    fn plain(value: Value) -> Self {
        Self {
            value,
            effects: Bindings::new(),
        }
    }
}

/// Renders template documents against a function registry
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    functions: &'a FunctionRegistry,
    config: RenderConfig,
}

impl<'a> Renderer<'a> {
    /// Create a renderer with default limits
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self {
            functions,
            config: RenderConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a document
    pub fn render(&self, document: &Value, context: &Context) -> RenderResult<Value> {
        self.render_with_effects(document, context)
            .map(|rendered| rendered.value)
    }

    /// Render a document and report the hoisted bindings it produced
    pub fn render_with_effects(
        &self,
        document: &Value,
        context: &Context,
    ) -> RenderResult<Rendered> {
        RenderPass::new(self.functions, self.config).render(document, context, 0)
    }

    /// Render a document and absorb its hoisted bindings into `context`
    pub fn render_in_place(&self, document: &Value, context: &mut Context) -> RenderResult<Value> {
        let rendered = self.render_with_effects(document, context)?;
        context.absorb(&rendered.effects);
        Ok(rendered.value)
    }
}

enum Segment<'d> {
    Key(&'d str),
    Index(usize),
}

/// State of one top-level render call
struct RenderPass<'d, 'f> {
    functions: &'f FunctionRegistry,
    config: RenderConfig,
    iterations: usize,
    path: Vec<Segment<'d>>,
}

fn repeat_directive(map: &Object) -> Option<&Value> {
    map.get(REPEAT_KEY).filter(|count| !count.is_null())
}

fn repeated_object(value: &Value) -> Option<&Object> {
    value
        .as_object()
        .filter(|map| repeat_directive(map).is_some())
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl<'d, 'f> RenderPass<'d, 'f> {
    fn new(functions: &'f FunctionRegistry, config: RenderConfig) -> Self {
        Self {
            functions,
            config,
            iterations: 0,
            path: Vec::new(),
        }
    }

    fn current_path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            let _ = match segment {
                Segment::Key(key) if is_plain_key(key) => write!(out, ".{key}"),
                Segment::Key(key) => write!(out, "[{key:?}]"),
                Segment::Index(i) => write!(out, "[{i}]"),
            };
        }
        out
    }

    /// Attach the current location and failing sub-document to a raw error
    fn fail(&self, document: &Value, source: RenderError) -> RenderError {
        RenderError::Template {
            path: self.current_path(),
            document: document.clone(),
            source: Box::new(source),
        }
    }

    fn render(&mut self, document: &'d Value, context: &Context, depth: usize) -> RenderResult<Rendered> {
        if depth > self.config.max_depth {
            let error = RenderError::ResourceExhausted {
                resource: Resource::Depth,
                limit: self.config.max_depth,
            };
            return Err(self.fail(document, error));
        }

        match document {
            Value::Object(map) if repeat_directive(map).is_some() => {
                let mut local = context.clone();
                let (items, effects) = self.render_repeat(map, &mut local, None, depth)?;
                Ok(Rendered {
                    value: Value::Array(items),
                    effects,
                })
            }
            Value::Object(map) => self.render_object(map, context, depth),
            Value::Array(items) => self.render_array(items, context, depth),
            Value::String(text) => self
                .render_string(text, context)
                .map(Rendered::plain)
                .map_err(|error| self.fail(document, error)),
            scalar => Ok(Rendered::plain(scalar.clone())),
        }
    }

    fn render_string(&self, text: &str, context: &Context) -> RenderResult<Value> {
        if !parser::has_expression(text) {
            return Ok(Value::String(text.to_string()));
        }
        log::trace!("rendering {} {text:?}", self.current_path());
        let template = parser::parse_with(text, self.config.parse_options())?;
        let value = Evaluator::new(context, self.functions).evaluate_template(&template)?;
        Ok(value)
    }

    fn render_array(
        &mut self,
        items: &'d [Value],
        context: &Context,
        depth: usize,
    ) -> RenderResult<Rendered> {
        let mut values = Vec::with_capacity(items.len());
        let mut effects = Bindings::new();
        for (i, item) in items.iter().enumerate() {
            // Siblings never see each other's bindings
            self.path.push(Segment::Index(i));
            let result = self.render(item, context, depth + 1);
            self.path.pop();
            let rendered = result?;
            effects.extend(rendered.effects);
            values.push(rendered.value);
        }
        Ok(Rendered {
            value: Value::Array(values),
            effects,
        })
    }

    fn render_object(
        &mut self,
        map: &'d Object,
        context: &Context,
        depth: usize,
    ) -> RenderResult<Rendered> {
        let mut local = context.clone();
        let mut output = Object::with_capacity(map.len());
        let mut effects = Bindings::new();

        for (key, value) in map {
            if key.starts_with(REPEAT_KEY) {
                continue;
            }
            self.path.push(Segment::Key(key));
            let result = self.render_entry(key, value, &mut local, &mut output, &mut effects, depth);
            self.path.pop();
            result?;
        }

        Ok(Rendered {
            value: Value::Object(output),
            effects,
        })
    }

    fn render_entry(
        &mut self,
        key: &'d str,
        value: &'d Value,
        local: &mut Context,
        output: &mut Object,
        effects: &mut Bindings,
        depth: usize,
    ) -> RenderResult<()> {
        if let Some(name) = key.strip_prefix(SET_PREFIX) {
            let bound = match repeated_object(value) {
                Some(body) => {
                    let (items, produced) = self.render_repeat(body, local, Some(name), depth + 1)?;
                    effects.extend(produced);
                    Value::Array(items)
                }
                None => {
                    let rendered = self.render(value, local, depth + 1)?;
                    local.absorb(&rendered.effects);
                    effects.extend(rendered.effects);
                    rendered.value
                }
            };
            local.hoist(name, bound.clone());
            effects.insert(name.to_string(), bound);
            return Ok(());
        }

        if let Some(body) = repeated_object(value) {
            let (items, produced) = self.render_repeat(body, local, Some(key), depth + 1)?;
            effects.extend(produced);
            // Repeated arrays are always hoisted
            let items = Value::Array(items);
            local.hoist(key, items.clone());
            effects.insert(key.to_string(), items.clone());
            output.insert(key.to_string(), items);
            return Ok(());
        }

        let rendered = self.render(value, local, depth + 1)?;
        local.absorb(&rendered.effects);
        effects.extend(rendered.effects);
        local.set_local(key, rendered.value.clone());
        output.insert(key.to_string(), rendered.value);
        Ok(())
    }

    /// Render `body` once per repetition.
    ///
    /// Hoisted bindings of every iteration are absorbed into `local` before
    /// the next iteration starts, and returned alongside the items.
    fn render_repeat(
        &mut self,
        body: &'d Object,
        local: &mut Context,
        bind_as: Option<&str>,
        depth: usize,
    ) -> RenderResult<(Vec<Value>, Bindings)> {
        let Some(raw) = repeat_directive(body) else {
            return Ok((Vec::new(), Bindings::new()));
        };
        let count = self
            .repeat_count(raw, local)
            .map_err(|error| self.fail(&Value::Object(body.clone()), error))?;
        self.charge_iterations(count)
            .map_err(|error| self.fail(&Value::Object(body.clone()), error))?;
        log::debug!("repeating {} {count} time(s)", self.current_path());

        let total = Value::from(count);
        let mut items: Vec<Value> = Vec::with_capacity(count);
        let mut effects = Bindings::new();

        for index in 0..count {
            let mut iteration = local.clone();
            iteration.set_local(INDEX_KEY, Value::from(index));
            iteration.set_local(REPEAT_KEY, total.clone());
            if let Some(name) = bind_as {
                iteration.set_local(name, Value::Array(items.clone()));
            }

            self.path.push(Segment::Index(index));
            let result = self.render_object(body, &iteration, depth + 1);
            self.path.pop();
            let rendered = result?;

            local.absorb(&rendered.effects);
            effects.extend(rendered.effects);
            items.push(rendered.value);
        }

        Ok((items, effects))
    }

    fn repeat_count(&self, raw: &Value, context: &Context) -> RenderResult<usize> {
        let resolved = match raw {
            Value::String(text) => self.render_string(text, context)?,
            other => other.clone(),
        };
        let count = match &resolved {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
            }
            _ => None,
        };
        match count {
            // Negative counts repeat zero times
            Some(count) => Ok(usize::try_from(count).unwrap_or(0)),
            None => Err(RenderError::InvalidRepeatCount {
                actual: resolved.type_name(),
                value: resolved,
            }),
        }
    }

    fn charge_iterations(&mut self, count: usize) -> RenderResult<()> {
        let limit = self.config.max_iterations;
        match self.iterations.checked_add(count) {
            Some(total) if total <= limit => {
                self.iterations = total;
                Ok(())
            }
            _ => Err(RenderError::ResourceExhausted {
                resource: Resource::Iterations,
                limit,
            }),
        }
    }
}
