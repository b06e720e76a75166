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

//! Tree-walking evaluator for template expressions

use super::context::Context;
use super::error::{EvaluationError, EvaluationResult};
use crate::ast::{Accessor, BinaryOperator, ExpressionNode, TemplateNode, TemplatePart};
use crate::model::{Numeric, Value, to_index, to_numeric};
use crate::registry::FunctionRegistry;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Evaluates parsed templates against a context and a function registry
pub struct Evaluator<'a> {
    context: &'a Context,
    functions: &'a FunctionRegistry,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator borrowing the context and registry
    pub fn new(context: &'a Context, functions: &'a FunctionRegistry) -> Self {
        Self { context, functions }
    }

    /// Evaluate a parsed template string.
    ///
    /// A template with a single part yields that part's value unchanged,
    /// so `"$count"` stays a number. Several parts are concatenated using
    /// each value's canonical string form.
    pub fn evaluate_template(&self, template: &TemplateNode) -> EvaluationResult<Value> {
        match template.parts.as_slice() {
            [] => Ok(Value::String(String::new())),
            [part] => self.evaluate_part(part),
            parts => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expression(expr) => {
                            out.push_str(&self.evaluate(expr)?.to_template_string())
                        }
                    }
                }
                Ok(Value::String(out))
            }
        }
    }

    fn evaluate_part(&self, part: &TemplatePart) -> EvaluationResult<Value> {
        match part {
            TemplatePart::Text(text) => Ok(Value::String(text.clone())),
            TemplatePart::Expression(expr) => self.evaluate(expr),
        }
    }

    /// Evaluate a single expression node
    pub fn evaluate(&self, node: &ExpressionNode) -> EvaluationResult<Value> {
        match node {
            ExpressionNode::Literal(value) => Ok(value.clone()),
            ExpressionNode::Variable { name, accessors } => {
                let value = self.context.resolve(name);
                self.apply_accessors(value, accessors)
            }
            ExpressionNode::FunctionCall(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<EvaluationResult<Vec<_>>>()?;
                let result = self.call_function(&call.name, args)?;
                self.apply_accessors(Cow::Owned(result), &call.accessors)
            }
            ExpressionNode::ArrayLiteral(elements) => elements
                .iter()
                .map(|element| self.evaluate(element))
                .collect::<EvaluationResult<Vec<_>>>()
                .map(Value::Array),
            ExpressionNode::BinaryOp(data) => {
                let left = self.evaluate(&data.left)?;
                let right = self.evaluate(&data.right)?;
                evaluate_binary(data.op, &left, &right)
            }
            ExpressionNode::Conditional(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.evaluate(&data.then_expr)
                } else {
                    self.evaluate(&data.else_expr)
                }
            }
        }
    }

    fn call_function(&self, name: &str, args: Vec<Value>) -> EvaluationResult<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| EvaluationError::UnknownFunction {
                name: name.to_string(),
            })?;
        log::trace!("calling {name} with {} argument(s)", args.len());
        function
            .validate_args(&args)
            .and_then(|()| function.evaluate(&args))
            .map_err(|source| EvaluationError::FunctionFailed {
                name: name.to_string(),
                arguments: args,
                source,
            })
    }

    /// Apply accessors left to right. Misses resolve to null.
    fn apply_accessors(
        &self,
        value: Cow<'_, Value>,
        accessors: &[Accessor],
    ) -> EvaluationResult<Value> {
        let mut current = value;
        for accessor in accessors {
            current = match accessor {
                Accessor::Field(name) => access_field(current, name),
                Accessor::Index(expr) => {
                    let index = self.evaluate(expr)?;
                    access_index(current, &index)
                }
            };
        }
        Ok(current.into_owned())
    }
}

fn access_field<'v>(value: Cow<'v, Value>, name: &str) -> Cow<'v, Value> {
    match value {
        Cow::Borrowed(Value::Object(map)) => map
            .get(name)
            .map_or(Cow::Owned(Value::Null), Cow::Borrowed),
        Cow::Owned(Value::Object(mut map)) => {
            Cow::Owned(map.swap_remove(name).unwrap_or(Value::Null))
        }
        _ => Cow::Owned(Value::Null),
    }
}

/// Resolve a possibly negative position against a length
fn resolve_position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    (0..len).contains(&position).then_some(position as usize)
}

fn access_index<'v>(value: Cow<'v, Value>, index: &Value) -> Cow<'v, Value> {
    let Some(index) = to_index(index) else {
        return Cow::Owned(Value::Null);
    };
    let found = match value {
        Cow::Borrowed(Value::Array(items)) => {
            resolve_position(index, items.len()).map(|i| Cow::Borrowed(&items[i]))
        }
        Cow::Owned(Value::Array(mut items)) => {
            resolve_position(index, items.len()).map(|i| Cow::Owned(items.swap_remove(i)))
        }
        // Objects are indexed by value position
        Cow::Borrowed(Value::Object(map)) => resolve_position(index, map.len())
            .and_then(|i| map.get_index(i))
            .map(|(_, v)| Cow::Borrowed(v)),
        Cow::Owned(Value::Object(mut map)) => resolve_position(index, map.len())
            .and_then(|i| map.swap_remove_index(i))
            .map(|(_, v)| Cow::Owned(v)),
        Cow::Borrowed(Value::String(s)) => char_at(s, index),
        Cow::Owned(Value::String(s)) => char_at(&s, index),
        _ => None,
    };
    found.unwrap_or(Cow::Owned(Value::Null))
}

fn char_at<'v>(text: &str, index: i64) -> Option<Cow<'v, Value>> {
    resolve_position(index, text.chars().count())
        .and_then(|i| text.chars().nth(i))
        .map(|ch| Cow::Owned(Value::String(ch.to_string())))
}

/// Apply a binary operator to two evaluated operands
pub fn evaluate_binary(op: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    match op {
        BinaryOperator::Add => {
            if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                let mut text = left.to_template_string();
                text.push_str(&right.to_template_string());
                return Ok(Value::String(text));
            }
            Ok(to_numeric(left).add(to_numeric(right)).into())
        }
        BinaryOperator::Subtract => Ok(to_numeric(left).sub(to_numeric(right)).into()),
        BinaryOperator::Multiply => Ok(to_numeric(left).mul(to_numeric(right)).into()),
        BinaryOperator::Divide => to_numeric(left)
            .checked_div(to_numeric(right))
            .map(Value::from)
            .ok_or(EvaluationError::DivisionByZero),
        BinaryOperator::Equal => Ok(Value::Bool(loosely_equal(left, right))),
        BinaryOperator::NotEqual => Ok(Value::Bool(!loosely_equal(left, right))),
        BinaryOperator::LessThan => compare(op, left, right).map(|o| Value::Bool(o.is_lt())),
        BinaryOperator::LessThanOrEqual => compare(op, left, right).map(|o| Value::Bool(o.is_le())),
        BinaryOperator::GreaterThan => compare(op, left, right).map(|o| Value::Bool(o.is_gt())),
        BinaryOperator::GreaterThanOrEqual => {
            compare(op, left, right).map(|o| Value::Bool(o.is_ge()))
        }
    }
}

/// Structural equality where integers and floats compare by numeric value
fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            *a as f64 == *b
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| loosely_equal(x, y)))
        }
        _ => left == right,
    }
}

/// Order two strings lexicographically, anything else numerically
fn compare(op: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Ordering> {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    let (a, b) = (to_numeric(left), to_numeric(right));
    let ordering = match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    };
    ordering.ok_or_else(|| {
        EvaluationError::invalid_operation(format!(
            "cannot order {} {op} {}",
            left.type_name(),
            right.type_name()
        ))
    })
}
