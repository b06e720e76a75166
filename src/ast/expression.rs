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

//! Expression node definitions

use super::operator::BinaryOperator;
use crate::model::Value;
use smallvec::SmallVec;
use std::fmt;

/// A parsed string leaf: literal text interleaved with expressions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateNode {
    /// Parts in source order
    pub parts: Vec<TemplatePart>,
}

/// One part of a parsed template string
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text copied to the output
    Text(String),
    /// A `$` expression
    Expression(ExpressionNode),
}

/// AST node for template expressions
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Literal value (number, string, bare identifier argument)
    Literal(Value),

    /// Variable reference with trailing accessors
    Variable {
        /// Variable name
        name: String,
        /// Accessors applied left to right
        accessors: Vec<Accessor>,
    },

    /// Call of a registered function
    FunctionCall(Box<FunctionCallData>),

    /// Array literal
    ArrayLiteral(Vec<ExpressionNode>),

    /// Binary operation
    BinaryOp(Box<BinaryOpData>),

    /// Conditional expression (`cond ? a : b`)
    Conditional(Box<ConditionalData>),
}

/// Function call data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallData {
    /// Function name
    pub name: String,
    /// Arguments in call order
    pub args: SmallVec<[ExpressionNode; 4]>,
    /// Accessors applied to the call result
    pub accessors: Vec<Accessor>,
}

/// Binary operation data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

/// Conditional expression data
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalData {
    /// Condition expression
    pub condition: ExpressionNode,
    /// Expression if condition is truthy
    pub then_expr: ExpressionNode,
    /// Expression otherwise
    pub else_expr: ExpressionNode,
}

/// Postfix accessor on a variable or call result
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `.field`
    Field(String),
    /// `[expr]`
    Index(ExpressionNode),
}

impl TemplateNode {
    /// Create a template from its parts
    pub fn new(parts: Vec<TemplatePart>) -> Self {
        Self { parts }
    }

    /// Check if the template holds exactly one expression and nothing else
    pub fn is_single_expression(&self) -> bool {
        matches!(self.parts.as_slice(), [TemplatePart::Expression(_)])
    }
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a plain variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable {
            name: name.into(),
            accessors: Vec::new(),
        }
    }

    /// Create a variable reference with accessors
    pub fn variable_with(name: impl Into<String>, accessors: Vec<Accessor>) -> Self {
        Self::Variable {
            name: name.into(),
            accessors,
        }
    }

    /// Create a function call expression
    pub fn function_call(
        name: impl Into<String>,
        args: impl Into<SmallVec<[ExpressionNode; 4]>>,
        accessors: Vec<Accessor>,
    ) -> Self {
        Self::FunctionCall(Box::new(FunctionCallData {
            name: name.into(),
            args: args.into(),
            accessors,
        }))
    }

    /// Create a binary operation
    pub fn binary_op(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a conditional expression
    pub fn conditional(
        condition: ExpressionNode,
        then_expr: ExpressionNode,
        else_expr: ExpressionNode,
    ) -> Self {
        Self::Conditional(Box::new(ConditionalData {
            condition,
            then_expr,
            else_expr,
        }))
    }
}

fn write_accessors(f: &mut fmt::Formatter<'_>, accessors: &[Accessor]) -> fmt::Result {
    for accessor in accessors {
        match accessor {
            Accessor::Field(name) => write!(f, ".{name}")?,
            Accessor::Index(expr) => write!(f, "[{expr}]")?,
        }
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[ExpressionNode]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Literal(Value::String(s)) => write!(f, "{s:?}"),
            ExpressionNode::Literal(value) => write!(f, "{value}"),
            ExpressionNode::Variable { name, accessors } => {
                write!(f, "${name}")?;
                write_accessors(f, accessors)
            }
            ExpressionNode::FunctionCall(call) => {
                write!(f, "${}(", call.name)?;
                write_list(f, &call.args)?;
                f.write_str(")")?;
                write_accessors(f, &call.accessors)
            }
            ExpressionNode::ArrayLiteral(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            ExpressionNode::BinaryOp(data) => {
                write!(f, "({} {} {})", data.left, data.op, data.right)
            }
            ExpressionNode::Conditional(data) => write!(
                f,
                "({} ? {} : {})",
                data.condition, data.then_expr, data.else_expr
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_shape() {
        let expr = ExpressionNode::binary_op(
            BinaryOperator::Add,
            ExpressionNode::variable_with(
                "user",
                vec![
                    Accessor::Field("scores".into()),
                    Accessor::Index(ExpressionNode::literal(0)),
                ],
            ),
            ExpressionNode::function_call("len", vec![ExpressionNode::variable("teams")], vec![]),
        );
        assert_eq!(expr.to_string(), "($user.scores[0] + $len($teams))");
    }

    #[test]
    fn test_single_expression_detection() {
        let single = TemplateNode::new(vec![TemplatePart::Expression(ExpressionNode::variable(
            "a",
        ))]);
        assert!(single.is_single_expression());

        let mixed = TemplateNode::new(vec![
            TemplatePart::Text("a=".into()),
            TemplatePart::Expression(ExpressionNode::variable("a")),
        ]);
        assert!(!mixed.is_single_expression());
    }
}
