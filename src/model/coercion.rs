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

//! Numeric coercion rules
//!
//! Arithmetic operands go through [`to_numeric`], which never fails:
//!
//! | value            | result                                          |
//! |------------------|-------------------------------------------------|
//! | null             | `0`                                             |
//! | integer / float  | itself                                          |
//! | string           | float if it contains `.`, `e` or `E`, else integer; `0` when unparseable |
//! | boolean          | `1` / `0`                                       |
//! | array / object   | `0`                                             |

use super::value::Value;

/// A coerced numeric operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Integer operand
    Integer(i64),
    /// Floating point operand
    Float(f64),
}

impl Numeric {
    /// Widen to a float
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    /// Check for numeric zero
    pub fn is_zero(self) -> bool {
        match self {
            Numeric::Integer(i) => i == 0,
            Numeric::Float(f) => f == 0.0,
        }
    }

    /// Add, promoting to float on mixed operands or overflow
    pub fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_add(b)
                .map_or(Numeric::Float(a as f64 + b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Subtract, promoting to float on mixed operands or overflow
    pub fn sub(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_sub(b)
                .map_or(Numeric::Float(a as f64 - b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() - b.as_f64()),
        }
    }

    /// Multiply, promoting to float on mixed operands or overflow
    pub fn mul(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_mul(b)
                .map_or(Numeric::Float(a as f64 * b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// Divide, returning `None` for a zero divisor.
    ///
    /// Two integers divide to an integer only when the quotient is exact,
    /// so `4 / 2` is `2` and `5 / 2` is `2.5`.
    pub fn checked_div(self, rhs: Numeric) -> Option<Numeric> {
        if rhs.is_zero() {
            return None;
        }
        let quotient = match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => match a.checked_rem(b) {
                Some(0) => a
                    .checked_div(b)
                    .map_or(Numeric::Float(a as f64 / b as f64), Numeric::Integer),
                _ => Numeric::Float(a as f64 / b as f64),
            },
            (a, b) => Numeric::Float(a.as_f64() / b.as_f64()),
        };
        Some(quotient)
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Integer(i) => Value::Integer(i),
            Numeric::Float(f) => Value::Float(f),
        }
    }
}

fn parse_numeric_str(text: &str) -> Option<Numeric> {
    let text = text.trim();
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().map(Numeric::Float)
    } else {
        text.parse::<i64>().ok().map(Numeric::Integer)
    }
}

/// Coerce any value to a numeric operand
pub fn to_numeric(value: &Value) -> Numeric {
    match value {
        Value::Null => Numeric::Integer(0),
        Value::Integer(i) => Numeric::Integer(*i),
        Value::Float(f) => Numeric::Float(*f),
        Value::String(s) => parse_numeric_str(s).unwrap_or(Numeric::Integer(0)),
        Value::Bool(b) => Numeric::Integer(i64::from(*b)),
        Value::Array(_) | Value::Object(_) => Numeric::Integer(0),
    }
}

/// Convert a value to a positional index.
///
/// Floats truncate toward zero. Values with no integer reading (null,
/// non-numeric strings, containers, non-finite floats) yield `None`.
pub fn to_index(value: &Value) -> Option<i64> {
    let numeric = match value {
        Value::Integer(i) => Numeric::Integer(*i),
        Value::Float(f) => Numeric::Float(*f),
        Value::String(s) => parse_numeric_str(s)?,
        Value::Bool(b) => Numeric::Integer(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    match numeric {
        Numeric::Integer(i) => Some(i),
        Numeric::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Numeric::Float(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::null(Value::Null, Numeric::Integer(0))]
    #[case::integer(Value::Integer(7), Numeric::Integer(7))]
    #[case::float(Value::Float(1.5), Numeric::Float(1.5))]
    #[case::integer_string(Value::from(" 42 "), Numeric::Integer(42))]
    #[case::float_string(Value::from("2.5"), Numeric::Float(2.5))]
    #[case::exponent_string(Value::from("1e3"), Numeric::Float(1000.0))]
    #[case::garbage_string(Value::from("abc"), Numeric::Integer(0))]
    #[case::broken_float_string(Value::from("1.2.3"), Numeric::Integer(0))]
    #[case::empty_string(Value::from(""), Numeric::Integer(0))]
    #[case::bool_true(Value::Bool(true), Numeric::Integer(1))]
    #[case::bool_false(Value::Bool(false), Numeric::Integer(0))]
    #[case::array(Value::Array(vec![Value::Integer(3)]), Numeric::Integer(0))]
    #[case::object(Value::Object(Default::default()), Numeric::Integer(0))]
    fn test_to_numeric(#[case] input: Value, #[case] expected: Numeric) {
        assert_eq!(to_numeric(&input), expected);
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        let a = Numeric::Integer(6);
        let b = Numeric::Integer(4);
        assert_eq!(a.add(b), Numeric::Integer(10));
        assert_eq!(a.sub(b), Numeric::Integer(2));
        assert_eq!(a.mul(b), Numeric::Integer(24));
    }

    #[test]
    fn test_mixed_and_overflow_promote_to_float() {
        assert_eq!(
            Numeric::Integer(1).add(Numeric::Float(0.5)),
            Numeric::Float(1.5)
        );
        assert!(matches!(
            Numeric::Integer(i64::MAX).add(Numeric::Integer(1)),
            Numeric::Float(_)
        ));
    }

    #[test]
    fn test_division() {
        assert_eq!(
            Numeric::Integer(4).checked_div(Numeric::Integer(2)),
            Some(Numeric::Integer(2))
        );
        assert_eq!(
            Numeric::Integer(5).checked_div(Numeric::Integer(2)),
            Some(Numeric::Float(2.5))
        );
        assert_eq!(Numeric::Integer(4).checked_div(Numeric::Integer(0)), None);
        assert_eq!(Numeric::Float(1.0).checked_div(Numeric::Float(0.0)), None);
        assert!(matches!(
            Numeric::Integer(i64::MIN).checked_div(Numeric::Integer(-1)),
            Some(Numeric::Float(_))
        ));
    }

    #[rstest]
    #[case(Value::Integer(-1), Some(-1))]
    #[case(Value::Float(2.9), Some(2))]
    #[case(Value::from("3"), Some(3))]
    #[case(Value::from("x"), None)]
    #[case(Value::Null, None)]
    #[case(Value::Float(f64::NAN), None)]
    fn test_to_index(#[case] input: Value, #[case] expected: Option<i64>) {
        assert_eq!(to_index(&input), expected);
    }
}
