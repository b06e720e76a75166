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

// Variable environment for template evaluation

use crate::model::{Object, Value};
use std::borrow::Cow;

/// Reserved name exposing the hoisted namespace as an object
pub const HOISTED_NAMESPACE: &str = "_set";

/// Ordered hoisted bindings produced by a render step
pub type Bindings = Object;

/// Two-layer variable environment.
///
/// `locals` holds ordinary bindings visible to later keys of the object
/// being rendered. `hoisted` holds bindings written through `_set.<name>`
/// (or mirrored from repeated keys); these travel up to every enclosing
/// scope. A hoisted binding is also written into `locals` so a later local
/// of the same name shadows it only until the next hoist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    locals: Object,
    hoisted: Object,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a caller supplied object.
    ///
    /// An object-valued `_set` entry seeds the hoisted layer. Returns `None`
    /// unless the value is an object or null.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    /// Materialize the context as an object with hoisted bindings under `_set`
    pub fn to_value(&self) -> Value {
        let mut map = self.locals.clone();
        if !self.hoisted.is_empty() {
            map.insert(
                HOISTED_NAMESPACE.to_string(),
                Value::Object(self.hoisted.clone()),
            );
        }
        Value::Object(map)
    }

    /// Builder-style local binding
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_local(name, value);
        self
    }

    /// Resolve a variable: `_set` yields the hoisted namespace, otherwise
    /// locals win over hoisted bindings and unknown names are null.
    pub fn resolve(&self, name: &str) -> Cow<'_, Value> {
        if name == HOISTED_NAMESPACE {
            return Cow::Owned(Value::Object(self.hoisted.clone()));
        }
        match self.get(name) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::Null),
        }
    }

    /// Look up a binding in locals, then in hoisted bindings
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name).or_else(|| self.hoisted.get(name))
    }

    /// Bind a name in the local layer only
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(name.into(), value.into());
    }

    /// Bind a name in both layers
    pub fn hoist(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        self.locals.insert(name.clone(), value.clone());
        self.hoisted.insert(name, value);
    }

    /// Hoist every binding of `effects`, in order
    pub fn absorb(&mut self, effects: &Bindings) {
        for (name, value) in effects {
            self.hoist(name.clone(), value.clone());
        }
    }

    /// Local bindings
    pub fn locals(&self) -> &Object {
        &self.locals
    }

    /// Hoisted bindings
    pub fn hoisted(&self) -> &Object {
        &self.hoisted
    }
}

impl From<Object> for Context {
    fn from(mut map: Object) -> Self {
        let hoisted = if matches!(map.get(HOISTED_NAMESPACE), Some(Value::Object(_))) {
            match map.shift_remove(HOISTED_NAMESPACE) {
                Some(Value::Object(hoisted)) => hoisted,
                _ => Object::new(),
            }
        } else {
            Object::new()
        };
        Self {
            locals: map,
            hoisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolution_order() {
        let mut context = Context::new().with("a", 1);
        context.hoist("b", 2);
        context.set_local("b", 3);

        assert_eq!(*context.resolve("a"), Value::Integer(1));
        assert_eq!(*context.resolve("b"), Value::Integer(3));
        assert_eq!(*context.resolve("missing"), Value::Null);
        assert_eq!(
            context.resolve("_set").into_owned(),
            Value::from(json!({"b": 2}))
        );
    }

    #[test]
    fn test_from_value_extracts_hoisted_namespace() {
        let context = Context::from_value(Value::from(json!({
            "user": "ada",
            "_set": {"total": 5}
        })))
        .unwrap();

        assert_eq!(context.locals().len(), 1);
        assert_eq!(context.hoisted().get("total"), Some(&Value::Integer(5)));
        assert_eq!(*context.resolve("total"), Value::Integer(5));
        assert_eq!(
            serde_json::Value::from(context.to_value()),
            json!({"user": "ada", "_set": {"total": 5}})
        );
    }

    #[test]
    fn test_non_object_set_stays_local() {
        let context = Context::from_value(Value::from(json!({"_set": 1}))).unwrap();
        assert!(context.hoisted().is_empty());
        assert_eq!(context.locals().get("_set"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        assert!(Context::from_value(Value::Integer(1)).is_none());
        assert!(Context::from_value(Value::Null).is_some());
    }

    #[test]
    fn test_absorb_writes_both_layers() {
        let mut effects = Bindings::new();
        effects.insert("x".into(), Value::Integer(9));
        let mut context = Context::new();
        context.absorb(&effects);
        assert_eq!(context.locals().get("x"), Some(&Value::Integer(9)));
        assert_eq!(context.hoisted().get("x"), Some(&Value::Integer(9)));
    }
}
