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

//! Memoised calculation with per-extension state

use crate::model::{Value, to_index};
use crate::registry::extension::{ExtensionMetadata, ExtensionResult, TemplateExtension};
use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult, TemplateFunction};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

type Cache = Arc<Mutex<FxHashMap<String, Value>>>;

/// Extension holding a result cache that lives until cleanup
pub struct CacheExtension {
    metadata: ExtensionMetadata,
    cache: Cache,
}

impl CacheExtension {
    /// Create a new cache extension with an empty cache
    pub fn new() -> Self {
        Self {
            metadata: ExtensionMetadata::new(
                "cache",
                "Stateful Cache",
                env!("CARGO_PKG_VERSION"),
                "Keyed memoisation of a triangular-number calculation",
                "OctoFHIR Team",
            ),
            cache: Arc::default(),
        }
    }

    /// Number of cached entries
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}

impl Default for CacheExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateExtension for CacheExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    fn register_functions(&self, registry: &mut FunctionRegistry) -> ExtensionResult<()> {
        registry.register(CachedCalcFunction {
            cache: self.cache.clone(),
        });
        Ok(())
    }

    fn cleanup(&self) -> ExtensionResult<()> {
        let mut cache = self.cache.lock();
        log::debug!("clearing {} cached entries", cache.len());
        cache.clear();
        Ok(())
    }
}

/// `cached_calc(key, n = 1)`: sum of `0..n`, remembered per key.
///
/// The first call for a key decides the result; later calls with the same
/// key return it regardless of `n`.
pub struct CachedCalcFunction {
    cache: Cache,
}

fn triangular(n: i64) -> Value {
    if n <= 0 {
        return Value::Integer(0);
    }
    let n = i128::from(n);
    let sum = n * (n - 1) / 2;
    i64::try_from(sum).map_or(Value::Float(sum as f64), Value::Integer)
}

impl TemplateFunction for CachedCalcFunction {
    fn name(&self) -> &str {
        "cached_calc"
    }

    fn arity(&self) -> (usize, Option<usize>) {
        (1, Some(2))
    }

    fn evaluate(&self, args: &[Value]) -> FunctionResult<Value> {
        let (min, max) = self.arity();
        let first = args.first().ok_or_else(|| FunctionError::InvalidArity {
            name: self.name().to_string(),
            min,
            max,
            actual: 0,
        })?;
        let key = serde_json::to_string(first)
            .map_err(|e| FunctionError::evaluation(self.name(), e.to_string()))?;

        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(&key) {
            return Ok(hit.clone());
        }

        let n = match args.get(1) {
            None => 1,
            Some(value) => to_index(value).ok_or_else(|| {
                FunctionError::argument_type(self.name(), 1, "integer", value)
            })?,
        };

        let result = triangular(n);
        cache.insert(key, result.clone());
        Ok(result)
    }

    fn documentation(&self) -> &str {
        "Sum of 0..n cached under the given key"
    }
}
