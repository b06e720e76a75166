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

//! Extension manager for loading and managing extensions

use super::{ExtensionError, ExtensionMetadata, ExtensionResult, TemplateExtension, builtin};
use crate::registry::function::{FunctionRegistry, TemplateFunction};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A loaded extension together with its resolved metadata
struct LoadedExtension {
    extension: Box<dyn TemplateExtension>,
    metadata: ExtensionMetadata,
    /// Host functions this extension replaced, put back on unload
    displaced: Vec<Arc<dyn TemplateFunction>>,
}

/// Manager for template extensions.
///
/// Owns the [`FunctionRegistry`] that rendering reads from. Functions
/// registered directly on the registry before loading are host functions;
/// an extension may replace them but never a function owned by another
/// loaded extension. Unloading the extension restores the replaced host
/// function.
pub struct ExtensionManager {
    /// Function registry shared with the renderer
    registry: FunctionRegistry,

    /// Loaded extensions by namespace
    extensions: FxHashMap<String, LoadedExtension>,

    /// Function name to owning namespace
    owners: FxHashMap<String, String>,

    /// Extension loading order, teardown runs in reverse
    load_order: Vec<String>,
}

impl ExtensionManager {
    /// Create a new extension manager around an existing registry
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            extensions: FxHashMap::default(),
            owners: FxHashMap::default(),
            load_order: Vec::new(),
        }
    }

    /// Load an extension, returning the names of the functions it registered
    pub fn load_extension(
        &mut self,
        extension: Box<dyn TemplateExtension>,
    ) -> ExtensionResult<Vec<String>> {
        let metadata = extension.metadata();
        let namespace = metadata.namespace.clone();

        metadata
            .validate_namespace()
            .map_err(|reason| ExtensionError::invalid_namespace(&namespace, reason))?;

        if self.extensions.contains_key(&namespace) {
            return Err(ExtensionError::already_registered(&namespace));
        }

        // Register into a scratch registry so a failing extension leaves no trace
        let mut staged = FunctionRegistry::new();
        extension
            .register_functions(&mut staged)
            .map_err(|e| ExtensionError::initialization_failed(&namespace, e.to_string()))?;

        let functions: Vec<String> = staged.names().into_iter().map(str::to_string).collect();
        for function in &functions {
            if let Some(existing) = self.owners.get(function) {
                return Err(ExtensionError::FunctionConflict {
                    namespace: namespace.clone(),
                    function: function.clone(),
                    existing: existing.clone(),
                });
            }
        }

        extension
            .initialize()
            .map_err(|e| ExtensionError::initialization_failed(&namespace, e.to_string()))?;

        let mut displaced = Vec::new();
        for function in &functions {
            if let Some(implementation) = staged.get(function) {
                if let Some(host) = self.registry.get(function) {
                    log::debug!("extension '{namespace}' replaces host function '{function}'");
                    displaced.push(host.clone());
                }
                self.registry.register_arc(implementation.clone());
                self.owners.insert(function.clone(), namespace.clone());
            }
        }

        let mut metadata = metadata.clone();
        metadata.functions = functions.clone();
        log::debug!("loaded extension '{namespace}' with functions {functions:?}");

        self.extensions.insert(
            namespace.clone(),
            LoadedExtension {
                extension,
                metadata,
                displaced,
            },
        );
        self.load_order.push(namespace);

        Ok(functions)
    }

    /// Load one of the bundled extensions by namespace
    pub fn load_builtin(&mut self, namespace: &str) -> ExtensionResult<Vec<String>> {
        let extension = builtin::create(namespace).ok_or_else(|| ExtensionError::not_found(namespace))?;
        self.load_extension(extension)
    }

    /// Load several bundled extensions, reporting each outcome separately.
    ///
    /// A failure does not stop the remaining loads.
    pub fn load_builtins<I, S>(&mut self, namespaces: I) -> IndexMap<String, ExtensionResult<Vec<String>>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        namespaces
            .into_iter()
            .map(|namespace| {
                let namespace = namespace.as_ref();
                let outcome = self.load_builtin(namespace);
                if let Err(err) = &outcome {
                    log::warn!("failed to load extension '{namespace}': {err}");
                }
                (namespace.to_string(), outcome)
            })
            .collect()
    }

    /// Unload an extension and remove the functions it registered
    pub fn unload_extension(&mut self, namespace: &str) -> ExtensionResult<()> {
        let Some(loaded) = self.extensions.get(namespace) else {
            return Err(ExtensionError::not_found(namespace));
        };

        loaded
            .extension
            .cleanup()
            .map_err(|e| ExtensionError::cleanup_failed(namespace, e.to_string()))?;

        self.forget(namespace);
        Ok(())
    }

    /// Clean up every loaded extension in reverse load order.
    ///
    /// All extensions are removed even when some cleanups fail; the failures
    /// are collected and returned.
    pub fn teardown_all(&mut self) -> Vec<ExtensionError> {
        let mut errors = Vec::new();
        let order: Vec<String> = self.load_order.iter().rev().cloned().collect();

        for namespace in order {
            if let Some(loaded) = self.extensions.get(&namespace) {
                if let Err(e) = loaded.extension.cleanup() {
                    log::warn!("cleanup of extension '{namespace}' failed: {e}");
                    errors.push(ExtensionError::cleanup_failed(&namespace, e.to_string()));
                }
            }
            self.forget(&namespace);
        }

        errors
    }

    fn forget(&mut self, namespace: &str) {
        if let Some(loaded) = self.extensions.remove(namespace) {
            for function in &loaded.metadata.functions {
                self.registry.remove(function);
                self.owners.remove(function);
            }
            for host in loaded.displaced {
                self.registry.register_arc(host);
            }
        }
        self.load_order.retain(|ns| ns != namespace);
    }

    /// Get extension metadata by namespace
    pub fn get_extension_metadata(&self, namespace: &str) -> Option<&ExtensionMetadata> {
        self.extensions.get(namespace).map(|loaded| &loaded.metadata)
    }

    /// List all loaded extensions in load order
    pub fn list_extensions(&self) -> Vec<&ExtensionMetadata> {
        self.load_order
            .iter()
            .filter_map(|namespace| self.get_extension_metadata(namespace))
            .collect()
    }

    /// Check if an extension is loaded
    pub fn is_extension_loaded(&self, namespace: &str) -> bool {
        self.extensions.contains_key(namespace)
    }

    /// Get the load order
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    /// Get the function registry
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Get a mutable reference to the function registry
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }
}

impl Default for ExtensionManager {
    fn default() -> Self {
        Self::new(FunctionRegistry::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::registry::function::FunctionResult;
    use parking_lot::Mutex;

    struct Recorder {
        metadata: ExtensionMetadata,
        function: &'static str,
        fail_cleanup: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn new(namespace: &str, function: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                metadata: ExtensionMetadata::new(namespace, namespace, "0.1.0", "recording extension", "tests"),
                function,
                fail_cleanup: false,
                log: log.clone(),
            }
        }
    }

    impl TemplateExtension for Recorder {
        fn metadata(&self) -> &ExtensionMetadata {
            &self.metadata
        }

        fn register_functions(&self, registry: &mut FunctionRegistry) -> ExtensionResult<()> {
            let value = self.metadata.namespace.clone();
            registry.register_fn(self.function, move |_| -> FunctionResult<Value> {
                Ok(Value::from(value.as_str()))
            });
            Ok(())
        }

        fn cleanup(&self) -> ExtensionResult<()> {
            self.log.lock().push(self.metadata.namespace.clone());
            if self.fail_cleanup {
                return Err(ExtensionError::cleanup_failed(&self.metadata.namespace, "boom"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_load_and_unload() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ExtensionManager::default();

        let functions = manager
            .load_extension(Box::new(Recorder::new("alpha", "hello", &log)))
            .unwrap();
        assert_eq!(functions, vec!["hello".to_string()]);
        assert!(manager.is_extension_loaded("alpha"));
        assert!(manager.registry().contains("hello"));
        assert_eq!(
            manager.get_extension_metadata("alpha").unwrap().functions,
            vec!["hello".to_string()]
        );

        manager.unload_extension("alpha").unwrap();
        assert!(!manager.is_extension_loaded("alpha"));
        assert!(!manager.registry().contains("hello"));
        assert_eq!(*log.lock(), vec!["alpha".to_string()]);
        assert_eq!(
            manager.unload_extension("alpha"),
            Err(ExtensionError::not_found("alpha"))
        );
    }

    #[test]
    fn test_duplicate_and_invalid_namespace() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ExtensionManager::default();

        manager
            .load_extension(Box::new(Recorder::new("alpha", "a", &log)))
            .unwrap();
        assert_eq!(
            manager.load_extension(Box::new(Recorder::new("alpha", "b", &log))),
            Err(ExtensionError::already_registered("alpha"))
        );
        assert!(matches!(
            manager.load_extension(Box::new(Recorder::new("system", "c", &log))),
            Err(ExtensionError::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn test_function_conflict_leaves_registry_untouched() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ExtensionManager::default();

        manager
            .load_extension(Box::new(Recorder::new("alpha", "same", &log)))
            .unwrap();
        let err = manager
            .load_extension(Box::new(Recorder::new("beta", "same", &log)))
            .unwrap_err();

        assert_eq!(
            err,
            ExtensionError::FunctionConflict {
                namespace: "beta".into(),
                function: "same".into(),
                existing: "alpha".into(),
            }
        );
        assert!(!manager.is_extension_loaded("beta"));
        let same = manager.registry().get("same").unwrap();
        assert_eq!(same.evaluate(&[]), Ok(Value::from("alpha")));
    }

    #[test]
    fn test_teardown_reverse_order_collects_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ExtensionManager::default();

        let mut failing = Recorder::new("first", "one", &log);
        failing.fail_cleanup = true;
        manager.load_extension(Box::new(failing)).unwrap();
        manager
            .load_extension(Box::new(Recorder::new("second", "two", &log)))
            .unwrap();
        assert_eq!(manager.load_order(), ["first", "second"]);

        let errors = manager.teardown_all();

        assert_eq!(*log.lock(), vec!["second".to_string(), "first".to_string()]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ExtensionError::CleanupFailed { namespace, .. } if namespace == "first"));
        assert!(manager.list_extensions().is_empty());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn test_unload_restores_replaced_host_function() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FunctionRegistry::new();
        registry.register_fn("greet", |_| Ok(Value::from("host")));
        registry.register_fn("other", |_| Ok(Value::Integer(1)));
        let mut manager = ExtensionManager::new(registry);

        manager
            .load_extension(Box::new(Recorder::new("alpha", "greet", &log)))
            .unwrap();
        let greet = manager.registry().get("greet").unwrap();
        assert_eq!(greet.evaluate(&[]), Ok(Value::from("alpha")));

        manager.unload_extension("alpha").unwrap();
        let greet = manager.registry().get("greet").unwrap();
        assert_eq!(greet.evaluate(&[]), Ok(Value::from("host")));
        assert_eq!(manager.registry().names(), vec!["greet", "other"]);
    }

    #[test]
    fn test_load_builtins_reports_each_outcome() {
        let mut manager = ExtensionManager::default();
        let outcomes = manager.load_builtins(["math", "nope", "text"]);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes["math"], Ok(vec!["sum_list".to_string()]));
        assert_eq!(outcomes["nope"], Err(ExtensionError::not_found("nope")));
        assert!(outcomes["text"].is_ok());
        assert_eq!(manager.load_order(), ["math", "text"]);
    }
}
