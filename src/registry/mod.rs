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

//! Function registry and extension system
//!
//! Template expressions call functions by name through a [`FunctionRegistry`].
//! Functions are usually contributed by extensions loaded with an
//! [`ExtensionManager`].

pub mod extension;
pub mod function;

pub use extension::{
    ExtensionError, ExtensionManager, ExtensionMetadata, ExtensionResult, TemplateExtension,
};
pub use function::{FunctionError, FunctionRegistry, FunctionResult, TemplateFunction};

/// Create a registry with every bundled extension loaded
pub fn create_standard_manager() -> ExtensionManager {
    let mut manager = ExtensionManager::default();
    for (namespace, outcome) in manager.load_builtins(extension::builtin::available()) {
        if let Err(e) = outcome {
            log::error!("bundled extension '{namespace}' failed to load: {e}");
        }
    }
    manager
}
