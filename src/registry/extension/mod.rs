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

//! Extension system for template functions
//!
//! An extension bundles a set of [`TemplateFunction`](crate::registry::TemplateFunction)s
//! under a namespace. The [`ExtensionManager`] loads extensions into a
//! [`FunctionRegistry`], calls their lifecycle hooks, and tears them down in
//! reverse load order.

pub mod builtin;
pub mod error;
pub mod manager;
pub mod metadata;

pub use error::{ExtensionError, ExtensionResult};
pub use manager::ExtensionManager;
pub use metadata::ExtensionMetadata;

use crate::registry::function::FunctionRegistry;

/// Trait for implementing template extensions
pub trait TemplateExtension: Send + Sync {
    /// Get extension metadata
    fn metadata(&self) -> &ExtensionMetadata;

    /// Register extension functions
    fn register_functions(&self, registry: &mut FunctionRegistry) -> ExtensionResult<()>;

    /// Initialize extension (called after registration)
    fn initialize(&self) -> ExtensionResult<()> {
        Ok(())
    }

    /// Cleanup extension resources (called on unload and teardown)
    fn cleanup(&self) -> ExtensionResult<()> {
        Ok(())
    }
}
