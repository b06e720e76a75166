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

//! Error types for the extension system

use thiserror::Error;

/// Result type for extension operations
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Errors that can occur in the extension system
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtensionError {
    /// Extension already loaded
    #[error("Extension '{namespace}' is already registered")]
    AlreadyRegistered {
        /// The namespace that is already registered
        namespace: String,
    },

    /// Extension not loaded, or no builtin with that name
    #[error("Extension '{namespace}' not found")]
    NotFound {
        /// The namespace that was not found
        namespace: String,
    },

    /// Invalid extension namespace
    #[error("Invalid extension namespace '{namespace}': {reason}")]
    InvalidNamespace {
        /// The invalid namespace
        namespace: String,
        /// Reason why the namespace is invalid
        reason: String,
    },

    /// Function already provided by another extension
    #[error("Function '{function}' from '{namespace}' conflicts with extension '{existing}'")]
    FunctionConflict {
        /// The namespace being loaded
        namespace: String,
        /// The conflicting function name
        function: String,
        /// Namespace that already provides the function
        existing: String,
    },

    /// Extension initialization failed
    #[error("Extension '{namespace}' initialization failed: {reason}")]
    InitializationFailed {
        /// The namespace that failed to initialize
        namespace: String,
        /// Reason for initialization failure
        reason: String,
    },

    /// Extension cleanup failed
    #[error("Extension '{namespace}' cleanup failed: {reason}")]
    CleanupFailed {
        /// The namespace that failed to cleanup
        namespace: String,
        /// Reason for cleanup failure
        reason: String,
    },
}

impl ExtensionError {
    /// Create an already registered error
    pub fn already_registered(namespace: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            namespace: namespace.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(namespace: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
        }
    }

    /// Create an invalid namespace error
    pub fn invalid_namespace(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNamespace {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InitializationFailed {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Create a cleanup failed error
    pub fn cleanup_failed(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CleanupFailed {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}
