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

//! Extension metadata types

use serde::{Deserialize, Serialize};

/// Metadata describing a template extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    /// Extension namespace (e.g., "math", "text")
    pub namespace: String,

    /// Human-readable extension name
    pub name: String,

    /// Extension version (semantic version)
    pub version: String,

    /// Extension description
    pub description: String,

    /// Extension author
    pub author: String,

    /// Functions provided by this extension, filled in when loaded
    pub functions: Vec<String>,
}

impl ExtensionMetadata {
    /// Create a new extension metadata
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
            description: description.into(),
            author: author.into(),
            functions: Vec::new(),
        }
    }

    /// Check if the namespace is valid
    pub fn validate_namespace(&self) -> Result<(), String> {
        let namespace = &self.namespace;

        let Some(first) = namespace.chars().next() else {
            return Err("Namespace cannot be empty".to_string());
        };

        if !first.is_ascii_alphabetic() {
            return Err("Namespace must start with a letter".to_string());
        }

        if !namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(
                "Namespace can only contain letters, digits, hyphens, and underscores".to_string(),
            );
        }

        const RESERVED: &[&str] = &["core", "std", "builtin", "system"];
        if RESERVED.contains(&namespace.as_str()) {
            return Err(format!("Namespace '{namespace}' is reserved"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(namespace: &str) -> ExtensionMetadata {
        ExtensionMetadata::new(namespace, "Test", "1.0.0", "test", "tester")
    }

    #[test]
    fn test_namespace_validation() {
        assert!(metadata("math").validate_namespace().is_ok());
        assert!(metadata("my-ext_2").validate_namespace().is_ok());
        assert!(metadata("").validate_namespace().is_err());
        assert!(metadata("2fast").validate_namespace().is_err());
        assert!(metadata("a.b").validate_namespace().is_err());
        assert_eq!(
            metadata("core").validate_namespace(),
            Err("Namespace 'core' is reserved".to_string())
        );
    }
}
