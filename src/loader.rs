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

//! Reading templates, contexts and configuration from disk
//!
//! Files ending in `.json` are parsed as JSON; every other file is read as
//! YAML, which also accepts plain JSON.

use crate::config::RenderConfig;
use crate::error::{Result, RjsonError};
use crate::evaluator::Context;
use crate::model::Value;
use crate::registry::FunctionRegistry;
use crate::renderer::Renderer;
use std::fs;
use std::path::Path;

/// Document encoding of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl Format {
    /// Pick the format from the file extension: `.json` is JSON, anything else YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

fn read_document(path: &Path, format: Format) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).map_err(|source| RjsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        Format::Json => serde_json::from_str(&text).map_err(|source| RjsonError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(&text).map_err(|source| RjsonError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a template document, choosing JSON or YAML by extension
pub fn load_template(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    load_template_as(path, Format::from_path(path))
}

/// Load a template document in an explicit format
pub fn load_template_as(path: impl AsRef<Path>, format: Format) -> Result<Value> {
    let path = path.as_ref();
    log::debug!("loading {format:?} template from {}", path.display());
    read_document(path, format).map(Value::from)
}

/// Load an initial context from a JSON or YAML file.
///
/// The file must hold an object (or `null` for an empty context). A `_set`
/// member becomes the hoisted layer.
pub fn load_context(path: impl AsRef<Path>) -> Result<Context> {
    let path = path.as_ref();
    log::debug!("loading context from {}", path.display());
    let value = Value::from(read_document(path, Format::from_path(path))?);
    let actual = value.type_name();
    Context::from_value(value).ok_or(RjsonError::InvalidContext { actual })
}

/// Load a [`RenderConfig`]; missing fields keep their defaults
pub fn load_config(path: impl AsRef<Path>) -> Result<RenderConfig> {
    let path = path.as_ref();
    let document = read_document(path, Format::from_path(path))?;
    serde_json::from_value(document).map_err(|source| RjsonError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a template file and render it with the default configuration
pub fn render_file(
    path: impl AsRef<Path>,
    context: &Context,
    functions: &FunctionRegistry,
) -> Result<Value> {
    let template = load_template(path)?;
    Ok(Renderer::new(functions).render(&template, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("rjson-")
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.tpl")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("template")), Format::Yaml);
    }

    #[test]
    fn test_render_file() {
        let file = temp_file(".json", r#"{"greeting": "Hello $name"}"#);
        let context = Context::new().with("name", "Ada");
        let rendered = render_file(file.path(), &context, &FunctionRegistry::new()).unwrap();
        assert_eq!(rendered.get("greeting"), Some(&Value::from("Hello Ada")));
    }

    #[test]
    fn test_render_yaml_file() {
        let file = temp_file(
            ".yaml",
            "_set:\n  who: world\ngreeting: Hello $who\nitems:\n  - 1\n  - 2.5\n",
        );
        let rendered = render_file(file.path(), &Context::new(), &FunctionRegistry::new()).unwrap();
        assert_eq!(rendered.get("greeting"), Some(&Value::from("Hello world")));
        assert_eq!(
            rendered.get("items"),
            Some(&Value::Array(vec![Value::Integer(1), Value::Float(2.5)]))
        );
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let file = temp_file(".json", "a: 1\n");
        assert!(matches!(
            load_template(file.path()),
            Err(RjsonError::Json { .. })
        ));
        let template = load_template_as(file.path(), Format::Yaml).unwrap();
        assert_eq!(template.get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_load_context_with_hoisted_layer() {
        let file = temp_file(".json", r#"{"a": 1, "_set": {"b": 2}}"#);
        let context = load_context(file.path()).unwrap();
        assert_eq!(context.resolve("a").into_owned(), Value::Integer(1));
        assert_eq!(context.resolve("b").into_owned(), Value::Integer(2));
    }

    #[test]
    fn test_load_context_rejects_non_object() {
        let file = temp_file(".yml", "- 1\n- 2\n");
        let err = load_context(file.path()).unwrap_err();
        assert!(matches!(err, RjsonError::InvalidContext { actual: "array" }));
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let missing = dir.path().join("missing.json");
        assert_eq!(load_template(&missing).unwrap_err().kind(), ErrorKind::Io);

        let file = temp_file(".json", "{not json");
        assert!(matches!(
            load_template(file.path()),
            Err(RjsonError::Json { .. })
        ));

        let file = temp_file(".yaml", "a: [1, 2\n");
        let err = load_template(file.path()).unwrap_err();
        assert!(matches!(err, RjsonError::Yaml { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_config_partial() {
        let file = temp_file(".json", r#"{"max_depth": 8}"#);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_iterations, RenderConfig::default().max_iterations);

        let file = temp_file(".yaml", "max_expression_depth: 16\nextended_operators: true\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.max_expression_depth, 16);
        assert!(config.extended_operators);
        assert_eq!(config.max_depth, RenderConfig::default().max_depth);
    }
}
