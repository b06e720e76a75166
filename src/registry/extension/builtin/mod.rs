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

//! Extensions bundled with the crate

pub mod cache;
pub mod math;
pub mod text;

pub use cache::CacheExtension;
pub use math::MathExtension;
pub use text::TextExtension;

use super::TemplateExtension;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

type Constructor = fn() -> Box<dyn TemplateExtension>;

static CATALOG: Lazy<IndexMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut catalog: IndexMap<&'static str, Constructor> = IndexMap::new();
    catalog.insert("cache", || Box::new(CacheExtension::new()));
    catalog.insert("math", || Box::new(MathExtension::new()));
    catalog.insert("text", || Box::new(TextExtension::new()));
    catalog
});

/// Namespaces of the bundled extensions
pub fn available() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}

/// Create a fresh instance of a bundled extension
pub fn create(namespace: &str) -> Option<Box<dyn TemplateExtension>> {
    CATALOG.get(namespace).map(|constructor| constructor())
}
