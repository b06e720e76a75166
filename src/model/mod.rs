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

//! Value model for template documents
//!
//! Every piece of data that flows through the engine (context bindings,
//! evaluation results and rendered output) is a [`Value`]. Numeric
//! conversions used by arithmetic and indexing live in [`coercion`].

pub mod coercion;
pub mod value;

pub use coercion::{Numeric, to_index, to_numeric};
pub use value::{Object, Value};
