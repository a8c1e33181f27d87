// Copyright 2026 Tablefunc Contributors
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

//! Execution-time parameter bag
//!
//! Carries the positional values bound by the host compiler plus the merged
//! named-parameter map (native parameters merged with virtual parameters).
//! Token expansion and effective-type finalization both resolve names
//! against this map.

use rustc_hash::FxHashMap;

use crate::core::Value;

use super::registry::VirtualParameter;

/// Parameters supplied for one query execution
#[derive(Debug, Clone, Default)]
pub struct QueryParameters {
    positional: Vec<Value>,
    named: FxHashMap<String, VirtualParameter>,
}

impl QueryParameters {
    /// Create an empty parameter bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag with positional values only
    pub fn with_positional(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: FxHashMap::default(),
        }
    }

    /// Positional values in order
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The merged named-parameter map
    pub fn named_parameters(&self) -> &FxHashMap<String, VirtualParameter> {
        &self.named
    }

    /// Look up a named parameter
    pub fn named_parameter(&self, name: &str) -> Option<&VirtualParameter> {
        self.named.get(name)
    }

    /// Insert a named parameter, replacing any entry with the same name
    pub fn insert_named(&mut self, parameter: VirtualParameter) {
        self.named.insert(parameter.name().to_string(), parameter);
    }

    /// Merge parameters into the named map; later entries win on collision
    pub fn merge_named(&mut self, parameters: impl IntoIterator<Item = VirtualParameter>) {
        for parameter in parameters {
            self.insert_named(parameter);
        }
    }
}
