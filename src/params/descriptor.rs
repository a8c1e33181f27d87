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

//! Parameter descriptors and compiled parameter metadata
//!
//! Descriptors are the shape the host compiler's metadata validation
//! expects; one is derived 1:1 from each virtual parameter. Metadata merging
//! never lets a virtual descriptor override a native descriptor of the same
//! name.

use crate::core::DataType;

use super::registry::VirtualParameter;

/// Metadata shape of a single named parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    expected_type: DataType,
    is_collection: bool,
}

impl ParameterDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, expected_type: DataType, is_collection: bool) -> Self {
        Self {
            name: name.into(),
            expected_type,
            is_collection,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn expected_type(&self) -> DataType {
        self.expected_type
    }

    /// Whether the parameter is collection-shaped
    pub fn is_collection(&self) -> bool {
        self.is_collection
    }
}

/// Compiled parameter metadata: ordinal positions plus named descriptors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterMetadata {
    ordinal_count: usize,
    named: Vec<ParameterDescriptor>,
}

impl ParameterMetadata {
    /// Create metadata from an ordinal count and named descriptors
    pub fn new(ordinal_count: usize, named: Vec<ParameterDescriptor>) -> Self {
        Self {
            ordinal_count,
            named,
        }
    }

    /// Number of positional parameters
    pub fn ordinal_parameter_count(&self) -> usize {
        self.ordinal_count
    }

    /// Named descriptors in declaration order
    pub fn named_descriptors(&self) -> &[ParameterDescriptor] {
        &self.named
    }

    /// Names of all named parameters
    pub fn named_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.named.iter().map(|d| d.name())
    }

    /// Look up a named descriptor
    pub fn named_descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.named.iter().find(|d| d.name() == name)
    }

    /// Check whether a named descriptor exists
    pub fn contains_named(&self, name: &str) -> bool {
        self.named_descriptor(name).is_some()
    }

    /// Merge virtual parameters into this metadata
    ///
    /// Existing (native) descriptors always win on name collision; each name
    /// appears exactly once in the result.
    pub fn expand_with(&self, virtual_parameters: &[VirtualParameter]) -> ParameterMetadata {
        let mut named = self.named.clone();
        for parameter in virtual_parameters {
            if !self.contains_named(parameter.name()) {
                named.push(parameter.descriptor());
            }
        }
        ParameterMetadata::new(self.ordinal_count, named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn native() -> ParameterMetadata {
        ParameterMetadata::new(
            2,
            vec![
                ParameterDescriptor::new("limit", DataType::Integer, false),
                ParameterDescriptor::new("name", DataType::Text, false),
            ],
        )
    }

    #[test]
    fn test_lookup() {
        let metadata = native();
        assert_eq!(metadata.ordinal_parameter_count(), 2);
        assert!(metadata.contains_named("limit"));
        assert!(!metadata.contains_named("missing"));
        assert_eq!(
            metadata.named_descriptor("name").unwrap().expected_type(),
            DataType::Text
        );
    }

    #[test]
    fn test_expand_with_appends_virtuals() {
        let virtuals = vec![
            VirtualParameter::new("startDate", Value::text("2024-01-01"), DataType::Text),
            VirtualParameter::new("endDate", Value::text("2024-01-08"), DataType::Text),
        ];
        let expanded = native().expand_with(&virtuals);
        assert_eq!(expanded.named_descriptors().len(), 4);
        assert!(expanded.contains_named("startDate"));
        assert!(expanded.contains_named("endDate"));
        // ordinal parameters are untouched
        assert_eq!(expanded.ordinal_parameter_count(), 2);
    }

    #[test]
    fn test_native_wins_on_collision() {
        let virtuals = vec![VirtualParameter::new(
            "limit",
            Value::text("10"),
            DataType::Text,
        )];
        let expanded = native().expand_with(&virtuals);
        // still exactly one descriptor per name, and the native type survives
        assert_eq!(expanded.named_descriptors().len(), 2);
        assert_eq!(
            expanded.named_descriptor("limit").unwrap().expected_type(),
            DataType::Integer
        );
    }
}
