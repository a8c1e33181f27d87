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

//! Per-query registry of caller-supplied virtual parameters
//!
//! The registry lives with the query builder and is frozen by `snapshot()`
//! when compilation starts; nothing can be registered after that.

use crate::core::{DataType, Error, Result, Value};

use super::convert::ToParam;
use super::descriptor::ParameterDescriptor;

/// A name/value/type triple the host compiler does not natively recognize
/// as part of the query's parameter set
///
/// Identity is the name. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualParameter {
    name: String,
    value: Value,
    expected_type: DataType,
    is_collection: bool,
}

impl VirtualParameter {
    /// Create a scalar virtual parameter
    pub fn new(name: impl Into<String>, value: Value, expected_type: DataType) -> Self {
        Self {
            name: name.into(),
            value,
            expected_type,
            is_collection: false,
        }
    }

    /// Create a collection-shaped virtual parameter
    ///
    /// The flag only describes the descriptor shape; expansion of collection
    /// values into multiple positions is the engine's concern.
    pub fn collection(name: impl Into<String>, value: Value, expected_type: DataType) -> Self {
        Self {
            is_collection: true,
            ..Self::new(name, value, expected_type)
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Declared type of the parameter
    pub fn expected_type(&self) -> DataType {
        self.expected_type
    }

    /// Whether the parameter is collection-shaped
    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    /// Derive the metadata descriptor for this parameter
    pub fn descriptor(&self) -> ParameterDescriptor {
        ParameterDescriptor::new(self.name.clone(), self.expected_type, self.is_collection)
    }
}

/// Caller-populated set of virtual parameters for a single query
#[derive(Debug, Default)]
pub struct VirtualParameterRegistry {
    parameters: Vec<VirtualParameter>,
    finalized: bool,
}

impl VirtualParameterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a virtual parameter
    ///
    /// Re-registering the same name with an equal value is a no-op.
    /// Re-registering with a different value fails with
    /// [`Error::ParameterConflict`]. Registration after `snapshot()` fails
    /// with [`Error::RegistryFinalized`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        value: Value,
        expected_type: DataType,
    ) -> Result<()> {
        if self.finalized {
            return Err(Error::RegistryFinalized);
        }

        let name = name.into();
        if let Some(existing) = self.parameters.iter().find(|p| p.name == name) {
            if *existing.value() == value {
                return Ok(());
            }
            return Err(Error::parameter_conflict(name));
        }

        self.parameters
            .push(VirtualParameter::new(name, value, expected_type));
        Ok(())
    }

    /// Register a virtual parameter from a plain Rust value,
    /// guessing the expected type from the converted value
    pub fn register_value<T: ToParam>(&mut self, name: impl Into<String>, value: T) -> Result<()> {
        let value = value.to_param();
        let expected_type = value.data_type();
        self.register(name, value, expected_type)
    }

    /// Number of registered parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// View the registered parameters in registration order
    pub fn parameters(&self) -> &[VirtualParameter] {
        &self.parameters
    }

    /// Freeze the registry and return the set used for compilation
    ///
    /// May be called at most once per query build; a second call fails with
    /// [`Error::RegistryFinalized`].
    pub fn snapshot(&mut self) -> Result<Vec<VirtualParameter>> {
        if self.finalized {
            return Err(Error::RegistryFinalized);
        }
        self.finalized = true;
        Ok(self.parameters.clone())
    }
}
