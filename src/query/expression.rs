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

//! Query expressions and virtual-parameter augmentation
//!
//! The host owns expression translation. This layer only wraps a host
//! expression so that the registered virtual parameters travel with it into
//! the compile pipeline: descriptors join the host's named descriptors and
//! values join the execution-time parameter map.

use std::any::Any;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::Result;
use crate::params::{ParameterDescriptor, VirtualParameter};

use super::session::SessionContext;

/// Opaque translated syntax tree, produced and consumed by the host
pub struct SyntaxTree(Box<dyn Any + Send>);

impl SyntaxTree {
    pub fn new<T: Any + Send>(tree: T) -> Self {
        Self(Box::new(tree))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SyntaxTree(..)")
    }
}

/// A query expression the host compiler can translate
pub trait QueryExpression: Send + Sync {
    /// Cache key identifying the translated form
    fn key(&self) -> &str;

    /// Named parameters the expression declares, native first
    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor>;

    /// Execution-time values for the expression's named parameters
    fn parameter_values_by_name(&self) -> FxHashMap<String, VirtualParameter>;

    /// Translate into the host's syntax tree
    fn translate(&self, context: &SessionContext, is_filter: bool) -> Result<SyntaxTree>;

    fn as_any(&self) -> &dyn Any;
}

/// A host expression augmented with virtual parameters
///
/// Translation is delegated to the wrapped expression unchanged; only the
/// parameter surface grows. On a name collision the native declaration wins
/// for the descriptor and the virtual value wins for the execution-time map,
/// so a host-declared parameter keeps its host typing while the virtual
/// registration still supplies the value the host never received.
pub struct AugmentedExpression {
    host: Box<dyn QueryExpression>,
    virtual_parameters: Vec<VirtualParameter>,
}

impl AugmentedExpression {
    pub fn new(host: Box<dyn QueryExpression>, virtual_parameters: Vec<VirtualParameter>) -> Self {
        Self {
            host,
            virtual_parameters,
        }
    }

    /// The virtual parameters carried by this expression
    pub fn virtual_parameters(&self) -> &[VirtualParameter] {
        &self.virtual_parameters
    }

    /// The wrapped host expression
    pub fn host(&self) -> &dyn QueryExpression {
        self.host.as_ref()
    }
}

impl QueryExpression for AugmentedExpression {
    fn key(&self) -> &str {
        self.host.key()
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        let mut descriptors = self.host.parameter_descriptors();
        let native: FxHashSet<String> =
            descriptors.iter().map(|d| d.name().to_string()).collect();
        for parameter in &self.virtual_parameters {
            if !native.contains(parameter.name()) {
                descriptors.push(parameter.descriptor());
            }
        }
        descriptors
    }

    fn parameter_values_by_name(&self) -> FxHashMap<String, VirtualParameter> {
        let mut values = self.host.parameter_values_by_name();
        for parameter in &self.virtual_parameters {
            values.insert(parameter.name().to_string(), parameter.clone());
        }
        values
    }

    fn translate(&self, context: &SessionContext, is_filter: bool) -> Result<SyntaxTree> {
        self.host.translate(context, is_filter)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
