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

//! Parameter specifications and bind-time resolution
//!
//! One specification exists per virtual parameter, not per occurrence; at
//! bind time it resolves every placeholder position tagged with its
//! backtrack id in the final template and binds the stored value/type at
//! each position in ascending order.

use std::fmt;

use async_trait::async_trait;
use smallvec::SmallVec;

use crate::core::{CancellationHandle, DataType, Error, Result, Value};
use crate::sql::template::{BacktrackId, SqlTemplate};

use super::query_parameters::QueryParameters;
use super::registry::VirtualParameter;

/// Target of a synchronous bind: the host's final command object
pub trait Command {
    /// Type-aware "safe set" of one parameter position
    fn set_parameter(&mut self, position: usize, value: &Value, expected_type: DataType)
        -> Result<()>;
}

/// Target of an asynchronous bind
#[async_trait]
pub trait AsyncCommand: Send {
    /// Type-aware "safe set" of one parameter position
    async fn set_parameter(
        &mut self,
        position: usize,
        value: &Value,
        expected_type: DataType,
    ) -> Result<()>;
}

/// A parameter the final command must bind
///
/// Implemented by this layer for virtual parameters and by the host for its
/// own specifications (filter parameters, limits). Both flow through the
/// same list so later rewriting passes see virtual positions as already
/// claimed.
#[async_trait]
pub trait ParameterSpecification: fmt::Debug + Send + Sync {
    /// The type the value will be bound as
    fn expected_type(&self) -> DataType;

    /// Backtrack ids identifying this specification's template positions
    fn backtrack_ids(&self) -> SmallVec<[BacktrackId; 1]>;

    /// Human-readable description for diagnostics
    fn display_info(&self) -> String;

    /// Recompute the effective expected type after all template rewriting
    ///
    /// Runs once, last, because some types are only inferable from the
    /// execution-time values. Default is a no-op.
    fn reset_effective_type(&mut self, _query_parameters: &QueryParameters) {}

    /// Bind the value at every matching position of the final template
    fn bind(&self, command: &mut dyn Command, template: &SqlTemplate) -> Result<()>;

    /// Asynchronous variant of [`bind`](Self::bind) with cooperative
    /// cancellation
    ///
    /// Fails with [`Error::Cancelled`] before issuing any bind when
    /// cancellation was already requested; binds already issued are never
    /// retracted.
    async fn bind_async(
        &self,
        command: &mut (dyn AsyncCommand + Send),
        template: &SqlTemplate,
        cancellation: &CancellationHandle,
    ) -> Result<()>;
}

/// Specification for one virtual parameter
#[derive(Debug, Clone)]
pub struct VirtualParameterSpecification {
    parameter: VirtualParameter,
    expected_type: DataType,
    backtrack: BacktrackId,
}

impl VirtualParameterSpecification {
    /// Create the specification for a registered virtual parameter
    pub fn new(parameter: VirtualParameter) -> Self {
        let backtrack = BacktrackId::for_parameter(parameter.name());
        let expected_type = parameter.expected_type();
        Self {
            parameter,
            expected_type,
            backtrack,
        }
    }

    /// The underlying virtual parameter
    pub fn parameter(&self) -> &VirtualParameter {
        &self.parameter
    }

    /// The backtrack id shared by all of this parameter's positions
    pub fn backtrack_id(&self) -> &BacktrackId {
        &self.backtrack
    }
}

#[async_trait]
impl ParameterSpecification for VirtualParameterSpecification {
    fn expected_type(&self) -> DataType {
        self.expected_type
    }

    fn backtrack_ids(&self) -> SmallVec<[BacktrackId; 1]> {
        let mut ids = SmallVec::new();
        ids.push(self.backtrack.clone());
        ids
    }

    fn display_info(&self) -> String {
        format!("virtual-parameter={}", self.parameter.name())
    }

    fn reset_effective_type(&mut self, query_parameters: &QueryParameters) {
        if !self.expected_type.is_unknown() {
            return;
        }
        if let Some(parameter) = query_parameters.named_parameter(self.parameter.name()) {
            let inferred = parameter.value().data_type();
            if !inferred.is_unknown() {
                self.expected_type = inferred;
            }
        }
    }

    fn bind(&self, command: &mut dyn Command, template: &SqlTemplate) -> Result<()> {
        // the same parameter can appear more than once in the whole query
        for position in template.parameter_locations(&self.backtrack) {
            command.set_parameter(position, self.parameter.value(), self.expected_type)?;
        }
        Ok(())
    }

    async fn bind_async(
        &self,
        command: &mut (dyn AsyncCommand + Send),
        template: &SqlTemplate,
        cancellation: &CancellationHandle,
    ) -> Result<()> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        for position in template.parameter_locations(&self.backtrack) {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }
            command
                .set_parameter(position, self.parameter.value(), self.expected_type)
                .await?;
        }
        Ok(())
    }
}
