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

//! Query providers: the caller-facing entry point
//!
//! Callers register virtual parameters on the provider before the query is
//! prepared. Registration on a provider that does not carry a registry is a
//! hard error rather than a silent drop, since the parameter value would
//! otherwise never reach the command.

use std::any::Any;

use crate::core::{CancellationHandle, DataType, Error, Result, Row, Value};
use crate::params::{
    ParameterMetadata, QueryParameters, ToParam, VirtualParameterRegistry,
};

use super::command::SqlCommand;
use super::expression::{AugmentedExpression, QueryExpression};
use super::session::SessionContext;
use super::translator::QueryTranslator;

/// Turns expressions into prepared queries
pub trait QueryProvider: Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Compile an expression into a prepared query
    fn prepare(
        &mut self,
        expression: Box<dyn QueryExpression>,
        context: &SessionContext,
    ) -> Result<PreparedQuery>;
}

/// Register a virtual parameter on a provider
///
/// Fails with [`Error::UnsupportedProvider`] when the provider is not a
/// [`VirtualQueryProvider`].
pub fn set_virtual_parameter(
    provider: &mut dyn QueryProvider,
    name: impl Into<String>,
    value: Value,
    expected_type: DataType,
) -> Result<()> {
    let Some(provider) = provider
        .as_any_mut()
        .downcast_mut::<VirtualQueryProvider>()
    else {
        return Err(Error::UnsupportedProvider);
    };
    provider.set_parameter(name, value, expected_type)
}

/// Provider carrying a per-query virtual-parameter registry
#[derive(Debug, Default)]
pub struct VirtualQueryProvider {
    registry: VirtualParameterRegistry,
}

impl VirtualQueryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a virtual parameter for the next prepared query
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: Value,
        expected_type: DataType,
    ) -> Result<()> {
        self.registry.register(name, value, expected_type)
    }

    /// Register a virtual parameter from a plain Rust value
    pub fn set_parameter_value<T: ToParam>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<()> {
        self.registry.register_value(name, value)
    }

    /// The parameters registered so far
    pub fn registry(&self) -> &VirtualParameterRegistry {
        &self.registry
    }
}

impl QueryProvider for VirtualQueryProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn prepare(
        &mut self,
        expression: Box<dyn QueryExpression>,
        context: &SessionContext,
    ) -> Result<PreparedQuery> {
        let expression: Box<dyn QueryExpression> = if self.registry.is_empty() {
            expression
        } else {
            Box::new(AugmentedExpression::new(expression, self.registry.snapshot()?))
        };

        let translators =
            context
                .translator_factory()
                .create_translators(expression.as_ref(), None, false, context)?;
        if translators.is_empty() {
            return Err(Error::NoTranslators);
        }
        Ok(PreparedQuery::new(expression, translators))
    }
}

/// A compiled query ready to run
pub struct PreparedQuery {
    expression: Box<dyn QueryExpression>,
    translators: Vec<Box<dyn QueryTranslator>>,
}

impl std::fmt::Debug for PreparedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("translators", &self.translators.len())
            .finish_non_exhaustive()
    }
}

impl PreparedQuery {
    pub fn new(
        expression: Box<dyn QueryExpression>,
        translators: Vec<Box<dyn QueryTranslator>>,
    ) -> Self {
        Self {
            expression,
            translators,
        }
    }

    /// The expression this query was prepared from
    pub fn expression(&self) -> &dyn QueryExpression {
        self.expression.as_ref()
    }

    /// The compiled translators, one per query unit
    pub fn translators(&self) -> &[Box<dyn QueryTranslator>] {
        &self.translators
    }

    fn first_translator(&self) -> Result<&dyn QueryTranslator> {
        self.translators
            .first()
            .map(|t| t.as_ref())
            .ok_or(Error::NoTranslators)
    }

    /// Parameter metadata of the compiled query
    pub fn parameter_metadata(&self) -> Result<ParameterMetadata> {
        Ok(self.first_translator()?.build_parameter_metadata())
    }

    /// Build the execution-time parameter bag
    ///
    /// The named map is the expression's merged view, so virtual values are
    /// already present.
    pub fn query_parameters(&self, positional: Vec<Value>) -> QueryParameters {
        let mut parameters = QueryParameters::with_positional(positional);
        parameters.merge_named(self.expression.parameter_values_by_name().into_values());
        parameters
    }

    /// Build the final bindable command without executing it
    pub fn create_command(
        &self,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<SqlCommand> {
        self.first_translator()?
            .loader()?
            .create_command(parameters, context)
    }

    /// Run the query and collect rows from every translator
    pub fn list(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        for translator in &self.translators {
            rows.extend(translator.list(context, parameters)?);
        }
        Ok(rows)
    }

    /// Run the query and stream rows, translators in order
    pub fn enumerate(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<Box<dyn Iterator<Item = Row> + Send>> {
        let mut iterators = Vec::with_capacity(self.translators.len());
        for translator in &self.translators {
            iterators.push(translator.enumerate(context, parameters)?);
        }
        Ok(Box::new(iterators.into_iter().flatten()))
    }

    /// Run a manipulation statement, summing affected rows across
    /// translators
    pub fn execute_update(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<u64> {
        let mut affected = 0;
        for translator in &self.translators {
            affected += translator.execute_update(context, parameters)?;
        }
        Ok(affected)
    }

    /// Asynchronous variant of [`list`](Self::list)
    pub async fn list_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<Vec<Row>> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut rows = Vec::new();
        for translator in &self.translators {
            rows.extend(
                translator
                    .list_async(context, parameters, cancellation)
                    .await?,
            );
        }
        Ok(rows)
    }

    /// Asynchronous variant of [`execute_update`](Self::execute_update)
    pub async fn execute_update_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<u64> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut affected = 0;
        for translator in &self.translators {
            affected += translator
                .execute_update_async(context, parameters, cancellation)
                .await?;
        }
        Ok(affected)
    }
}
