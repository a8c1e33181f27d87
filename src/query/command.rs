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

//! The final executable command
//!
//! A `SqlCommand` only exists once the compile pipeline has reached its
//! terminal state: the template is fully rewritten and every specification
//! carries its effective expected type. Binding runs from here and nowhere
//! else.

use crate::core::{CancellationHandle, Error, Result};
use crate::params::specification::{AsyncCommand, Command, ParameterSpecification};
use crate::params::QueryParameters;
use crate::sql::SqlTemplate;

/// A fully rewritten statement plus everything needed to bind it
#[derive(Debug)]
pub struct SqlCommand {
    template: SqlTemplate,
    specifications: Vec<Box<dyn ParameterSpecification>>,
    query_parameters: QueryParameters,
}

impl SqlCommand {
    /// Assemble a command from a final template, its bind list, and the
    /// execution-time parameters
    pub fn new(
        template: SqlTemplate,
        specifications: Vec<Box<dyn ParameterSpecification>>,
        query_parameters: QueryParameters,
    ) -> Self {
        Self {
            template,
            specifications,
            query_parameters,
        }
    }

    /// The final SQL text
    pub fn sql(&self) -> String {
        self.template.to_sql()
    }

    /// The final template
    pub fn template(&self) -> &SqlTemplate {
        &self.template
    }

    /// The specifications that will drive binding, in bind order
    pub fn specifications(&self) -> &[Box<dyn ParameterSpecification>] {
        &self.specifications
    }

    /// Total number of placeholder positions in the final template
    pub fn parameter_count(&self) -> usize {
        self.template.parameter_count()
    }

    /// The execution-time parameters this command was built from
    pub fn query_parameters(&self) -> &QueryParameters {
        &self.query_parameters
    }

    /// Bind every specification against the final template
    pub fn bind(&self, command: &mut dyn Command) -> Result<()> {
        for specification in &self.specifications {
            specification.bind(command, &self.template)?;
        }
        Ok(())
    }

    /// Asynchronous variant of [`bind`](Self::bind)
    ///
    /// Checks cancellation before the whole operation starts and fails with
    /// [`Error::Cancelled`] without issuing any bind when cancellation was
    /// already requested.
    pub async fn bind_async(
        &self,
        command: &mut (dyn AsyncCommand + Send),
        cancellation: &CancellationHandle,
    ) -> Result<()> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        for specification in &self.specifications {
            specification
                .bind_async(command, &self.template, cancellation)
                .await?;
        }
        Ok(())
    }
}
