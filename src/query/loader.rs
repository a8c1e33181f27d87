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

//! Loaders: turning a compiled template into a bindable command
//!
//! The decorator owns the ordered rewrite pipeline. Virtual markers are
//! expanded before the host splices filter SQL, the expansion is re-run
//! afterwards because spliced text can reintroduce markers, and limits and
//! dialect preprocessing come last. Effective expected types are finalized
//! only once no pass can rewrite the template anymore.

use rustc_hash::FxHashSet;

use crate::core::{Error, Result};
use crate::params::specification::ParameterSpecification;
use crate::params::QueryParameters;
use crate::sql::{BacktrackId, SqlTemplate, SqlTokenExpander};

use super::command::SqlCommand;
use super::session::SessionContext;
use super::translator::CompilePhase;

/// Builds the final command for one compiled query
pub trait QueryLoader: Send + Sync {
    /// The compiled template before any loader-stage rewriting
    fn sql_template(&self) -> &SqlTemplate;

    /// Fresh bind list for the host's own parameters, in bind order
    fn parameter_specifications(&self) -> Vec<Box<dyn ParameterSpecification>>;

    /// Splice enabled dynamic filter SQL into the template
    ///
    /// Returns the rewritten template plus specifications for any filter
    /// parameters the splice introduced.
    fn expand_filter_parameters(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)>;

    /// Apply row-limit and offset handling
    fn add_limit_parameters(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)>;

    /// Final dialect-level SQL preprocessing; introduces no parameters
    fn preprocess_sql(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<SqlTemplate>;

    /// Build the bindable command
    fn create_command(
        &self,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<SqlCommand>;
}

/// Loader decorator that resolves virtual-parameter markers around the
/// host's own rewrite passes
pub struct LoaderDecorator {
    host: Box<dyn QueryLoader>,
}

impl LoaderDecorator {
    pub fn new(host: Box<dyn QueryLoader>) -> Self {
        Self { host }
    }
}

impl QueryLoader for LoaderDecorator {
    fn sql_template(&self) -> &SqlTemplate {
        self.host.sql_template()
    }

    fn parameter_specifications(&self) -> Vec<Box<dyn ParameterSpecification>> {
        self.host.parameter_specifications()
    }

    fn expand_filter_parameters(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)> {
        self.host
            .expand_filter_parameters(template, parameters, context)
    }

    fn add_limit_parameters(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)> {
        self.host.add_limit_parameters(template, parameters, context)
    }

    fn preprocess_sql(
        &self,
        template: SqlTemplate,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<SqlTemplate> {
        self.host.preprocess_sql(template, parameters, context)
    }

    fn create_command(
        &self,
        parameters: &QueryParameters,
        context: &SessionContext,
    ) -> Result<SqlCommand> {
        let mut phase = CompilePhase::HostCompiled;
        let expander = SqlTokenExpander::new(parameters.named_parameters(), context.dialect());

        // virtual markers first, so later passes see their positions as
        // placeholders rather than raw text
        let expansion = expander.expand(self.host.sql_template().clone());
        let mut template = expansion.template;
        let mut specifications: Vec<Box<dyn ParameterSpecification>> = expansion
            .specifications
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn ParameterSpecification>)
            .collect();
        specifications.extend(self.host.parameter_specifications());
        phase.advance(CompilePhase::TokenExpanded)?;

        // filter splicing works on raw text and can reintroduce markers
        let (spliced, filter_specifications) =
            self.host
                .expand_filter_parameters(template, parameters, context)?;
        specifications.extend(filter_specifications);
        let adjusted = expander.adjust(spliced, &specifications);
        template = adjusted.template;
        specifications.extend(
            adjusted
                .specifications
                .into_iter()
                .map(|s| Box::new(s) as Box<dyn ParameterSpecification>),
        );
        phase.advance(CompilePhase::FilterAdjusted)?;

        let (limited, limit_specifications) =
            self.host.add_limit_parameters(template, parameters, context)?;
        template = limited;
        specifications.extend(limit_specifications);
        phase.advance(CompilePhase::LimitAdjusted)?;

        template = self.host.preprocess_sql(template, parameters, context)?;

        // every tagged position in the final template must be claimed by
        // exactly one specification
        let claimed: FxHashSet<BacktrackId> = specifications
            .iter()
            .flat_map(|s| s.backtrack_ids())
            .collect();
        for backtrack in template.backtrack_index().keys() {
            if !claimed.contains(backtrack) {
                return Err(Error::internal(format!(
                    "tagged placeholder {backtrack} has no parameter specification"
                )));
            }
        }

        // no pass may rewrite the template past this point
        for specification in &mut specifications {
            specification.reset_effective_type(parameters);
        }
        phase.advance(CompilePhase::TypesFinalized)?;

        phase.advance(CompilePhase::Ready)?;
        Ok(SqlCommand::new(template, specifications, parameters.clone()))
    }
}

/// Builds the loader for a compiled translator
pub trait LoaderFactory: Send + Sync {
    /// Wrap or return the host-built loader
    fn create(&self, host: Box<dyn QueryLoader>, context: &SessionContext)
        -> Box<dyn QueryLoader>;
}

/// Factory installing the virtual-parameter loader decorator
#[derive(Debug, Default)]
pub struct VirtualLoaderFactory;

impl VirtualLoaderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl LoaderFactory for VirtualLoaderFactory {
    fn create(
        &self,
        host: Box<dyn QueryLoader>,
        _context: &SessionContext,
    ) -> Box<dyn QueryLoader> {
        Box::new(LoaderDecorator::new(host))
    }
}

/// Factory that leaves the host loader undecorated
#[derive(Debug, Default)]
pub struct PassthroughLoaderFactory;

impl LoaderFactory for PassthroughLoaderFactory {
    fn create(
        &self,
        host: Box<dyn QueryLoader>,
        _context: &SessionContext,
    ) -> Box<dyn QueryLoader> {
        host
    }
}
