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

//! Query translators and the virtual-parameter decorator
//!
//! A translator turns one translated expression into executable SQL. The
//! decorator wraps a host translator and widens only its parameter metadata;
//! compilation, execution, and every other query operation delegate to the
//! host unchanged.

use std::fmt;

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{CancellationHandle, Error, Result, Row};
use crate::params::{ParameterMetadata, QueryParameters, VirtualParameter};
use crate::sql::SqlTemplate;

use super::expression::{AugmentedExpression, QueryExpression};
use super::loader::QueryLoader;
use super::session::SessionContext;

/// Stage of the compile pipeline a query has reached
///
/// Stages advance strictly in this order; skipping one is a bug surfaced as
/// [`Error::InvalidPhaseTransition`]. Binding is only legal from `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompilePhase {
    Uninitialized,
    Augmented,
    HostCompiled,
    TokenExpanded,
    FilterAdjusted,
    LimitAdjusted,
    TypesFinalized,
    Ready,
}

impl CompilePhase {
    fn successor(self) -> Option<CompilePhase> {
        match self {
            CompilePhase::Uninitialized => Some(CompilePhase::Augmented),
            CompilePhase::Augmented => Some(CompilePhase::HostCompiled),
            CompilePhase::HostCompiled => Some(CompilePhase::TokenExpanded),
            CompilePhase::TokenExpanded => Some(CompilePhase::FilterAdjusted),
            CompilePhase::FilterAdjusted => Some(CompilePhase::LimitAdjusted),
            CompilePhase::LimitAdjusted => Some(CompilePhase::TypesFinalized),
            CompilePhase::TypesFinalized => Some(CompilePhase::Ready),
            CompilePhase::Ready => None,
        }
    }

    /// Move to `next`, which must be the immediate successor of the current
    /// stage
    pub fn advance(&mut self, next: CompilePhase) -> Result<()> {
        if self.successor() != Some(next) {
            return Err(Error::invalid_phase_transition(
                self.to_string(),
                next.to_string(),
            ));
        }
        *self = next;
        Ok(())
    }

    /// Reset to the start for a recompilation
    pub fn restart(&mut self) {
        *self = CompilePhase::Uninitialized;
    }

    /// Whether binding is legal from this stage
    pub fn is_ready(self) -> bool {
        self == CompilePhase::Ready
    }
}

impl fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompilePhase::Uninitialized => "Uninitialized",
            CompilePhase::Augmented => "Augmented",
            CompilePhase::HostCompiled => "HostCompiled",
            CompilePhase::TokenExpanded => "TokenExpanded",
            CompilePhase::FilterAdjusted => "FilterAdjusted",
            CompilePhase::LimitAdjusted => "LimitAdjusted",
            CompilePhase::TypesFinalized => "TypesFinalized",
            CompilePhase::Ready => "Ready",
        };
        f.write_str(name)
    }
}

/// One compiled unit of a query
///
/// The host engine implements this for its own translators; the decorator
/// implements it around them.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    /// Compile the translated expression into SQL
    fn compile(
        &mut self,
        context: &SessionContext,
        replacements: &FxHashMap<String, String>,
        shallow: bool,
    ) -> Result<()>;

    /// Compile as a collection filter for the given role
    fn compile_for_collection(
        &mut self,
        context: &SessionContext,
        collection_role: &str,
        replacements: &FxHashMap<String, String>,
        shallow: bool,
    ) -> Result<()>;

    /// Parameter metadata of the compiled query
    fn build_parameter_metadata(&self) -> ParameterMetadata;

    /// The compiled SQL template
    fn sql_template(&self) -> Result<&SqlTemplate>;

    /// The compiled SQL as text
    fn sql_string(&self) -> Result<String> {
        Ok(self.sql_template()?.to_sql())
    }

    /// Result column names
    fn column_names(&self) -> &[String];

    /// Tables and spaces the query touches, for cache invalidation
    fn query_spaces(&self) -> &FxHashSet<String>;

    /// Filters enabled for this compilation, name to condition text
    fn enabled_filters(&self) -> &FxHashMap<String, String>;

    /// The loader that builds and binds the final command
    fn loader(&self) -> Result<&dyn QueryLoader>;

    /// Whether the statement is an insert/update/delete
    fn is_manipulation_statement(&self) -> bool;

    /// Run the query and collect all rows
    fn list(&self, context: &SessionContext, parameters: &QueryParameters) -> Result<Vec<Row>>;

    /// Run the query and stream rows
    fn enumerate(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<Box<dyn Iterator<Item = Row> + Send>>;

    /// Run a manipulation statement, returning the affected row count
    fn execute_update(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<u64>;

    /// Asynchronous variant of [`list`](Self::list)
    async fn list_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<Vec<Row>>;

    /// Asynchronous variant of [`execute_update`](Self::execute_update)
    async fn execute_update_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<u64>;
}

/// Wraps a compiled host translator and adds the virtual parameters to its
/// metadata
pub struct TranslatorDecorator {
    host: Box<dyn QueryTranslator>,
    virtual_parameters: Vec<VirtualParameter>,
    phase: CompilePhase,
}

impl TranslatorDecorator {
    /// Wrap an already-compiled host translator
    pub fn new(
        host: Box<dyn QueryTranslator>,
        virtual_parameters: Vec<VirtualParameter>,
    ) -> Result<Self> {
        let mut phase = CompilePhase::Uninitialized;
        phase.advance(CompilePhase::Augmented)?;
        phase.advance(CompilePhase::HostCompiled)?;
        Ok(Self {
            host,
            virtual_parameters,
            phase,
        })
    }

    /// The virtual parameters this translator carries
    pub fn virtual_parameters(&self) -> &[VirtualParameter] {
        &self.virtual_parameters
    }
}

#[async_trait]
impl QueryTranslator for TranslatorDecorator {
    fn compile(
        &mut self,
        context: &SessionContext,
        replacements: &FxHashMap<String, String>,
        shallow: bool,
    ) -> Result<()> {
        self.phase.restart();
        self.phase.advance(CompilePhase::Augmented)?;
        self.host.compile(context, replacements, shallow)?;
        self.phase.advance(CompilePhase::HostCompiled)
    }

    fn compile_for_collection(
        &mut self,
        context: &SessionContext,
        collection_role: &str,
        replacements: &FxHashMap<String, String>,
        shallow: bool,
    ) -> Result<()> {
        self.phase.restart();
        self.phase.advance(CompilePhase::Augmented)?;
        self.host
            .compile_for_collection(context, collection_role, replacements, shallow)?;
        self.phase.advance(CompilePhase::HostCompiled)
    }

    fn build_parameter_metadata(&self) -> ParameterMetadata {
        self.host
            .build_parameter_metadata()
            .expand_with(&self.virtual_parameters)
    }

    fn sql_template(&self) -> Result<&SqlTemplate> {
        self.host.sql_template()
    }

    fn column_names(&self) -> &[String] {
        self.host.column_names()
    }

    fn query_spaces(&self) -> &FxHashSet<String> {
        self.host.query_spaces()
    }

    fn enabled_filters(&self) -> &FxHashMap<String, String> {
        self.host.enabled_filters()
    }

    fn loader(&self) -> Result<&dyn QueryLoader> {
        self.host.loader()
    }

    fn is_manipulation_statement(&self) -> bool {
        self.host.is_manipulation_statement()
    }

    fn list(&self, context: &SessionContext, parameters: &QueryParameters) -> Result<Vec<Row>> {
        self.host.list(context, parameters)
    }

    fn enumerate(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<Box<dyn Iterator<Item = Row> + Send>> {
        self.host.enumerate(context, parameters)
    }

    fn execute_update(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<u64> {
        self.host.execute_update(context, parameters)
    }

    async fn list_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<Vec<Row>> {
        self.host.list_async(context, parameters, cancellation).await
    }

    async fn execute_update_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<u64> {
        self.host
            .execute_update_async(context, parameters, cancellation)
            .await
    }
}

/// Builds compiled translators for an expression
pub trait TranslatorFactory: Send + Sync {
    /// Create the translators for an expression, compiled and ready
    fn create_translators(
        &self,
        expression: &dyn QueryExpression,
        collection_role: Option<&str>,
        shallow: bool,
        context: &SessionContext,
    ) -> Result<Vec<Box<dyn QueryTranslator>>>;
}

/// Factory that decorates the host's translators when the expression
/// carries virtual parameters
///
/// Expressions without virtual parameters pass through to the host factory
/// untouched.
pub struct VirtualTranslatorFactory {
    host: Box<dyn TranslatorFactory>,
}

impl VirtualTranslatorFactory {
    pub fn new(host: Box<dyn TranslatorFactory>) -> Self {
        Self { host }
    }
}

impl TranslatorFactory for VirtualTranslatorFactory {
    fn create_translators(
        &self,
        expression: &dyn QueryExpression,
        collection_role: Option<&str>,
        shallow: bool,
        context: &SessionContext,
    ) -> Result<Vec<Box<dyn QueryTranslator>>> {
        let translators =
            self.host
                .create_translators(expression, collection_role, shallow, context)?;

        let Some(augmented) = expression.as_any().downcast_ref::<AugmentedExpression>() else {
            return Ok(translators);
        };

        let mut decorated: Vec<Box<dyn QueryTranslator>> =
            Vec::with_capacity(translators.len());
        for host in translators {
            decorated.push(Box::new(TranslatorDecorator::new(
                host,
                augmented.virtual_parameters().to_vec(),
            )?));
        }
        Ok(decorated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Value};
    use crate::params::ParameterDescriptor;
    use crate::query::loader::PassthroughLoaderFactory;
    use crate::sql::Dialect;

    #[derive(Default)]
    struct NullTranslator {
        columns: Vec<String>,
        spaces: FxHashSet<String>,
        filters: FxHashMap<String, String>,
    }

    #[async_trait]
    impl QueryTranslator for NullTranslator {
        fn compile(
            &mut self,
            _context: &SessionContext,
            _replacements: &FxHashMap<String, String>,
            _shallow: bool,
        ) -> Result<()> {
            Ok(())
        }

        fn compile_for_collection(
            &mut self,
            context: &SessionContext,
            _collection_role: &str,
            replacements: &FxHashMap<String, String>,
            shallow: bool,
        ) -> Result<()> {
            self.compile(context, replacements, shallow)
        }

        fn build_parameter_metadata(&self) -> ParameterMetadata {
            ParameterMetadata::new(
                0,
                vec![ParameterDescriptor::new("limit", DataType::Integer, false)],
            )
        }

        fn sql_template(&self) -> Result<&SqlTemplate> {
            Err(Error::internal("no template"))
        }

        fn column_names(&self) -> &[String] {
            &self.columns
        }

        fn query_spaces(&self) -> &FxHashSet<String> {
            &self.spaces
        }

        fn enabled_filters(&self) -> &FxHashMap<String, String> {
            &self.filters
        }

        fn loader(&self) -> Result<&dyn QueryLoader> {
            Err(Error::internal("no loader"))
        }

        fn is_manipulation_statement(&self) -> bool {
            false
        }

        fn list(
            &self,
            _context: &SessionContext,
            _parameters: &QueryParameters,
        ) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }

        fn enumerate(
            &self,
            _context: &SessionContext,
            _parameters: &QueryParameters,
        ) -> Result<Box<dyn Iterator<Item = Row> + Send>> {
            Ok(Box::new(std::iter::empty()))
        }

        fn execute_update(
            &self,
            _context: &SessionContext,
            _parameters: &QueryParameters,
        ) -> Result<u64> {
            Ok(0)
        }

        async fn list_async(
            &self,
            context: &SessionContext,
            parameters: &QueryParameters,
            _cancellation: &CancellationHandle,
        ) -> Result<Vec<Row>> {
            self.list(context, parameters)
        }

        async fn execute_update_async(
            &self,
            context: &SessionContext,
            parameters: &QueryParameters,
            _cancellation: &CancellationHandle,
        ) -> Result<u64> {
            self.execute_update(context, parameters)
        }
    }

    struct NullFactory;

    impl TranslatorFactory for NullFactory {
        fn create_translators(
            &self,
            _expression: &dyn QueryExpression,
            _collection_role: Option<&str>,
            _shallow: bool,
            _context: &SessionContext,
        ) -> Result<Vec<Box<dyn QueryTranslator>>> {
            Ok(Vec::new())
        }
    }

    fn null_context() -> SessionContext {
        SessionContext::new(
            Dialect::ansi(),
            Box::new(NullFactory),
            Box::new(PassthroughLoaderFactory),
        )
    }

    fn virtuals() -> Vec<VirtualParameter> {
        vec![
            VirtualParameter::new("startDate", Value::text("2024-01-01"), DataType::Text),
            VirtualParameter::new("limit", Value::text("10"), DataType::Text),
        ]
    }

    #[test]
    fn test_decorator_metadata_merges_virtuals_native_wins() {
        let decorator =
            TranslatorDecorator::new(Box::new(NullTranslator::default()), virtuals()).unwrap();
        let metadata = decorator.build_parameter_metadata();

        assert_eq!(metadata.named_descriptors().len(), 2);
        assert!(metadata.contains_named("startDate"));
        // the host's own descriptor survives the name collision
        assert_eq!(
            metadata.named_descriptor("limit").unwrap().expected_type(),
            DataType::Integer
        );
    }

    #[test]
    fn test_decorator_recompiles_repeatedly() {
        let mut decorator =
            TranslatorDecorator::new(Box::new(NullTranslator::default()), virtuals()).unwrap();
        let context = null_context();
        let replacements = FxHashMap::default();

        decorator.compile(&context, &replacements, false).unwrap();
        decorator.compile(&context, &replacements, true).unwrap();
        decorator
            .compile_for_collection(&context, "orders", &replacements, false)
            .unwrap();
    }

    #[test]
    fn test_phase_advances_in_order() {
        let mut phase = CompilePhase::Uninitialized;
        for next in [
            CompilePhase::Augmented,
            CompilePhase::HostCompiled,
            CompilePhase::TokenExpanded,
            CompilePhase::FilterAdjusted,
            CompilePhase::LimitAdjusted,
            CompilePhase::TypesFinalized,
            CompilePhase::Ready,
        ] {
            phase.advance(next).unwrap();
            assert_eq!(phase, next);
        }
        assert!(phase.is_ready());
    }

    #[test]
    fn test_phase_rejects_skips() {
        let mut phase = CompilePhase::HostCompiled;
        let err = phase.advance(CompilePhase::Ready).unwrap_err();
        assert_eq!(
            err,
            Error::invalid_phase_transition("HostCompiled", "Ready")
        );
        // the failed transition left the phase unchanged
        assert_eq!(phase, CompilePhase::HostCompiled);

        let mut phase = CompilePhase::Ready;
        assert!(phase.advance(CompilePhase::Augmented).is_err());
    }

    #[test]
    fn test_phase_restart() {
        let mut phase = CompilePhase::TypesFinalized;
        phase.restart();
        assert_eq!(phase, CompilePhase::Uninitialized);
        phase.advance(CompilePhase::Augmented).unwrap();
    }

    #[test]
    fn test_phase_rejects_backwards() {
        let mut phase = CompilePhase::LimitAdjusted;
        assert!(phase.advance(CompilePhase::TokenExpanded).is_err());
    }
}
