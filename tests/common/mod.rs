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

//! Stub host engine for integration tests
//!
//! Implements just enough of the host seams (expression, translator
//! factory, loader) to drive the full pipeline: compile, expand, filter
//! splice, bind, and a tiny date-range table-valued function that actually
//! produces rows from the bound values.

// not every test binary exercises every stub surface
#![allow(dead_code)]

use std::any::Any;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};

use tablefunc::core::{CancellationHandle, DataType, Error, Result, Row, Value};
use tablefunc::params::specification::{AsyncCommand, Command, ParameterSpecification};
use tablefunc::params::{ParameterDescriptor, ParameterMetadata, QueryParameters, VirtualParameter};
use tablefunc::query::{
    QueryExpression, QueryLoader, QueryTranslator, SessionContext, SqlCommand, SyntaxTree,
    TranslatorFactory,
};
use tablefunc::sql::{Dialect, SqlTemplate};

/// Command target that records every bind it receives
#[derive(Debug, Default)]
pub struct RecordingCommand {
    pub binds: Vec<(usize, Value, DataType)>,
}

impl Command for RecordingCommand {
    fn set_parameter(
        &mut self,
        position: usize,
        value: &Value,
        expected_type: DataType,
    ) -> Result<()> {
        self.binds.push((position, value.clone(), expected_type));
        Ok(())
    }
}

#[async_trait]
impl AsyncCommand for RecordingCommand {
    async fn set_parameter(
        &mut self,
        position: usize,
        value: &Value,
        expected_type: DataType,
    ) -> Result<()> {
        Command::set_parameter(self, position, value, expected_type)
    }
}

impl RecordingCommand {
    pub fn value_at(&self, position: usize) -> Option<&Value> {
        self.binds
            .iter()
            .find(|(p, _, _)| *p == position)
            .map(|(_, v, _)| v)
    }
}

/// Expression stub: carries native parameters, translation is a no-op
pub struct StubExpression {
    key: String,
    native: Vec<VirtualParameter>,
}

impl StubExpression {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            native: Vec::new(),
        }
    }

    pub fn with_native(mut self, parameter: VirtualParameter) -> Self {
        self.native.push(parameter);
        self
    }
}

impl QueryExpression for StubExpression {
    fn key(&self) -> &str {
        &self.key
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        self.native.iter().map(|p| p.descriptor()).collect()
    }

    fn parameter_values_by_name(&self) -> FxHashMap<String, VirtualParameter> {
        self.native
            .iter()
            .map(|p| (p.name().to_string(), p.clone()))
            .collect()
    }

    fn translate(&self, _context: &SessionContext, _is_filter: bool) -> Result<SyntaxTree> {
        Ok(SyntaxTree::new(self.key.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Host loader stub
///
/// Filter and limit text, when configured, are spliced as raw literals the
/// way a real engine concatenates filter SQL.
pub struct StubLoader {
    template: SqlTemplate,
    filter_sql: Option<String>,
    limit_sql: Option<String>,
}

impl QueryLoader for StubLoader {
    fn sql_template(&self) -> &SqlTemplate {
        &self.template
    }

    fn parameter_specifications(&self) -> Vec<Box<dyn ParameterSpecification>> {
        Vec::new()
    }

    fn expand_filter_parameters(
        &self,
        mut template: SqlTemplate,
        _parameters: &QueryParameters,
        _context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)> {
        if let Some(filter) = &self.filter_sql {
            template.push_literal(filter);
        }
        Ok((template, Vec::new()))
    }

    fn add_limit_parameters(
        &self,
        mut template: SqlTemplate,
        _parameters: &QueryParameters,
        _context: &SessionContext,
    ) -> Result<(SqlTemplate, Vec<Box<dyn ParameterSpecification>>)> {
        if let Some(limit) = &self.limit_sql {
            template.push_literal(limit);
        }
        Ok((template, Vec::new()))
    }

    fn preprocess_sql(
        &self,
        template: SqlTemplate,
        _parameters: &QueryParameters,
        _context: &SessionContext,
    ) -> Result<SqlTemplate> {
        Ok(template)
    }

    fn create_command(
        &self,
        parameters: &QueryParameters,
        _context: &SessionContext,
    ) -> Result<SqlCommand> {
        Ok(SqlCommand::new(
            self.template.clone(),
            self.parameter_specifications(),
            parameters.clone(),
        ))
    }
}

/// Host translator stub compiling a fixed SQL text
pub struct StubTranslator {
    sql: String,
    filter_sql: Option<String>,
    limit_sql: Option<String>,
    column_names: Vec<String>,
    query_spaces: FxHashSet<String>,
    enabled_filters: FxHashMap<String, String>,
    template: Option<SqlTemplate>,
    loader: Option<Box<dyn QueryLoader>>,
}

impl StubTranslator {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            filter_sql: None,
            limit_sql: None,
            column_names: vec!["d".to_string()],
            query_spaces: FxHashSet::default(),
            enabled_filters: FxHashMap::default(),
            template: None,
            loader: None,
        }
    }

    fn run(&self, parameters: &QueryParameters, context: &SessionContext) -> Result<Vec<Row>> {
        let command = self.loader()?.create_command(parameters, context)?;
        let mut target = RecordingCommand::default();
        command.bind(&mut target)?;
        date_range_rows(&command, &target)
    }
}

#[async_trait]
impl QueryTranslator for StubTranslator {
    fn compile(
        &mut self,
        context: &SessionContext,
        _replacements: &FxHashMap<String, String>,
        _shallow: bool,
    ) -> Result<()> {
        let mut template = SqlTemplate::new();
        template.push_literal(&self.sql);
        self.template = Some(template.clone());

        let host_loader = Box::new(StubLoader {
            template,
            filter_sql: self.filter_sql.clone(),
            limit_sql: self.limit_sql.clone(),
        });
        self.loader = Some(context.loader_factory().create(host_loader, context));
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
        ParameterMetadata::new(0, Vec::new())
    }

    fn sql_template(&self) -> Result<&SqlTemplate> {
        self.template
            .as_ref()
            .ok_or_else(|| Error::internal("translator not compiled"))
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn query_spaces(&self) -> &FxHashSet<String> {
        &self.query_spaces
    }

    fn enabled_filters(&self) -> &FxHashMap<String, String> {
        &self.enabled_filters
    }

    fn loader(&self) -> Result<&dyn QueryLoader> {
        self.loader
            .as_deref()
            .ok_or_else(|| Error::internal("translator not compiled"))
    }

    fn is_manipulation_statement(&self) -> bool {
        false
    }

    fn list(&self, context: &SessionContext, parameters: &QueryParameters) -> Result<Vec<Row>> {
        self.run(parameters, context)
    }

    fn enumerate(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<Box<dyn Iterator<Item = Row> + Send>> {
        Ok(Box::new(self.run(parameters, context)?.into_iter()))
    }

    fn execute_update(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
    ) -> Result<u64> {
        let command = self.loader()?.create_command(parameters, context)?;
        let mut target = RecordingCommand::default();
        command.bind(&mut target)?;
        Ok(target.binds.len() as u64)
    }

    async fn list_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<Vec<Row>> {
        let command = self.loader()?.create_command(parameters, context)?;
        let mut target = RecordingCommand::default();
        command.bind_async(&mut target, cancellation).await?;
        date_range_rows(&command, &target)
    }

    async fn execute_update_async(
        &self,
        context: &SessionContext,
        parameters: &QueryParameters,
        cancellation: &CancellationHandle,
    ) -> Result<u64> {
        let command = self.loader()?.create_command(parameters, context)?;
        let mut target = RecordingCommand::default();
        command.bind_async(&mut target, cancellation).await?;
        Ok(target.binds.len() as u64)
    }
}

/// Host factory stub producing one compiled translator per expression
pub struct StubTranslatorFactory {
    sql: String,
    filter_sql: Option<String>,
    limit_sql: Option<String>,
}

impl StubTranslatorFactory {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            filter_sql: None,
            limit_sql: None,
        }
    }

    pub fn with_filter(mut self, sql: impl Into<String>) -> Self {
        self.filter_sql = Some(sql.into());
        self
    }

    pub fn with_limit(mut self, sql: impl Into<String>) -> Self {
        self.limit_sql = Some(sql.into());
        self
    }
}

impl TranslatorFactory for StubTranslatorFactory {
    fn create_translators(
        &self,
        expression: &dyn QueryExpression,
        collection_role: Option<&str>,
        shallow: bool,
        context: &SessionContext,
    ) -> Result<Vec<Box<dyn QueryTranslator>>> {
        expression.translate(context, false)?;

        let mut translator = StubTranslator::new(&self.sql);
        translator.filter_sql = self.filter_sql.clone();
        translator.limit_sql = self.limit_sql.clone();
        match collection_role {
            Some(role) => translator.compile_for_collection(
                context,
                role,
                context.query_substitutions(),
                shallow,
            )?,
            None => translator.compile(context, context.query_substitutions(), shallow)?,
        }
        Ok(vec![Box::new(translator)])
    }
}

/// Factory that compiles nothing, for the no-translators error path
pub struct EmptyTranslatorFactory;

impl TranslatorFactory for EmptyTranslatorFactory {
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

/// Context with the virtual-parameter layer installed over the stub host
pub fn virtual_context(factory: StubTranslatorFactory) -> SessionContext {
    SessionContext::with_virtual_parameters(Dialect::ansi(), Box::new(factory))
}

fn parse_date(value: &Value) -> Result<NaiveDate> {
    match value {
        Value::Text(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| Error::internal(format!("bad date literal '{text}': {e}"))),
        Value::Timestamp(ts) => Ok(ts.date_naive()),
        other => Err(Error::type_conversion(
            other.data_type().to_string(),
            "date",
        )),
    }
}

/// Evaluate the stub `dbo.DateRange(start, end)` table-valued function:
/// one row per day, both endpoints inclusive
fn date_range_rows(command: &SqlCommand, target: &RecordingCommand) -> Result<Vec<Row>> {
    if !command.sql().contains("DateRange(") {
        return Ok(Vec::new());
    }
    let start = parse_date(
        target
            .value_at(0)
            .ok_or_else(|| Error::internal("start date not bound"))?,
    )?;
    let end = parse_date(
        target
            .value_at(1)
            .ok_or_else(|| Error::internal("end date not bound"))?,
    )?;

    let mut rows = Vec::new();
    let mut day = start;
    while day <= end {
        let ts: DateTime<Utc> =
            DateTime::from_naive_utc_and_offset(day.and_time(NaiveTime::MIN), Utc);
        rows.push(Row::from(vec![Value::timestamp(ts)]));
        day = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::internal("date overflow"))?;
    }
    Ok(rows)
}
