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

//! # Tablefunc - Virtual parameters for query compile pipelines
//!
//! Tablefunc lets callers pass named parameters to table-valued functions
//! (and other SQL constructs) that a host query compiler does not model.
//! The value registers on the query provider, survives every compilation
//! stage as an opaque tagged placeholder, and binds on the final command
//! with full type safety.
//!
//! ## How it works
//!
//! - A [`VirtualQueryProvider`](query::VirtualQueryProvider) collects
//!   name/value/type registrations before the query is prepared
//! - The expression is augmented so descriptors and values travel with it
//!   through host compilation
//! - A [`SqlTokenExpander`](sql::SqlTokenExpander) rewrites each unresolved
//!   `:name` marker in the generated SQL into a placeholder tagged with a
//!   [`BacktrackId`](sql::BacktrackId), and re-runs after filter splicing
//! - At bind time each specification resolves every tagged position in the
//!   final template and binds its value there, synchronously or with
//!   cooperative cancellation
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tablefunc::core::{DataType, Value};
//! use tablefunc::query::{set_virtual_parameter, VirtualQueryProvider};
//!
//! let mut provider = VirtualQueryProvider::new();
//! set_virtual_parameter(
//!     &mut provider,
//!     "startDate",
//!     Value::text("2024-01-01"),
//!     DataType::Text,
//! )?;
//!
//! let prepared = provider.prepare(expression, &context)?;
//! let rows = prepared.list(&context, &prepared.query_parameters(vec![]))?;
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Row`], [`Error`],
//!   cancellation)
//! - [`params`] - Registry, descriptors, metadata, bind specifications
//! - [`sql`] - Templates, token scanning, marker expansion
//! - [`query`] - The compile pipeline: expressions, translators, loaders,
//!   providers

pub mod core;
pub mod params;
pub mod query;
pub mod sql;

// Re-export the most commonly used types at the crate root
pub use crate::core::{CancellationHandle, DataType, Error, Result, Row, Value};
pub use crate::params::{
    ParameterDescriptor, ParameterMetadata, QueryParameters, ToParam, VirtualParameter,
    VirtualParameterRegistry,
};
pub use crate::query::{
    set_virtual_parameter, PreparedQuery, QueryProvider, SessionContext, SqlCommand,
    VirtualQueryProvider,
};
pub use crate::sql::{BacktrackId, Dialect, SqlTemplate, SqlTokenExpander};
