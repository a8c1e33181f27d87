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

//! Compilation context with replaceable factory seams
//!
//! The virtual-parameter layer hooks into the host engine by swapping the
//! translator and loader factories held here. Both references are plain
//! settable fields, so installing the layer is one call and removing it is
//! another.

use rustc_hash::FxHashMap;

use crate::sql::Dialect;

use super::loader::{LoaderFactory, VirtualLoaderFactory};
use super::translator::{TranslatorFactory, VirtualTranslatorFactory};

/// Everything compilation needs from the host session
pub struct SessionContext {
    dialect: Dialect,
    translator_factory: Box<dyn TranslatorFactory>,
    loader_factory: Box<dyn LoaderFactory>,
    query_substitutions: FxHashMap<String, String>,
}

impl SessionContext {
    /// Create a context with explicit factories
    pub fn new(
        dialect: Dialect,
        translator_factory: Box<dyn TranslatorFactory>,
        loader_factory: Box<dyn LoaderFactory>,
    ) -> Self {
        Self {
            dialect,
            translator_factory,
            loader_factory,
            query_substitutions: FxHashMap::default(),
        }
    }

    /// Create a context with the virtual-parameter layer installed around
    /// the host's translator factory
    pub fn with_virtual_parameters(
        dialect: Dialect,
        host_translator_factory: Box<dyn TranslatorFactory>,
    ) -> Self {
        Self::new(
            dialect,
            Box::new(VirtualTranslatorFactory::new(host_translator_factory)),
            Box::new(VirtualLoaderFactory::new()),
        )
    }

    /// The SQL dialect queries compile against
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The installed translator factory
    pub fn translator_factory(&self) -> &dyn TranslatorFactory {
        self.translator_factory.as_ref()
    }

    /// The installed loader factory
    pub fn loader_factory(&self) -> &dyn LoaderFactory {
        self.loader_factory.as_ref()
    }

    /// Query-text substitutions applied during host compilation
    pub fn query_substitutions(&self) -> &FxHashMap<String, String> {
        &self.query_substitutions
    }

    /// Replace the translator factory
    pub fn set_translator_factory(&mut self, factory: Box<dyn TranslatorFactory>) {
        self.translator_factory = factory;
    }

    /// Replace the loader factory
    pub fn set_loader_factory(&mut self, factory: Box<dyn LoaderFactory>) {
        self.loader_factory = factory;
    }

    /// Add a query-text substitution
    pub fn add_query_substitution(
        &mut self,
        token: impl Into<String>,
        replacement: impl Into<String>,
    ) {
        self.query_substitutions
            .insert(token.into(), replacement.into());
    }
}
