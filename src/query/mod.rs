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

//! The compile pipeline: expressions, translators, loaders, providers

pub mod command;
pub mod expression;
pub mod loader;
pub mod provider;
pub mod session;
pub mod translator;

pub use command::SqlCommand;
pub use expression::{AugmentedExpression, QueryExpression, SyntaxTree};
pub use loader::{
    LoaderDecorator, LoaderFactory, PassthroughLoaderFactory, QueryLoader, VirtualLoaderFactory,
};
pub use provider::{set_virtual_parameter, PreparedQuery, QueryProvider, VirtualQueryProvider};
pub use session::SessionContext;
pub use translator::{
    CompilePhase, QueryTranslator, TranslatorDecorator, TranslatorFactory,
    VirtualTranslatorFactory,
};
