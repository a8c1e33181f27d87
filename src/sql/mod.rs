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

//! SQL templates, token scanning, and variable-marker expansion

pub mod dialect;
pub mod expander;
pub mod template;
pub mod tokenizer;

pub use dialect::{Dialect, VARIABLE_PREFIX};
pub use expander::{Expansion, SqlTokenExpander};
pub use template::{BacktrackId, Fragment, Placeholder, SqlTemplate};
pub use tokenizer::SqlTokenizer;
