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

//! Token expansion: resolving variable markers left in generated SQL
//!
//! The host compiler leaves a raw `:name` token in the template when it does
//! not know how to bind the name — exactly the case for virtual parameters.
//! Expansion replaces each such occurrence with a tagged placeholder and
//! collects one specification per parameter. The adjust pass re-runs the
//! same scan after the engine's own rewrites (dynamic filters concatenate
//! their SQL as raw text and can reintroduce tokens); placeholders already
//! tagged are opaque fragments and pass through untouched, so adjusting is
//! idempotent.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::params::registry::VirtualParameter;
use crate::params::specification::{ParameterSpecification, VirtualParameterSpecification};

use super::dialect::{Dialect, VARIABLE_PREFIX};
use super::template::{BacktrackId, Fragment, Placeholder, SqlTemplate};

/// Result of an expansion pass
#[derive(Debug)]
pub struct Expansion {
    /// The rewritten template (or the input, unchanged, on the fast path)
    pub template: SqlTemplate,
    /// Newly collected specifications, one per resolved parameter
    pub specifications: Vec<VirtualParameterSpecification>,
}

/// Scans SQL templates for unresolved variable tokens that reference
/// registered parameters
pub struct SqlTokenExpander<'a> {
    parameters: &'a FxHashMap<String, VirtualParameter>,
    dialect: &'a Dialect,
}

impl<'a> SqlTokenExpander<'a> {
    /// Create an expander over the resolved named-parameter map
    /// (native and virtual parameters merged)
    pub fn new(parameters: &'a FxHashMap<String, VirtualParameter>, dialect: &'a Dialect) -> Self {
        Self {
            parameters,
            dialect,
        }
    }

    /// Expand every unresolved variable token into a tagged placeholder
    ///
    /// Returns the input template unchanged when it contains no variable
    /// marker at all. A marker whose name matches no registered parameter
    /// stays literal text; the host compiler's own unbound-parameter failure
    /// surfaces downstream.
    pub fn expand(&self, template: SqlTemplate) -> Expansion {
        if !template.literal_contains(VARIABLE_PREFIX) {
            return Expansion {
                template,
                specifications: Vec::new(),
            };
        }
        self.rewrite(template, &FxHashSet::default())
    }

    /// Re-run expansion after a later rewriting pass
    ///
    /// Tokens introduced by spliced filter text are resolved against the
    /// same registered parameter set. Parameters whose backtrack id is
    /// already claimed by an existing specification get no duplicate
    /// specification; their new occurrences bind through the existing one.
    pub fn adjust(
        &self,
        template: SqlTemplate,
        existing: &[Box<dyn ParameterSpecification>],
    ) -> Expansion {
        if !template.literal_contains(VARIABLE_PREFIX) {
            return Expansion {
                template,
                specifications: Vec::new(),
            };
        }

        let claimed: FxHashSet<BacktrackId> = existing
            .iter()
            .flat_map(|spec| spec.backtrack_ids())
            .collect();
        self.rewrite(template, &claimed)
    }

    fn rewrite(&self, template: SqlTemplate, claimed: &FxHashSet<BacktrackId>) -> Expansion {
        let mut rewritten = SqlTemplate::new();
        let mut specifications: Vec<VirtualParameterSpecification> = Vec::new();
        let mut collected: FxHashSet<String> = FxHashSet::default();

        for fragment in template.fragments() {
            let text = match fragment {
                Fragment::Placeholder(placeholder) => {
                    rewritten.push_placeholder(placeholder.clone());
                    continue;
                }
                Fragment::Literal(text) => text,
            };

            for token in super::tokenizer::SqlTokenizer::new(text, self.dialect) {
                if !super::tokenizer::is_variable_token(token) {
                    rewritten.push_literal(token);
                    continue;
                }

                let name = super::tokenizer::variable_name(token);
                let Some(parameter) = self.parameters.get(name) else {
                    rewritten.push_literal(token);
                    continue;
                };

                let backtrack = BacktrackId::for_parameter(name);
                rewritten.push_placeholder(Placeholder::tagged(backtrack.clone()));

                if !claimed.contains(&backtrack) && collected.insert(name.to_string()) {
                    specifications.push(VirtualParameterSpecification::new(parameter.clone()));
                }
            }
        }

        Expansion {
            template: rewritten,
            specifications,
        }
    }
}
