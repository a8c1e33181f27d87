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

//! SQL templates: ordered literal and placeholder fragments
//!
//! A template is the representation of a generated SQL statement prior to
//! final command construction. Placeholder positions are the ordinals of
//! placeholder fragments, counted left to right; a tagged placeholder carries
//! a backtrack id so every position belonging to one logical parameter can be
//! recovered after later rewriting passes have shifted positions around.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Opaque tag attached to a placeholder position
///
/// Derived deterministically from the parameter name and the occurrence index
/// within the original expansion pass. A virtual parameter always expands
/// from a single source token per textual occurrence, so the span index is
/// always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BacktrackId(String);

impl BacktrackId {
    /// Tag for a virtual parameter's single expansion span
    pub fn for_parameter(name: &str) -> Self {
        Self::for_span(name, 0)
    }

    /// Tag for an explicit span index
    pub fn for_span(name: &str, span: usize) -> Self {
        BacktrackId(format!("<vparam-{name}_span{span}>"))
    }

    /// The textual form of the tag
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BacktrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical placeholder in a template
///
/// Native placeholders are owned and bound by the host compiler and are
/// opaque to this layer. Tagged placeholders were inserted by token expansion
/// and are bound through their backtrack id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placeholder {
    backtrack: Option<BacktrackId>,
}

impl Placeholder {
    /// A placeholder owned by the host compiler
    pub fn native() -> Self {
        Self::default()
    }

    /// A placeholder tagged with a backtrack id
    pub fn tagged(backtrack: BacktrackId) -> Self {
        Self {
            backtrack: Some(backtrack),
        }
    }

    /// The backtrack id, if this placeholder is tagged
    pub fn backtrack(&self) -> Option<&BacktrackId> {
        self.backtrack.as_ref()
    }
}

/// One fragment of a SQL template
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A literal text span
    Literal(String),
    /// A physical placeholder position
    Placeholder(Placeholder),
}

/// The ordered literal/placeholder representation of a generated statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlTemplate {
    fragments: Vec<Fragment>,
}

impl SqlTemplate {
    /// Create an empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a literal span, merging with a trailing literal fragment
    pub fn push_literal(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            return;
        }
        if let Some(Fragment::Literal(last)) = self.fragments.last_mut() {
            last.push_str(text);
        } else {
            self.fragments.push(Fragment::Literal(text.to_string()));
        }
    }

    /// Append a placeholder
    pub fn push_placeholder(&mut self, placeholder: Placeholder) {
        self.fragments.push(Fragment::Placeholder(placeholder));
    }

    /// The ordered fragments
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Total number of placeholder positions
    pub fn parameter_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Placeholder(_)))
            .count()
    }

    /// Check whether any literal fragment contains the given character
    pub fn literal_contains(&self, ch: char) -> bool {
        self.fragments.iter().any(|f| match f {
            Fragment::Literal(text) => text.contains(ch),
            Fragment::Placeholder(_) => false,
        })
    }

    /// All placeholder positions carrying the given backtrack id,
    /// in ascending order
    pub fn parameter_locations(&self, backtrack: &BacktrackId) -> SmallVec<[usize; 2]> {
        let mut locations = SmallVec::new();
        let mut position = 0usize;
        for fragment in &self.fragments {
            if let Fragment::Placeholder(placeholder) = fragment {
                if placeholder.backtrack() == Some(backtrack) {
                    locations.push(position);
                }
                position += 1;
            }
        }
        locations
    }

    /// Build the tag-to-positions index for this template version
    ///
    /// The index is valid only for this exact template; any rewriting pass
    /// produces a new template and requires a fresh index.
    pub fn backtrack_index(&self) -> FxHashMap<BacktrackId, SmallVec<[usize; 2]>> {
        let mut index: FxHashMap<BacktrackId, SmallVec<[usize; 2]>> = FxHashMap::default();
        let mut position = 0usize;
        for fragment in &self.fragments {
            if let Fragment::Placeholder(placeholder) = fragment {
                if let Some(backtrack) = placeholder.backtrack() {
                    index.entry(backtrack.clone()).or_default().push(position);
                }
                position += 1;
            }
        }
        index
    }

    /// Render the final SQL text, with `?` for every placeholder
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => sql.push_str(text),
                Fragment::Placeholder(_) => sql.push('?'),
            }
        }
        sql
    }
}

impl fmt::Display for SqlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
