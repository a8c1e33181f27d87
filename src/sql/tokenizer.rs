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

//! Token scanner for generated SQL text
//!
//! This is deliberately not a SQL parser. It splits a literal fragment into
//! separator characters and the runs between them, preserving every byte, so
//! that rewriting a recognized token and re-emitting the rest reproduces the
//! input exactly. Placeholders never pass through here; they are opaque
//! fragments of the template.

use super::dialect::{Dialect, VARIABLE_PREFIX};

/// Iterator over the tokens of a SQL text fragment
///
/// Separator characters are yielded as single-character tokens; everything
/// between separators is yielded as one token. Concatenating all yielded
/// tokens reproduces the input.
pub struct SqlTokenizer<'a> {
    input: &'a str,
    dialect: &'a Dialect,
    pos: usize,
}

impl<'a> SqlTokenizer<'a> {
    /// Create a tokenizer over the given fragment
    pub fn new(input: &'a str, dialect: &'a Dialect) -> Self {
        Self {
            input,
            dialect,
            pos: 0,
        }
    }
}

impl<'a> Iterator for SqlTokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        let first = rest.chars().next()?;

        if self.dialect.is_separator(first) {
            let len = first.len_utf8();
            self.pos += len;
            return Some(&rest[..len]);
        }

        let end = rest
            .char_indices()
            .find(|(_, ch)| self.dialect.is_separator(*ch))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }
}

/// Check whether a token is a variable marker (`:name`)
pub fn is_variable_token(token: &str) -> bool {
    token.len() > VARIABLE_PREFIX.len_utf8() && token.starts_with(VARIABLE_PREFIX)
}

/// Strip the variable-marker prefix from a token
///
/// Only meaningful when [`is_variable_token`] returned true.
pub fn variable_name(token: &str) -> &str {
    &token[VARIABLE_PREFIX.len_utf8()..]
}
