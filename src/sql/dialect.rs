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

//! Dialect conventions consumed by the token scanner
//!
//! The scanner only needs to know which characters delimit tokens and which
//! characters the dialect uses for identifier quoting. The variable-marker
//! prefix is engine-wide, not dialect-specific.

/// Reserved prefix character denoting an unresolved named reference
/// in generated SQL text
pub const VARIABLE_PREFIX: char = ':';

/// Token separators shared by every dialect
///
/// Matches the separator set the host compiler itself tokenizes with, so a
/// variable marker is delimited exactly as the host would delimit it.
const BASE_SEPARATORS: &str = " \n\r\t\u{c},()=<>&|+-*/'^![]#~\\;";

/// Quoting and separator conventions of a SQL dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    open_quote: char,
    close_quote: char,
}

impl Dialect {
    /// ANSI dialect with double-quoted identifiers
    pub fn ansi() -> Self {
        Self {
            open_quote: '"',
            close_quote: '"',
        }
    }

    /// SQL Server dialect with bracket-quoted identifiers
    pub fn mssql() -> Self {
        Self {
            open_quote: '[',
            close_quote: ']',
        }
    }

    /// Opening identifier-quote character
    pub fn open_quote(&self) -> char {
        self.open_quote
    }

    /// Closing identifier-quote character
    pub fn close_quote(&self) -> char {
        self.close_quote
    }

    /// Check whether a character delimits tokens in this dialect
    pub fn is_separator(&self, ch: char) -> bool {
        ch == self.open_quote || ch == self.close_quote || BASE_SEPARATORS.contains(ch)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}
