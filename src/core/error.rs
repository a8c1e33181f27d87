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

//! Error types for the virtual-parameter pipeline
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for tablefunc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the virtual-parameter pipeline
///
/// Errors raised by host-compiler collaborators propagate through this type
/// unmodified via the `Internal` case; this layer adds no retry or
/// suppression of its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Registration errors
    // =========================================================================
    /// A virtual parameter was registered twice with unequal values
    #[error("virtual parameter '{name}' already registered with a different value")]
    ParameterConflict { name: String },

    /// The registry was frozen for compilation and cannot change anymore
    #[error("virtual parameter registry already finalized")]
    RegistryFinalized,

    // =========================================================================
    // Provider errors
    // =========================================================================
    /// A registry operation was invoked on a provider that has no registry
    #[error("query provider does not support virtual parameters")]
    UnsupportedProvider,

    // =========================================================================
    // Compilation errors
    // =========================================================================
    /// A compile stage was entered out of order
    #[error("invalid compile phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },

    /// The prepared query produced no translators to run against
    #[error("query compiled to no translators")]
    NoTranslators,

    // =========================================================================
    // Binding errors
    // =========================================================================
    /// Binding observed a prior cancellation request
    #[error("binding cancelled")]
    Cancelled,

    // =========================================================================
    // Other errors
    // =========================================================================
    /// Type conversion error
    #[error("type conversion error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new ParameterConflict error
    pub fn parameter_conflict(name: impl Into<String>) -> Self {
        Error::ParameterConflict { name: name.into() }
    }

    /// Create a new InvalidPhaseTransition error
    pub fn invalid_phase_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::InvalidPhaseTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new TypeConversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is a cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if this is a registration-time error
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Error::ParameterConflict { .. } | Error::RegistryFinalized
        )
    }
}
