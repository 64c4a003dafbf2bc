// Rolodex
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic data types shared by all services.
//!
//! Every type in a `model` module should be constructed from untrusted input via a function that
//! validates the input and returns a `ModelResult`.  These functions must be pure: they cannot
//! perform I/O and must return the same result for the same input.

mod emailaddress;
pub use emailaddress::EmailAddress;

/// Reasons why a piece of untrusted input was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationReason {
    /// A required field was not provided or was empty.
    MissingField,

    /// A field was provided but did not have the expected format.
    InvalidFormat,
}

/// Error raised when untrusted input cannot be turned into a model type.
///
/// The message is meant to be shown to the caller as is, so it must not leak internal details.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Which constraint the input violated.
    reason: ValidationReason,

    /// Human-readable description of the problem.
    message: String,
}

impl ValidationFailure {
    /// Creates a failure for a required field that was not provided.
    pub fn missing_field<S: Into<String>>(message: S) -> Self {
        Self { reason: ValidationReason::MissingField, message: message.into() }
    }

    /// Creates a failure for a field that does not have the right format.
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self { reason: ValidationReason::InvalidFormat, message: message.into() }
    }

    /// Returns the constraint that the input violated.
    pub fn reason(&self) -> ValidationReason {
        self.reason
    }

    /// Returns the human-readable description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for this module.
pub type ModelResult<T> = Result<T, ValidationFailure>;
