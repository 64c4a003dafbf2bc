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

//! Generic business logic for any service.
//!
//! Every service should implement its own `Driver` type to hold the shared state that operations
//! need, which in most cases looks like this:
//!
//! ```rust
//! use rolodex_core::clocks::Clock;
//! use rolodex_core::db::Db;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! pub struct Driver {
//!     /// The database that the driver uses for persistence.
//!     db: Arc<dyn Db + Send + Sync>,
//!
//!     /// The clock used to timestamp new records.
//!     clock: Arc<dyn Clock + Send + Sync>,
//! }
//! ```
//!
//! Every operation implemented in the `Driver` should take consume `self` because this is the
//! layer that coordinates multiple operations against the database inside a single transaction.
//! Consuming `self` prevents the caller from easily issuing multiple operations against the driver,
//! as this would require a clone and highlight an undesirable pattern.
//!
//! Every operation reports failures as a `DriverError<K>` where `K` is a closed enumeration of
//! the expected rejections that the operation can produce.  Operations that cannot be rejected use
//! the default `Infallible` kind.  Anything that does not fit in `K` is unexpected.

use crate::db::DbError;
use std::convert::Infallible;
use std::fmt;

/// Business logic errors, split between expected rejections of kind `K` and unexpected problems.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError<K> {
    /// The operation was rejected for a reason that the caller is expected to handle.
    #[error("Domain failure: {0:?}")]
    Domain(K),

    /// Catch-all error type for infrastructure or programming errors.  The payload carries the
    /// full cause for logging and must not be shown to the caller.
    #[error("{0}")]
    Unexpected(String),
}

impl<K> DriverError<K> {
    /// Wraps an arbitrary error `e` as an unexpected failure, keeping its description.
    pub fn unexpected<E: fmt::Display>(e: E) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl<K> From<DbError> for DriverError<K> {
    fn from(e: DbError) -> Self {
        DriverError::Unexpected(e.to_string())
    }
}

/// Result type for this module.
pub type DriverResult<T, K = Infallible> = Result<T, DriverError<K>>;
