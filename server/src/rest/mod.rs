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

//! Entry point to the REST server.

use crate::driver::{CreateContactFailure, Driver, ProfileFailure};
use axum::Router;
use rolodex_core::rest::{IntoRestError, RestError};
use std::path::Path;

mod boundary;
mod contact_get;
mod contacts_get;
mod contacts_post;
mod github_user_post;
mod index_get;
mod list_get;
#[cfg(test)]
mod testutils;
mod views;
pub(crate) use views::Views;

impl IntoRestError for CreateContactFailure {
    fn into_rest_error(self) -> RestError {
        match self {
            CreateContactFailure::DuplicateEmail => {
                RestError::Conflict("Email already exists".to_owned())
            }
        }
    }
}

impl IntoRestError for ProfileFailure {
    fn into_rest_error(self) -> RestError {
        match self {
            ProfileFailure::InvalidCredential => {
                RestError::Unauthorized("Invalid or expired GitHub token".to_owned())
            }
            ProfileFailure::QuotaExceeded => {
                RestError::TooManyRequests("GitHub API rate limit exceeded".to_owned())
            }
        }
    }
}

/// Creates the router for the application.
///
/// Requests that do not match any API are served from `static_dir`, if given, before falling back
/// to the not found view.
pub(crate) fn app(driver: Driver, views: Views, static_dir: Option<&Path>) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/list", get(list_get::handler))
        .route("/api/contacts", get(contacts_get::handler).post(contacts_post::handler))
        .route("/api/contacts/:id", get(contact_get::handler))
        .route("/api/github/user", post(github_user_post::handler))
        .with_state(driver);

    let pages = Router::new().route("/", get(index_get::handler)).with_state(views);

    boundary::wrap(api.merge(pages), views, static_dir)
}
