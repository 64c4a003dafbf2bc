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

//! Server-rendered HTML views.

use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use log::error;
use rolodex_core::env::Environment;
use rolodex_core::template::{self, TemplateError};

/// Template for the landing page.  Takes `title` and `data`.
const INDEX_TEMPLATE: &str = include_str!("../../views/index.html");

/// Template for unmatched routes.
const NOT_FOUND_TEMPLATE: &str = include_str!("../../views/404.html");

/// Template for unexpected failures.  Takes `details`.
const INTERNAL_ERROR_TEMPLATE: &str = include_str!("../../views/500.html");

/// Last-resort body for when the internal error template itself cannot be rendered.
const INTERNAL_ERROR_FALLBACK: &str = "Internal server error";

/// Renderer for all the HTML views of the service.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Views {
    /// Deployment mode, which determines whether error pages carry diagnostic details.
    environment: Environment,
}

impl Views {
    /// Creates a new renderer for the given deployment mode.
    pub(crate) fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Renders the landing page showing `data` under `title`.
    pub(crate) fn index(&self, title: &str, data: &str) -> Result<Html<String>, ViewError> {
        let title = template::escape_html(title);
        let data = template::escape_html(data);
        self.render(INDEX_TEMPLATE, &[("title", &title), ("data", &data)])
    }

    /// Renders the page for unmatched routes.
    pub(crate) fn not_found(&self) -> Response {
        match self.render(NOT_FOUND_TEMPLATE, &[]) {
            Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
            Err(e) => e.into_response(),
        }
    }

    /// Renders the page for unexpected failures.  The `details` of the failure are only shown
    /// outside of production.
    pub(crate) fn internal_error(&self, details: &str) -> Response {
        let details = if self.environment.is_production() {
            String::new()
        } else {
            format!("<pre>{}</pre>", template::escape_html(details))
        };
        let body = match template::apply(INTERNAL_ERROR_TEMPLATE, &[("details", &details)]) {
            Ok(body) => Html(body),
            Err(e) => {
                error!("Failed to render internal error view: {}", e);
                Html(INTERNAL_ERROR_FALLBACK.to_owned())
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }

    /// Expands `input` with `replacements`, tying any failure to this renderer so that it can be
    /// reported with the internal error view.
    fn render(
        &self,
        input: &str,
        replacements: &[(&str, &str)],
    ) -> Result<Html<String>, ViewError> {
        match template::apply(input, replacements) {
            Ok(body) => Ok(Html(body)),
            Err(cause) => Err(ViewError { views: *self, cause }),
        }
    }
}

/// Failure to render a view.  Converts into the internal error view.
#[derive(Debug)]
pub(crate) struct ViewError {
    /// Renderer to use for the error page.
    views: Views,

    /// What went wrong.
    cause: TemplateError,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        error!("Failed to render view: {}", self.cause);
        self.views.internal_error(&self.cause.to_string())
    }
}
