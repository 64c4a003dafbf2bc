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

//! Landing page.

use crate::rest::views::{ViewError, Views};
use axum::extract::State;
use axum::response::Html;
use rolodex_core::rest::EmptyBody;

/// Title of the landing page.
const TITLE: &str = "Rolodex";

/// Data rendered by the server into the landing page.
const DATA: &str = "服务端数据";

/// GET handler for this page.
pub(crate) async fn handler(
    State(views): State<Views>,
    _: EmptyBody,
) -> Result<Html<String>, ViewError> {
    views.index(TITLE, DATA)
}
