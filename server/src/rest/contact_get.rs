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

//! API to get a single contact.

use crate::driver::Driver;
use crate::model::{Contact, ContactId};
use axum::extract::{Path, State};
use rolodex_core::rest::{EmptyBody, RestError, RestResult, SuccessResponse, invoke};

/// API handler.
///
/// The identifier is taken as a raw string so that malformed values are reported through our own
/// validation instead of through the path extractor.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> RestResult<SuccessResponse<Contact>> {
    let id = ContactId::parse(&id)?;
    match invoke(driver.get_contact(id), "Internal server error").await? {
        Some(contact) => Ok(SuccessResponse::new(contact)),
        None => Err(RestError::NotFound("Contact not found".to_owned())),
    }
}
