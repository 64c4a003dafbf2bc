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

//! API to create a new contact.

use crate::driver::Driver;
use crate::model::{Contact, NewContact};
use axum::extract::State;
use rolodex_core::rest::{JsonBody, RestResult, SuccessResponse, invoke};
use serde::{Deserialize, Serialize};

/// Message sent to the server to create a contact.
///
/// Fields are optional so that missing values are reported with the same message as empty ones
/// instead of as a deserialization failure.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct ContactRequest {
    /// Name of the new contact.
    pub(crate) name: Option<String>,

    /// Email address of the new contact.
    pub(crate) email: Option<String>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(request): JsonBody<ContactRequest>,
) -> RestResult<SuccessResponse<Contact>> {
    let contact = NewContact::validate(request.name, request.email)?;
    let contact = invoke(driver.create_contact(contact), "Internal server error").await?;
    Ok(SuccessResponse::new(contact).with_message("Contact created successfully"))
}
