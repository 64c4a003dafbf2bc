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

//! API to look up the GitHub profile of the owner of a token.

use crate::driver::Driver;
use axum::extract::State;
use rolodex_core::rest::{JsonBody, RestResult, SuccessResponse, invoke};
use rolodex_github::{AccessToken, UserProfile};
use serde::{Deserialize, Serialize};

/// Message sent to the server to look up a profile.
#[derive(Deserialize, Serialize)]
pub(crate) struct ProfileRequest {
    /// Token of the user whose profile to fetch.
    pub(crate) token: Option<String>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(request): JsonBody<ProfileRequest>,
) -> RestResult<SuccessResponse<UserProfile>> {
    let token = AccessToken::new(request.token)?;
    let profile = invoke(
        driver.get_remote_profile(token),
        "Failed to retrieve GitHub user information",
    )
    .await?;
    Ok(SuccessResponse::new(profile))
}
