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

//! API to get the values of the static information record.

use crate::driver::Driver;
use axum::extract::State;
use rolodex_core::rest::{EmptyBody, RestResult, SuccessResponse, invoke};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    _: EmptyBody,
) -> RestResult<SuccessResponse<Vec<i64>>> {
    let info = invoke(driver.get_info(), "Internal server error").await?;
    Ok(SuccessResponse::new(info.result().clone()))
}
