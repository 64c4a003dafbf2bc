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

//! Operations against the remote profile service.

use crate::driver::Driver;
use rolodex_core::driver::{DriverError, DriverResult};
use rolodex_github::{AccessToken, GitHubError, UserProfile};

/// Expected rejections of the `get_remote_profile` operation.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum ProfileFailure {
    /// The remote service rejected the caller's token.
    #[error("Invalid or expired GitHub token")]
    InvalidCredential,

    /// The remote service refused to answer because the caller exhausted its quota.
    #[error("GitHub API rate limit exceeded")]
    QuotaExceeded,
}

/// Classifies the errors returned by the remote profile service.
fn classify(e: GitHubError) -> DriverError<ProfileFailure> {
    match e {
        GitHubError::InvalidCredential => DriverError::Domain(ProfileFailure::InvalidCredential),
        GitHubError::RateLimited => DriverError::Domain(ProfileFailure::QuotaExceeded),
        GitHubError::BackendError(e) => DriverError::Unexpected(e),
    }
}

impl Driver {
    /// Fetches the profile of the remote user that owns `token`.
    pub(crate) async fn get_remote_profile(
        self,
        token: AccessToken,
    ) -> DriverResult<UserProfile, ProfileFailure> {
        let profile = self.github.get_user(&token).await.map_err(classify)?;
        Ok(profile)
    }
}
