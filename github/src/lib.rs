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

//! APIs to fetch GitHub user profiles on behalf of a caller-supplied access token.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use async_trait::async_trait;
use derivative::Derivative;
use rolodex_core::model::{ModelResult, ValidationFailure};
use serde::{Deserialize, Serialize};

mod client;
pub use client::{GitHubClient, GitHubOptions};
#[cfg(any(test, feature = "testutils"))]
mod mock;
#[cfg(any(test, feature = "testutils"))]
pub use mock::MockProfileFetcher;

/// Errors that can be returned by a `ProfileFetcher`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GitHubError {
    /// The remote service rejected the access token.
    #[error("Invalid or expired GitHub token")]
    InvalidCredential,

    /// The remote service refused to serve the request because the caller exhausted its quota.
    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    /// Catch-all error for transport failures, unexpected statuses and undecodable responses.
    #[error("GitHub API error: {0}")]
    BackendError(String),
}

/// Result type for this crate.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// An opaque access token supplied by the caller to query GitHub on their behalf.
///
/// The token is never printed, not even in debug output.
#[derive(Clone, Derivative, PartialEq)]
#[derivative(Debug)]
pub struct AccessToken {
    /// The raw token as given by the caller.
    #[derivative(Debug = "ignore")]
    secret: String,
}

impl AccessToken {
    /// Creates a new access token from an untrusted, possibly missing, `raw` value.
    ///
    /// Beyond rejecting missing and blank values, the token is passed to GitHub as is.
    pub fn new(raw: Option<String>) -> ModelResult<Self> {
        let secret = match raw {
            Some(secret) if !secret.is_empty() => secret,
            _ => return Err(ValidationFailure::missing_field("GitHub token is required")),
        };

        if secret.trim().is_empty() {
            return Err(ValidationFailure::missing_field("Invalid token format"));
        }

        Ok(Self { secret })
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.secret
    }
}

/// Read-only projection of a GitHub account as returned by the `/user` API.
///
/// Only `login` and `id` are required.  Any fields not modeled here are preserved in `extra` so
/// that callers see the full profile returned by GitHub.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct UserProfile {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub gravatar_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub followers_url: String,
    #[serde(default)]
    pub following_url: String,
    #[serde(default)]
    pub gists_url: String,
    #[serde(default)]
    pub starred_url: String,
    #[serde(default)]
    pub subscriptions_url: String,
    #[serde(default)]
    pub organizations_url: String,
    #[serde(default)]
    pub repos_url: String,
    #[serde(default)]
    pub events_url: String,
    #[serde(default)]
    pub received_events_url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hireable: Option<bool>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub public_gists: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,

    /// Fields returned by GitHub that are not modeled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Interface to fetch the profile of the user that owns an access token.
#[async_trait]
pub trait ProfileFetcher {
    /// Fetches the profile of the user identified by `token`.
    async fn get_user(&self, token: &AccessToken) -> GitHubResult<UserProfile>;
}
