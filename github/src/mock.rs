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

//! Profile fetcher backed by an in-memory map for testing purposes.

use crate::{AccessToken, GitHubError, GitHubResult, ProfileFetcher, UserProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Profile fetcher that returns canned responses keyed by access token.
///
/// Tokens without a canned response are treated as invalid credentials.
#[derive(Clone, Default)]
pub struct MockProfileFetcher {
    /// Mapping of raw tokens to the responses to return for them.
    responses: HashMap<String, GitHubResult<UserProfile>>,

    /// Number of calls to `get_user` across all clones of this fetcher.
    calls: Arc<AtomicUsize>,
}

impl MockProfileFetcher {
    /// Creates a new mock fetcher with no known tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the `result` to return when queried with the raw `token`.
    pub fn with_response<T: Into<String>>(
        mut self,
        token: T,
        result: GitHubResult<UserProfile>,
    ) -> Self {
        self.responses.insert(token.into(), result);
        self
    }

    /// Registers a minimal profile for `login` and `id` to return when queried with `token`.
    pub fn with_profile<T: Into<String>, L: Into<String>>(
        self,
        token: T,
        login: L,
        id: u64,
    ) -> Self {
        let profile = UserProfile { login: login.into(), id, ..Default::default() };
        self.with_response(token, Ok(profile))
    }

    /// Returns the number of times `get_user` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileFetcher for MockProfileFetcher {
    async fn get_user(&self, token: &AccessToken) -> GitHubResult<UserProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(token.as_str()) {
            Some(result) => result.clone(),
            None => Err(GitHubError::InvalidCredential),
        }
    }
}
