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

//! Profile fetcher backed by the GitHub REST API.

use crate::{AccessToken, GitHubError, GitHubResult, ProfileFetcher, UserProfile};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use rolodex_core::env::get_optional_var;
use url::Url;

/// Default base URL of the GitHub REST API.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default value of the `User-Agent` header, which GitHub requires in all requests.
const DEFAULT_USER_AGENT: &str = "rolodex";

/// Media type that selects the v3 version of the GitHub REST API.
const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Converts a `reqwest::Error` to a `GitHubError`.
fn reqwest_error_to_github_error(e: reqwest::Error) -> GitHubError {
    GitHubError::BackendError(format!("{}", e))
}

/// Converts a `reqwest::Response` to a `GitHubError`.  The response should have a non-OK status.
async fn http_response_to_github_error(response: Response) -> GitHubError {
    let status = response.status();

    match status {
        StatusCode::UNAUTHORIZED => return GitHubError::InvalidCredential,

        // GitHub reports exhausted quotas as 403 and secondary rate limits as 429.
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => return GitHubError::RateLimited,

        _ => (),
    }

    match response.text().await {
        Ok(text) => GitHubError::BackendError(format!(
            "HTTP request returned status {} with text '{}'",
            status, text
        )),
        Err(e) => GitHubError::BackendError(format!(
            "HTTP request returned status {} and failed to get text due to {}",
            status, e
        )),
    }
}

/// Options to configure a `GitHubClient`.
#[derive(Debug, PartialEq)]
pub struct GitHubOptions {
    /// Base URL of the REST API, always ending in a slash.
    pub api_base: Url,

    /// Value of the `User-Agent` header to send with every request.
    pub user_agent: String,
}

impl Default for GitHubOptions {
    fn default() -> Self {
        Self {
            api_base: parse_api_base(DEFAULT_API_BASE).expect("Hardcoded URL must be valid"),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Parses `raw` as the base URL of the API and ensures it can have paths appended to it.
fn parse_api_base(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| format!("Invalid API base URL {}: {}", raw, e))?;
    if url.cannot_be_a_base() {
        return Err(format!("Invalid API base URL {}: cannot have paths", raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl GitHubOptions {
    /// Creates a set of options from environment variables whose name is prefixed with the given
    /// `prefix`.
    ///
    /// This will use variables such as `<prefix>_API_BASE` and `<prefix>_USER_AGENT`, all of
    /// which are optional.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let api_base = match get_optional_var::<String>(prefix, "API_BASE")? {
            Some(raw) => parse_api_base(&raw)?,
            None => parse_api_base(DEFAULT_API_BASE)?,
        };
        let user_agent = get_optional_var::<String>(prefix, "USER_AGENT")?
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        Ok(Self { api_base, user_agent })
    }
}

/// Profile fetcher that talks to the GitHub REST API.
#[derive(Clone)]
pub struct GitHubClient {
    /// Asynchronous HTTP client with which to issue the service requests.
    client: Client,

    /// Base URL of the REST API.
    api_base: Url,

    /// Value of the `User-Agent` header.
    user_agent: String,
}

impl GitHubClient {
    /// Creates a new GitHub client using `opts` for configuration.
    pub fn new(opts: GitHubOptions) -> Self {
        Self { client: Client::default(), api_base: opts.api_base, user_agent: opts.user_agent }
    }
}

#[async_trait]
impl ProfileFetcher for GitHubClient {
    async fn get_user(&self, token: &AccessToken) -> GitHubResult<UserProfile> {
        let url = self
            .api_base
            .join("user")
            .map_err(|e| GitHubError::BackendError(format!("Cannot build request URL: {}", e)))?;

        debug!("Fetching GitHub user profile from {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("token {}", token.as_str()))
            .header(ACCEPT, GITHUB_V3_JSON)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(reqwest_error_to_github_error)?;

        if response.status().is_success() {
            response.json::<UserProfile>().await.map_err(reqwest_error_to_github_error)
        } else {
            Err(http_response_to_github_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    /// Creates a client that talks to the mock `server`.
    fn new_client(server: &MockServer) -> GitHubClient {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        GitHubClient::new(GitHubOptions {
            api_base: parse_api_base(&server.base_url()).unwrap(),
            user_agent: "test-agent".to_owned(),
        })
    }

    /// Shorthand to create a valid access token.
    fn token(raw: &str) -> AccessToken {
        AccessToken::new(Some(raw.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn test_get_user_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/user")
                    .header("authorization", "token the-token")
                    .header("accept", GITHUB_V3_JSON)
                    .header("user-agent", "test-agent");
                then.status(200).json_body(serde_json::json!({
                    "login": "octocat",
                    "id": 1,
                    "name": "The Octocat",
                    "public_repos": 8,
                }));
            })
            .await;

        let profile = new_client(&server).get_user(&token("the-token")).await.unwrap();
        assert_eq!("octocat", profile.login);
        assert_eq!(1, profile.id);
        assert_eq!(Some("The Octocat".to_owned()), profile.name);
        assert_eq!(8, profile.public_repos);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_api_base_with_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/user");
                then.status(200).json_body(serde_json::json!({"login": "ghe", "id": 2}));
            })
            .await;

        let client = GitHubClient::new(GitHubOptions {
            api_base: parse_api_base(&format!("{}/api/v3", server.base_url())).unwrap(),
            user_agent: "test-agent".to_owned(),
        });
        assert_eq!("ghe", client.get_user(&token("x")).await.unwrap().login);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(401).json_body(serde_json::json!({"message": "Bad credentials"}));
            })
            .await;

        let err = new_client(&server).get_user(&token("bad")).await.unwrap_err();
        assert_eq!(GitHubError::InvalidCredential, err);
    }

    #[tokio::test]
    async fn test_get_user_too_many_requests() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(429);
            })
            .await;

        let err = new_client(&server).get_user(&token("t")).await.unwrap_err();
        assert_eq!(GitHubError::RateLimited, err);
    }

    #[tokio::test]
    async fn test_get_user_forbidden_with_exhausted_quota() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(403).header("x-ratelimit-remaining", "0");
            })
            .await;

        let err = new_client(&server).get_user(&token("t")).await.unwrap_err();
        assert_eq!(GitHubError::RateLimited, err);
    }

    #[tokio::test]
    async fn test_get_user_forbidden_without_quota_headers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(403).body("API rate limit exceeded for user ID 1.");
            })
            .await;

        let err = new_client(&server).get_user(&token("t")).await.unwrap_err();
        assert_eq!(GitHubError::RateLimited, err);
    }

    #[tokio::test]
    async fn test_get_user_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(502).body("Bad gateway");
            })
            .await;

        match new_client(&server).get_user(&token("t")).await.unwrap_err() {
            GitHubError::BackendError(e) => assert!(e.contains("502")),
            e => panic!("Unexpected error {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_user_bad_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user");
                then.status(200).body("this is not json");
            })
            .await;

        match new_client(&server).get_user(&token("t")).await.unwrap_err() {
            GitHubError::BackendError(_) => (),
            e => panic!("Unexpected error {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_user_unreachable() {
        let client = GitHubClient::new(GitHubOptions {
            api_base: parse_api_base("http://127.0.0.1:1").unwrap(),
            user_agent: "test-agent".to_owned(),
        });
        match client.get_user(&token("t")).await.unwrap_err() {
            GitHubError::BackendError(_) => (),
            e => panic!("Unexpected error {:?}", e),
        }
    }

    #[test]
    fn test_parse_api_base() {
        assert_eq!(
            "https://api.github.com/",
            parse_api_base("https://api.github.com").unwrap().as_str()
        );
        assert_eq!("http://host/api/v3/", parse_api_base("http://host/api/v3").unwrap().as_str());
        assert_eq!("http://host/api/v3/", parse_api_base("http://host/api/v3/").unwrap().as_str());
        assert!(parse_api_base("not a url").is_err());
        assert!(parse_api_base("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_github_options_from_env_defaults() {
        temp_env::with_vars(
            [("GITHUB_DEFAULTS_API_BASE", None::<&str>), ("GITHUB_DEFAULTS_USER_AGENT", None)],
            || {
                assert_eq!(
                    GitHubOptions::default(),
                    GitHubOptions::from_env("GITHUB_DEFAULTS").unwrap()
                );
            },
        );
    }

    #[test]
    fn test_github_options_from_env_overrides() {
        temp_env::with_vars(
            [
                ("GITHUB_CUSTOM_API_BASE", Some("http://localhost:1234")),
                ("GITHUB_CUSTOM_USER_AGENT", Some("custom-agent")),
            ],
            || {
                let opts = GitHubOptions::from_env("GITHUB_CUSTOM").unwrap();
                assert_eq!("http://localhost:1234/", opts.api_base.as_str());
                assert_eq!("custom-agent", opts.user_agent);
            },
        );
    }

    #[test]
    fn test_github_options_from_env_bad_url() {
        temp_env::with_var("GITHUB_BAD_API_BASE", Some("::"), || {
            let err = GitHubOptions::from_env("GITHUB_BAD").unwrap_err();
            assert!(err.contains("Invalid API base URL"));
        });
    }
}
