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

//! Generic code for REST handlers.
//!
//! All services should implement an `app` function in this module that returns the `Router` for the
//! application.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.
//!
//! Handlers follow the same three steps: validate the untrusted input into model types (which
//! turns `ValidationFailure`s into 400 errors via `?`), call exactly one driver operation through
//! `invoke`, and wrap the result in a `SuccessResponse`.  The mapping from each domain failure kind
//! to an HTTP error lives in the service's implementations of `IntoRestError`.

use crate::driver::DriverError;
use crate::model::ValidationFailure;
use async_trait::async_trait;
use axum::Json;
use axum::body::HttpBody;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::future::Future;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
///
/// The payload of every variant is the message returned to the client, so it must never carry
/// internal details such as database errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Indicates that the request conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// Indicates that a quota, typically of a remote service, has been exhausted.
    #[error("{0}")]
    TooManyRequests(String),

    /// Indicates that the credentials supplied with the request were rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// Indicates that the request carried content of a type the API does not accept.
    #[error("{0}")]
    UnsupportedMediaType(String),
}

impl From<ValidationFailure> for RestError {
    fn from(e: ValidationFailure) -> Self {
        debug!("Rejecting invalid request: {:?}", e);
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::Conflict(_) => http::StatusCode::CONFLICT,
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
            RestError::TooManyRequests(_) => http::StatusCode::TOO_MANY_REQUESTS,
            RestError::Unauthorized(_) => http::StatusCode::UNAUTHORIZED,
            RestError::UnsupportedMediaType(_) => http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
        };

        let response = ErrorResponse { success: false, message: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Conversion from the domain failure kinds of a driver operation to HTTP errors.
///
/// Services implement this for every failure kind they define so that the mapping from expected
/// rejections to statuses is an exhaustive `match` in a single place.
pub trait IntoRestError {
    /// Converts this failure kind into the error returned to the client.
    fn into_rest_error(self) -> RestError;
}

impl IntoRestError for Infallible {
    fn into_rest_error(self) -> RestError {
        match self {}
    }
}

/// Awaits the driver operation `op` and classifies its outcome for the REST layer.
///
/// Domain failures are mapped via `IntoRestError` and logged at debug level because they are
/// expected rejections.  Unexpected failures are logged as errors with their full cause and are
/// reported to the client as an internal error carrying only the generic `unexpected` message.
pub async fn invoke<T, K, F>(op: F, unexpected: &'static str) -> RestResult<T>
where
    F: Future<Output = Result<T, DriverError<K>>>,
    K: IntoRestError + fmt::Debug,
{
    match op.await {
        Ok(value) => Ok(value),
        Err(DriverError::Domain(kind)) => {
            debug!("Operation rejected: {:?}", kind);
            Err(kind.into_rest_error())
        }
        Err(DriverError::Unexpected(cause)) => {
            error!("{}: {}", unexpected, cause);
            Err(RestError::InternalError(unexpected.to_owned()))
        }
    }
}

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Always false for errors.
    pub(crate) success: bool,

    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// Envelope for all successful JSON responses.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct SuccessResponse<T> {
    /// Always true for successful responses.
    pub success: bool,

    /// The payload of the response.
    pub data: T,

    /// Optional human-readable description of what happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Number of items in `data` for responses that return collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> SuccessResponse<T> {
    /// Creates a new successful response carrying `data`.
    pub fn new(data: T) -> Self {
        Self { success: true, data, message: None, total: None }
    }

    /// Attaches a human-readable `message` to the response.
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches the number of items in the response.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// A request body extractor for JSON payloads.
///
/// This behaves like `Json` but reports payloads that are not JSON, or that do not have the shape
/// of `T`, as a `RestError` so that clients get the same error response as for any other invalid
/// input.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(e)) => {
                debug!("Rejecting non-JSON payload: {}", e);
                Err(RestError::UnsupportedMediaType(e.body_text()))
            }
            Err(e) => Err(ValidationFailure::invalid_format(e.body_text()).into()),
        }
    }
}

/// Common test code for the REST server.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::http::{self, HeaderName, HeaderValue};
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the API server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: Router,

        /// Builder for the request that will be sent to the app.
        builder: axum::http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Sets the header `name` to `value` in the outgoing request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Finishes building the request and sends it with an empty payload.
        pub async fn send_empty(self) -> ResponseChecker {
            let request = self.builder.body(axum::body::Body::empty()).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a text payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
                .body(axum::body::Body::from(text.into()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a JSON payload.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }
    }

    /// Type alias for the complex type returned by the `oneshot` function.
    type HttpResponse = http::Response<axum::body::Body>;

    /// Validator for the outcome of a request sent by a `OneShotBuilder`.
    #[must_use]
    pub struct ResponseChecker {
        /// Actual response that we received from the app.
        response: HttpResponse,

        /// Expected HTTP status code in the response above.
        exp_status: http::StatusCode,
    }

    impl From<HttpResponse> for ResponseChecker {
        fn from(response: HttpResponse) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Sets the expected exit HTTP status to `status`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Finishes checking the response and expects it to contain an empty body.
        pub async fn expect_empty(self) {
            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            let body = String::from_utf8(body.to_vec()).unwrap();
            assert!(body.is_empty(), "Body not empty; got {}", body);
        }

        /// Finishes checking the response and expects its body to be an `ErrorResponse` whose
        /// message matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            let response: ErrorResponse = match serde_json::from_slice(&body) {
                Ok(response) => response,
                Err(e) => {
                    let body = String::from_utf8(body.to_vec()).unwrap();
                    panic!("Invalid error response due to {}; content was {}", e, body);
                }
            };
            assert!(!response.success, "Error response '{:?}' claims success", response);
            if exp_re.is_empty() {
                assert!(
                    response.message.is_empty(),
                    "Response content '{:?}' is not empty",
                    response
                );
            } else {
                let re = regex::Regex::new(exp_re).unwrap();
                assert!(
                    re.is_match(&response.message),
                    "Response content '{:?}' does not match re '{}'",
                    response,
                    exp_re
                );
            }
        }

        /// Finishes checking the response and expects it to contain a valid JSON object of
        /// type `T`.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            serde_json::from_slice::<T>(&body).unwrap()
        }

        /// Finishes checking the response and expects it to be a successful envelope carrying a
        /// payload of type `T`.
        pub async fn expect_success<T: DeserializeOwned>(self) -> SuccessResponse<T> {
            let response = self.expect_json::<SuccessResponse<T>>().await;
            assert!(response.success, "Successful response does not claim success");
            response
        }

        /// Finishes checking the response and expects its body to be valid UTF-8 and to match
        /// `exp_re`.
        pub async fn expect_text(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            let body = String::from_utf8(body.to_vec()).unwrap();
            assert!(
                !body.contains("\"message\":"),
                "Use expect_error to validate errors wrapped in an ErrorResponse"
            );
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
        }

        /// Finishes checking the response and returns the response itself for out of band
        /// validation of properties not supported by the `ResponseChecker`.
        pub async fn take_response(self) -> HttpResponse {
            self.verify();

            self.response
        }
    }

    /// Generates a test to verify that an API that expects JSON fails when it gets something else.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                let app = $app;

                $crate::rest::testutils::OneShotBuilder::new(app.clone(), $route)
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_error("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new(app.clone(), $route)
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("expected ident")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new(app, $route)
                    .send_json(serde_json::json!([1, 2]))
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("invalid type")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Generates a test to verify that an API that does not expect a payload fails as necessary.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    .send_text("should not be here")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Kind {
        Gone,
    }

    impl IntoRestError for Kind {
        fn into_rest_error(self) -> RestError {
            match self {
                Kind::Gone => RestError::NotFound("It is gone".to_owned()),
            }
        }
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let result = invoke(async { Ok::<_, DriverError<Kind>>(5) }, "Oops").await;
        assert_eq!(Ok(5), result);
    }

    #[tokio::test]
    async fn test_invoke_domain_failure() {
        let result = invoke(async { Err::<(), _>(DriverError::Domain(Kind::Gone)) }, "Oops").await;
        assert_eq!(Err(RestError::NotFound("It is gone".to_owned())), result);
    }

    #[tokio::test]
    async fn test_invoke_unexpected_failure_hides_cause() {
        let result = invoke(
            async { Err::<(), DriverError<Infallible>>(DriverError::unexpected("secret details")) },
            "Something failed",
        )
        .await;
        assert_eq!(Err(RestError::InternalError("Something failed".to_owned())), result);
    }

    #[test]
    fn test_rest_error_from_validation_failure() {
        assert_eq!(
            RestError::InvalidRequest("Bad thing".to_owned()),
            RestError::from(ValidationFailure::invalid_format("Bad thing"))
        );
    }

    #[tokio::test]
    async fn test_rest_error_into_response() {
        for (err, status, message) in [
            (RestError::Conflict("c".to_owned()), http::StatusCode::CONFLICT, "c"),
            (
                RestError::InternalError("i".to_owned()),
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "i",
            ),
            (RestError::InvalidRequest("r".to_owned()), http::StatusCode::BAD_REQUEST, "r"),
            (RestError::NotFound("n".to_owned()), http::StatusCode::NOT_FOUND, "n"),
            (
                RestError::PayloadNotEmpty,
                http::StatusCode::PAYLOAD_TOO_LARGE,
                "Content should be empty",
            ),
            (RestError::TooManyRequests("t".to_owned()), http::StatusCode::TOO_MANY_REQUESTS, "t"),
            (RestError::Unauthorized("u".to_owned()), http::StatusCode::UNAUTHORIZED, "u"),
            (
                RestError::UnsupportedMediaType("m".to_owned()),
                http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "m",
            ),
        ] {
            let response = err.into_response();
            assert_eq!(status, response.status());
            let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(serde_json::json!({"success": false, "message": message}), body);
        }
    }

    #[tokio::test]
    async fn test_success_response_shape() {
        let response = SuccessResponse::new(vec![1, 2]).with_message("Done").with_total(2);
        let body = axum::body::to_bytes(response.into_response().into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            serde_json::json!({"success": true, "data": [1, 2], "message": "Done", "total": 2}),
            body
        );

        let response = SuccessResponse::new("x");
        let body = axum::body::to_bytes(response.into_response().into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(serde_json::json!({"success": true, "data": "x"}), body);
    }
}
