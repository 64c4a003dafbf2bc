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

//! Top-level handling of requests that no API takes care of.

use crate::rest::views::Views;
use axum::Router;
use axum::extract::State;
use axum::handler::Handler;
use axum::middleware;
use axum::response::Response;
use http::StatusCode;
use log::error;
use std::any::Any;
use std::path::Path;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;

/// Handler for requests that did not match any route nor static file.
async fn not_found(State(views): State<Views>) -> Response {
    views.not_found()
}

/// Turns the rejection of a known path called with an unsupported method into the not found view.
async fn method_not_allowed(State(views): State<Views>, response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED { views.not_found() } else { response }
}

/// Extracts a printable description out of the `payload` of a panic.
fn panic_details(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "Unknown panic".to_owned()
    }
}

/// Wraps a fully-routed `router` so that unmatched requests are served from `static_dir`, if any,
/// or get the not found view, and so that panics in any handler get the internal error view.
///
/// Paths that exist but do not support the request's method are treated as unmatched too.
pub(crate) fn wrap(router: Router, views: Views, static_dir: Option<&Path>) -> Router {
    let not_found = not_found.with_state(views);
    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).call_fallback_on_method_not_allowed(true).fallback(not_found),
        ),
        None => router.fallback_service(not_found),
    };

    router.layer(middleware::map_response_with_state(views, method_not_allowed)).layer(
        CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| {
            let details = panic_details(payload.as_ref());
            error!("Request handler panicked: {}", details);
            views.internal_error(&details)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use http::Method;
    use rolodex_core::env::Environment;
    use rolodex_core::rest::testutils::OneShotBuilder;
    use std::fs;

    /// Handler that always panics.
    async fn panicky_handler() -> &'static str {
        panic!("Oh no, a <bug>");
    }

    /// Creates a router with a route that works and another one that panics.
    fn panicky_app(environment: Environment, static_dir: Option<&Path>) -> Router {
        let router = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/panic", get(panicky_handler));
        wrap(router, Views::new(environment), static_dir)
    }

    #[tokio::test]
    async fn test_matched_route_is_untouched() {
        OneShotBuilder::new(panicky_app(Environment::Development, None), (Method::GET, "/ok"))
            .send_empty()
            .await
            .expect_text("^fine$")
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        for method in [Method::GET, Method::POST] {
            OneShotBuilder::new(panicky_app(Environment::Development, None), (method, "/missing"))
                .send_empty()
                .await
                .expect_status(StatusCode::NOT_FOUND)
                .expect_text("Page not found")
                .await;
        }
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_not_found() {
        for method in [Method::POST, Method::DELETE] {
            OneShotBuilder::new(panicky_app(Environment::Development, None), (method, "/ok"))
                .send_empty()
                .await
                .expect_status(StatusCode::NOT_FOUND)
                .expect_text("Page not found")
                .await;
        }
    }

    #[tokio::test]
    async fn test_panic_development() {
        OneShotBuilder::new(panicky_app(Environment::Development, None), (Method::GET, "/panic"))
            .send_empty()
            .await
            .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
            .expect_text("Oh no, a &lt;bug&gt;")
            .await;
    }

    #[tokio::test]
    async fn test_panic_production() {
        let response =
            OneShotBuilder::new(panicky_app(Environment::Production, None), (Method::GET, "/panic"))
                .send_empty()
                .await
                .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
                .take_response()
                .await;
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Internal server error"));
        assert!(!body.contains("Oh no"));
    }

    #[tokio::test]
    async fn test_static_dir() {
        let dir = std::env::temp_dir().join(format!("rolodex-static-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("hello.txt"), "Hello from disk").unwrap();

        let app = panicky_app(Environment::Development, Some(&dir));

        OneShotBuilder::new(app.clone(), (Method::GET, "/hello.txt"))
            .send_empty()
            .await
            .expect_text("Hello from disk")
            .await;

        OneShotBuilder::new(app.clone(), (Method::GET, "/ok"))
            .send_empty()
            .await
            .expect_text("^fine$")
            .await;

        for method in [Method::GET, Method::POST] {
            OneShotBuilder::new(app.clone(), (method, "/missing.txt"))
                .send_empty()
                .await
                .expect_status(StatusCode::NOT_FOUND)
                .expect_text("Page not found")
                .await;
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
