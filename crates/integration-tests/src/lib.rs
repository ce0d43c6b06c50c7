//! Integration tests for Pressfront.
//!
//! Each test starts a `wiremock` server standing in for WordPress, builds the
//! real storefront router against it once and drives requests through
//! `tower::ServiceExt::oneshot` on clones of that router, so the session
//! store and cart store persist across requests within a test. No network
//! listener or running WordPress is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pressfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `proxy` - GraphQL, `BuddyPress` and logout proxy routes
//! - `storefront` - Pages, cart and JSON API routes

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use pressfront_storefront::config::{StorefrontConfig, WordPressConfig};
use pressfront_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// Public storefront URL used by every test.
pub const STOREFRONT_URL: &str = "http://shop.example.com";

/// Cookie domain configured for every test.
pub const COOKIE_DOMAIN: &str = ".example.com";

/// A stubbed WordPress and a storefront pointed at it.
pub struct TestContext {
    pub wordpress: MockServer,
    router: Router,
}

impl TestContext {
    /// Start a stub WordPress and build the storefront state.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub async fn new() -> Self {
        let wordpress = MockServer::start().await;

        let mut wp = WordPressConfig::new(&wordpress.uri());
        wp.cookie_domain = Some(COOKIE_DOMAIN.to_string());
        let config = StorefrontConfig::new(STOREFRONT_URL, wp);

        #[allow(clippy::expect_used)]
        let state = AppState::new(config).expect("Failed to build application state");
        let router = pressfront_storefront::app(state);
        Self { wordpress, router }
    }

    /// The storefront router shared by every request of this context.
    #[must_use]
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Send one request through the shared router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of a single-valued header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `name=value` of the cookie set under `name`, ready for a `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .filter_map(|c| c.split(';').next())
            .find(|pair| pair.split_once('=').is_some_and(|(n, _)| n.trim() == name))
            .map(str::to_owned)
    }

    /// Every `Set-Cookie` value.
    #[must_use]
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// Build a request.
///
/// # Panics
///
/// Panics if the method, uri or headers are invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn request(method: &str, uri: &str, headers: &[(&str, &str)], body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).expect("Invalid request")
}
