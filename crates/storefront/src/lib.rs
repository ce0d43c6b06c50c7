//! Pressfront storefront library.
//!
//! Server-rendered storefront and same-origin proxy for a headless
//! WordPress + WooCommerce backend. The binary in `main.rs` only adds
//! Sentry and the listener; everything routable is built by [`app`] so tests
//! can drive it with `tower::ServiceExt::oneshot`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod proxy;
pub mod routes;
pub mod search;
pub mod state;
pub mod upstream;
pub mod wordpress;

use axum::{Router, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront application router.
///
/// Layers, outermost first: tracing, request id, security headers, session.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes(&state))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
