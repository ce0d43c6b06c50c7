//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings WordPress)
//!
//! # Pages (cart synced from WooCommerce before rendering)
//! GET  /                       - Shop listing
//! GET  /shop                   - Shop listing (filters in the query string)
//! GET  /products/{slug}        - Product detail
//! GET  /cart                   - Cart page
//! GET  /checkout               - Redirect to WooCommerce checkout
//! GET  /account                - Account overview (requires login)
//! GET  /search                 - Search results
//! GET  /*                      - WordPress page by URI, else 404
//!
//! # Cart (HTMX fragments, or redirect to /cart for plain forms)
//! POST /cart/add               - Add to cart (returns count badge)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Auth
//! GET  /login                  - Redirect to wp-login.php
//!
//! # JSON API
//! GET  /api/products           - Filtered listing with facets
//! GET  /api/cart               - Session cart
//! GET  /api/search             - Search hits
//! POST /api/graphql            - WPGraphQL proxy
//! ANY  /api/buddypress/{*path} - BuddyPress REST proxy
//! POST /api/logout             - WordPress logout
//! ```

pub mod account;
pub mod api;
pub mod cart;
pub mod health;
pub mod pages;
pub mod products;
pub mod search;
pub mod view;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::cart::cart_sync_middleware;
use crate::proxy;
use crate::state::AppState;

/// Full-page routes. Each request syncs the session cart first.
pub fn page_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/shop", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/cart", get(cart::show))
        .route("/checkout", get(cart::checkout))
        .route("/account", get(account::index))
        .route("/search", get(search::search_page))
        .fallback(pages::fallback)
        .layer(from_fn_with_state(state.clone(), cart_sync_middleware))
}

/// Cart mutation and fragment routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// JSON API routes, including the WordPress proxies.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products))
        .route("/cart", get(api::cart))
        .route("/search", get(api::search))
        .merge(proxy::routes())
}

/// Create the full storefront router.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/login", get(account::login))
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
        .merge(page_routes(state))
}
