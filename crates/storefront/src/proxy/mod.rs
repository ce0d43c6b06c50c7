//! Same-origin proxy routes to WordPress.
//!
//! ```text
//! POST /api/graphql               - WPGraphQL pass-through
//! ANY  /api/buddypress/{*route}   - BuddyPress REST pass-through (GET/POST/PUT/DELETE)
//! POST /api/logout                - WordPress logout + cookie cleanup
//! ```
//!
//! Each route answers disallowed methods itself so the 405 body matches the
//! envelope clients already parse for that API. Upstream replies go through
//! [`crate::upstream::classify`]; HTML error pages are never forwarded.

pub mod buddypress;
pub mod graphql;
pub mod logout;

use axum::{Router, routing::any};

use crate::state::AppState;

/// Create the proxy routes router (mounted under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/graphql", any(graphql::handle))
        .route("/buddypress/{*route}", any(buddypress::handle))
        .route("/logout", any(logout::handle))
}
