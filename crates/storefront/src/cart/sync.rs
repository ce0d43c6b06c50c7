//! Cart initialization.
//!
//! Page routes run [`cart_sync_middleware`] so every rendered page starts
//! from WordPress' view of the cart. A failed fetch leaves the previous
//! snapshot in place; whichever fetch finishes last wins.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use pressfront_core::Cart;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::models::{cart_key, store_woo_session, stored_woo_session};
use crate::state::AppState;
use crate::upstream::Credentials;
use crate::wordpress::{WithSession, WordPressClient, WordPressError};

use super::CartStore;

/// Fetch the cart and replace the stored snapshot for `key`.
///
/// On success returns the refreshed WooCommerce session, if WordPress issued
/// one. On failure the error is logged and the store is left untouched.
pub async fn sync_cart(
    client: &WordPressClient,
    store: &CartStore,
    key: &str,
    credentials: &Credentials,
) -> Option<String> {
    match client.get_cart(credentials).await {
        Ok(WithSession { value, session }) => {
            debug!(items = value.item_count, "Cart synced");
            store.replace(key, value).await;
            session
        }
        Err(e) => {
            warn!(error = %e, "Cart sync failed; keeping previous cart");
            None
        }
    }
}

/// Store the cart returned by a mutation and remember the refreshed session.
///
/// # Errors
///
/// Passes through the mutation error; the store is untouched in that case.
pub async fn store_mutation_result(
    state: &AppState,
    session: &Session,
    result: Result<WithSession<Cart>, WordPressError>,
) -> Result<Cart, WordPressError> {
    let WithSession { value, session: woo } = result?;
    match cart_key(session).await {
        Ok(key) => state.carts().replace(&key, value.clone()).await,
        Err(e) => warn!(error = %e, "No session available to store cart"),
    }
    remember_session(session, woo).await;
    Ok(value)
}

/// Credentials for server-side cart calls: the browser's headers, falling
/// back to the WooCommerce session remembered in the storefront session.
pub async fn cart_credentials(session: &Session, request_credentials: Credentials) -> Credentials {
    request_credentials.with_fallback_session(stored_woo_session(session).await)
}

async fn remember_session(session: &Session, woo: Option<String>) {
    if let Some(woo) = woo
        && let Err(e) = store_woo_session(session, &woo).await
    {
        warn!(error = %e, "Failed to store WooCommerce session");
    }
}

/// Middleware that syncs the session's cart before the page handler runs.
pub async fn cart_sync_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    match cart_key(&session).await {
        Ok(key) => {
            let credentials =
                cart_credentials(&session, Credentials::from_headers(request.headers())).await;
            let refreshed =
                sync_cart(state.wordpress(), state.carts(), &key, &credentials).await;
            remember_session(&session, refreshed).await;
        }
        Err(e) => warn!(error = %e, "No session available for cart sync"),
    }

    next.run(request).await
}
