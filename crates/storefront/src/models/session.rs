//! Session-related helpers.
//!
//! The storefront session holds no WordPress identity of its own; login
//! state lives in WordPress cookies. The session only keys the cart store,
//! remembers the WooCommerce session token, and carries the post-login
//! return path.

use tower_sessions::Session;
use uuid::Uuid;

/// Session keys.
pub mod keys {
    /// Key for the [`crate::cart::CartStore`] entry of this browser.
    pub const CART_KEY: &str = "cart_key";

    /// Key for the WooCommerce session header value (`Session <token>`).
    pub const WOO_SESSION: &str = "woo_session";

    /// Key for the path to return to after logging in.
    pub const RETURN_TO: &str = "return_to";
}

/// The cart store key for this session, created on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn cart_key(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(key) = session.get::<String>(keys::CART_KEY).await? {
        return Ok(key);
    }
    let key = Uuid::new_v4().to_string();
    session.insert(keys::CART_KEY, &key).await?;
    Ok(key)
}

/// The WooCommerce session header value remembered for this browser.
pub async fn stored_woo_session(session: &Session) -> Option<String> {
    session.get::<String>(keys::WOO_SESSION).await.ok().flatten()
}

/// Remember a refreshed WooCommerce session header value.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_woo_session(
    session: &Session,
    value: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::WOO_SESSION, value).await
}

/// Remember where to send the shopper after login.
///
/// Only same-site paths are stored.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_return_to(
    session: &Session,
    path: &str,
) -> Result<(), tower_sessions::session::Error> {
    if is_local_path(path) {
        session.insert(keys::RETURN_TO, path).await?;
    }
    Ok(())
}

/// The stored return path, if any.
pub async fn return_to(session: &Session) -> Option<String> {
    session.get::<String>(keys::RETURN_TO).await.ok().flatten()
}

/// Whether `path` is a same-site absolute path (`/account`, not `//evil.com`).
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
