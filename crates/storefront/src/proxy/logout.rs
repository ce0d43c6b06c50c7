//! Logout.
//!
//! WordPress and WooCommerce scatter cookies across several paths and, on
//! multisite or subdomain installs, a shared cookie domain. Logging out calls
//! the WordPress logout URL, then expires every matching cookie the browser
//! sent for each path and domain combination, and drops the storefront
//! session together with its cart.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;
use tower_sessions::cookie::{
    Cookie,
    time::{Duration, OffsetDateTime},
};
use tracing::{info, instrument, warn};

use crate::config::WordPressConfig;
use crate::error::clear_sentry_user;
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::models::session_keys;
use crate::state::AppState;
use crate::upstream::{Credentials, PassThroughHeaders};

/// Cookie name prefixes set by WordPress core and WooCommerce.
const COOKIE_PREFIXES: &[&str] = &[
    "wordpress_logged_in_",
    "wordpress_sec_",
    "wordpress_",
    "wp-settings-",
    "wp-settings-time-",
    "woocommerce_",
    "wp_woocommerce_session_",
];

/// Cookies always expired, whether or not the browser sent them.
const FIXED_COOKIES: &[&str] = &[
    "wordpress_test_cookie",
    "woocommerce_cart_hash",
    "woocommerce_items_in_cart",
    "woocommerce-session",
];

/// Paths WordPress sets cookies on.
const COOKIE_PATHS: &[&str] = &["/", "/wp-admin", "/wp-content/plugins"];

/// Names of every cookie to expire for this request.
fn cookies_to_expire(credentials: &Credentials, config: &WordPressConfig) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = FIXED_COOKIES.iter().map(|n| (*n).to_string()).collect();
    names.insert(config.auth_token_cookie.clone());
    names.insert(SESSION_COOKIE_NAME.to_string());

    names.extend(
        credentials
            .cookie_pairs()
            .map(|(name, _)| name)
            .filter(|name| COOKIE_PREFIXES.iter().any(|p| name.starts_with(p)))
            .map(str::to_owned),
    );

    names
}

/// `Set-Cookie` values expiring `name` on every path, host-only and on the
/// configured cookie domain.
fn expiring_cookies(name: &str, cookie_domain: Option<&str>) -> Vec<String> {
    let domains = std::iter::once(None).chain(cookie_domain.map(Some));

    domains
        .flat_map(|domain| {
            COOKIE_PATHS.iter().map(move |path| {
                let mut cookie = Cookie::build((name.to_string(), String::new()))
                    .path(*path)
                    .max_age(Duration::ZERO)
                    .expires(OffsetDateTime::UNIX_EPOCH);
                if let Some(domain) = domain {
                    cookie = cookie.domain(domain.to_string());
                }
                cookie.build().to_string()
            })
        })
        .collect()
}

fn method_not_allowed() -> Response {
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "success": false, "message": "Method not allowed" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST"));
    response
}

/// Log out of WordPress and clear every related cookie.
#[instrument(skip(state, session, headers), fields(method = %method))]
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    session: Session,
    headers: HeaderMap,
) -> Response {
    if method != Method::POST {
        return method_not_allowed();
    }

    let config = &state.config().wordpress;
    let credentials = Credentials::from_headers(&headers);

    let upstream_headers = match credentials
        .apply(state.http().get(config.logout_url()))
        .send()
        .await
    {
        Ok(response) => {
            if !response.status().is_success() && !response.status().is_redirection() {
                warn!(status = %response.status(), "WordPress logout returned an error status");
            }
            PassThroughHeaders::from_upstream(response.headers())
        }
        Err(e) => {
            warn!(error = %e, "WordPress logout request failed; clearing cookies anyway");
            PassThroughHeaders::default()
        }
    };

    if let Ok(Some(key)) = session.get::<String>(session_keys::CART_KEY).await {
        state.carts().clear(&key).await;
    }
    if let Err(e) = session.flush().await {
        warn!(error = %e, "Failed to clear storefront session");
    }
    clear_sentry_user();

    let names = cookies_to_expire(&credentials, config);
    let mut response = Json(json!({ "success": true })).into_response();
    upstream_headers.apply(response.headers_mut());
    response.headers_mut().remove(crate::upstream::WOO_SESSION_HEADER);

    for name in &names {
        for cookie in expiring_cookies(name, config.cookie_domain.as_deref()) {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => warn!(cookie = %name, error = %e, "Skipping unrepresentable cookie"),
            }
        }
    }

    info!(cookies = names.len(), "Logged out");
    response
}
