//! Authentication extractor.
//!
//! Login state lives in WordPress: a `wordpress_logged_in_*` cookie or the
//! configured auth-token cookie. [`RequireViewer`] only checks that one is
//! present; handlers still ask WordPress who the viewer is and treat an
//! unknown viewer the same way.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::models::set_return_to;
use crate::state::AppState;
use crate::upstream::Credentials;

/// Extractor that requires WordPress login credentials.
///
/// If the shopper is not logged in, the current path is stored in the session
/// and the request is redirected to `/login?redirect=<path>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireViewer(credentials): RequireViewer) -> impl IntoResponse {
///     // forward `credentials` to WordPress
/// }
/// ```
pub struct RequireViewer(pub Credentials);

/// Rejection when login is required.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login route (for page requests).
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(return_to) => Redirect::to(&login_path(&return_to)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// `/login?redirect=<return_to>`.
#[must_use]
pub fn login_path(return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("/login?redirect={encoded}")
}

/// Remember `return_to` and build the login redirect.
pub async fn redirect_to_login(session: Option<&Session>, return_to: &str) -> AuthRejection {
    if let Some(session) = session
        && let Err(e) = set_return_to(session, return_to).await
    {
        warn!(error = %e, "Failed to store return path");
    }
    AuthRejection::RedirectToLogin(return_to.to_string())
}

impl FromRequestParts<AppState> for RequireViewer {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = Credentials::from_headers(&parts.headers);
        if credentials.is_logged_in(&state.config().wordpress.auth_token_cookie) {
            return Ok(Self(credentials));
        }

        if parts.uri.path().starts_with("/api/") {
            return Err(AuthRejection::Unauthorized);
        }

        let return_to = parts
            .uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string());
        Err(redirect_to_login(parts.extensions.get::<Session>(), &return_to).await)
    }
}
