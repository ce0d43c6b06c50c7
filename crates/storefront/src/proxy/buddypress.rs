//! `BuddyPress` REST proxy.
//!
//! Forwards to `{WORDPRESS_URL}/wp-json/buddypress/v1/{route}` with the
//! browser's cookies and a bearer token. The token comes from the request's
//! `Authorization` header, or else from the configured auth-token cookie.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, instrument};

use crate::config::WordPressConfig;
use crate::state::AppState;
use crate::upstream::{self, Credentials, Upstream, UpstreamPayload};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

/// WordPress REST-style error: `{"code","message","data":{"status"}}`.
fn wp_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "code": code,
            "message": message,
            "data": { "status": status.as_u16() },
        })),
    )
        .into_response()
}

/// Build the upstream URL, rejecting routes that climb out of the namespace.
fn upstream_url(config: &WordPressConfig, route: &str, query: Option<&str>) -> Option<String> {
    let route = route.trim_matches('/');
    if route.split('/').any(|segment| segment == ".." || segment == ".") {
        return None;
    }

    let mut url = format!("{}/{route}", config.buddypress_url());
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    Some(url)
}

/// Credentials with a bearer token derived from the auth-token cookie when
/// the request has no `Authorization` header.
fn with_bearer(mut credentials: Credentials, auth_token_cookie: &str) -> Credentials {
    if credentials.authorization.is_none() {
        credentials.authorization = credentials
            .cookie(auth_token_cookie)
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"));
    }
    credentials
}

/// Forward a `BuddyPress` REST request.
#[instrument(skip(state, headers, body), fields(method = %method, route = %route))]
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    Path(route): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !matches!(
        method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE
    ) {
        let mut response = wp_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "rest_no_route",
            "Method not allowed",
        );
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        return response;
    }

    let config = &state.config().wordpress;
    let Some(url) = upstream_url(config, &route, query.as_deref()) else {
        return wp_error(StatusCode::BAD_REQUEST, "rest_invalid_route", "Invalid route");
    };

    let credentials = with_bearer(Credentials::from_headers(&headers), &config.auth_token_cookie);

    let mut request = state.http().request(method.clone(), &url);
    if method != Method::GET && !body.is_empty() {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        request = request.header(header::CONTENT_TYPE, content_type).body(body);
    }
    let request = credentials.apply(request);

    respond(upstream::receive(request.send().await).await)
}

/// Turn a classified upstream reply into the proxy response.
pub fn respond(upstream: Upstream) -> Response {
    let mut response = match upstream.payload {
        UpstreamPayload::Json { status, body } => (status, Json(body)).into_response(),
        UpstreamPayload::ParseError { status, snippet } => {
            error!(
                upstream_status = %status,
                body = %snippet,
                "BuddyPress returned a non-JSON response"
            );
            wp_error(
                StatusCode::BAD_GATEWAY,
                "invalid_upstream_response",
                "BuddyPress returned an invalid response",
            )
        }
        UpstreamPayload::UpstreamError { message } => {
            error!(error = %message, "BuddyPress unreachable");
            wp_error(StatusCode::BAD_GATEWAY, "upstream_unavailable", &message)
        }
    };

    upstream.headers.apply(response.headers_mut());
    response
}
