//! Boundary between the storefront and the WordPress backend.
//!
//! Every reply from WordPress passes through [`classify`], which turns the
//! raw status/content-type/body triple into an explicit [`UpstreamPayload`].
//! Callers match on the variant instead of sniffing bodies themselves:
//!
//! - [`UpstreamPayload::Json`] - a JSON document, with the upstream status
//! - [`UpstreamPayload::ParseError`] - HTML error pages, PHP notices, or
//!   anything else that is not JSON (usually a misconfigured endpoint)
//! - [`UpstreamPayload::UpstreamError`] - the request never produced a reply
//!
//! [`Credentials`] carries the browser's cookies and auth headers to
//! WordPress, and [`PassThroughHeaders`] carries `Set-Cookie` and the
//! refreshed WooCommerce session back.

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use serde_json::Value;

/// Header WooGraphQL uses to identify a guest or customer cart session.
pub const WOO_SESSION_HEADER: &str = "woocommerce-session";

/// Maximum number of body characters kept for diagnostics.
const SNIPPET_LEN: usize = 200;

/// Classified upstream reply.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    /// Parsed JSON body with the upstream status code.
    Json { status: StatusCode, body: Value },
    /// The body was not JSON. `snippet` is for logs only.
    ParseError { status: StatusCode, snippet: String },
    /// No reply: connection refused, DNS failure, timeout.
    UpstreamError { message: String },
}

impl UpstreamPayload {
    /// Short label for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::ParseError { .. } => "parse_error",
            Self::UpstreamError { .. } => "upstream_error",
        }
    }
}

/// Classify an upstream reply.
///
/// A body that starts with `<` (`<!DOCTYPE html>`, `<html>`, `<br />` from a
/// PHP warning) or a `text/html` content type is never treated as JSON, even
/// when it happens to parse. An empty body is `null`.
#[must_use]
pub fn classify(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> UpstreamPayload {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim_start();

    let declared_html = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));
    if declared_html || trimmed.starts_with('<') {
        return UpstreamPayload::ParseError {
            status,
            snippet: snippet(trimmed),
        };
    }

    if trimmed.is_empty() {
        return UpstreamPayload::Json {
            status,
            body: Value::Null,
        };
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(body) => UpstreamPayload::Json { status, body },
        Err(_) => UpstreamPayload::ParseError {
            status,
            snippet: snippet(trimmed),
        },
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

/// A classified reply together with the headers to hand back to the browser.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub payload: UpstreamPayload,
    pub headers: PassThroughHeaders,
}

/// Read a `reqwest` result into a classified [`Upstream`].
pub async fn receive(result: Result<reqwest::Response, reqwest::Error>) -> Upstream {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            return Upstream {
                payload: UpstreamPayload::UpstreamError {
                    message: describe_reqwest_error(&e),
                },
                headers: PassThroughHeaders::default(),
            };
        }
    };

    let status = response.status();
    let headers = PassThroughHeaders::from_upstream(response.headers());
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let payload = match response.bytes().await {
        Ok(body) => classify(status, content_type.as_deref(), &body),
        Err(e) => UpstreamPayload::UpstreamError {
            message: describe_reqwest_error(&e),
        },
    };

    Upstream { payload, headers }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "WordPress backend timed out".to_string()
    } else if e.is_connect() {
        "Could not connect to WordPress backend".to_string()
    } else {
        format!("WordPress backend request failed: {e}")
    }
}

/// Response headers propagated from WordPress to the browser unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassThroughHeaders {
    /// Every `Set-Cookie` header, in order.
    pub set_cookies: Vec<HeaderValue>,
    /// Refreshed WooCommerce session token.
    pub woo_session: Option<HeaderValue>,
}

impl PassThroughHeaders {
    /// Collect the headers worth forwarding from an upstream response.
    #[must_use]
    pub fn from_upstream(headers: &HeaderMap) -> Self {
        Self {
            set_cookies: headers.get_all(header::SET_COOKIE).iter().cloned().collect(),
            woo_session: headers.get(WOO_SESSION_HEADER).cloned(),
        }
    }

    /// Append the collected headers to an outgoing response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for cookie in &self.set_cookies {
            headers.append(header::SET_COOKIE, cookie.clone());
        }
        if let Some(session) = &self.woo_session {
            headers.insert(WOO_SESSION_HEADER, session.clone());
        }
    }

    /// The refreshed WooCommerce session header value, if any.
    #[must_use]
    pub fn woo_session(&self) -> Option<String> {
        self.woo_session
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .map(session_header_value)
    }
}

/// Normalize a WooCommerce session token into the request header form
/// (`Session <token>`).
#[must_use]
pub fn session_header_value(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Session ") {
        token.to_string()
    } else {
        format!("Session {token}")
    }
}

/// Browser credentials forwarded to WordPress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Raw `Cookie` header.
    pub cookie: Option<String>,
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
    /// `woocommerce-session` header value (`Session <token>`).
    pub woo_session: Option<String>,
}

impl Credentials {
    /// Pick the forwarded headers out of an incoming request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        Self {
            cookie: get(header::COOKIE.as_str()),
            authorization: get(header::AUTHORIZATION.as_str()),
            woo_session: get(WOO_SESSION_HEADER),
        }
    }

    /// Use `session` as the WooCommerce session unless the request carried one.
    #[must_use]
    pub fn with_fallback_session(mut self, session: Option<String>) -> Self {
        if self.woo_session.is_none() {
            self.woo_session = session;
        }
        self
    }

    /// Look up a cookie by name in the forwarded `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookie_pairs()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Iterate over `(name, value)` pairs in the forwarded `Cookie` header.
    pub fn cookie_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookie
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then_some((name, value.trim()))
            })
    }

    /// Whether the browser holds a WordPress login cookie or bearer token.
    #[must_use]
    pub fn is_logged_in(&self, auth_token_cookie: &str) -> bool {
        self.authorization.is_some()
            || self.cookie(auth_token_cookie).is_some()
            || self
                .cookie_pairs()
                .any(|(name, _)| name.starts_with("wordpress_logged_in_"))
    }

    /// Attach the credentials to an outgoing request.
    #[must_use]
    pub fn apply(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(authorization) = &self.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        if let Some(session) = &self.woo_session {
            builder = builder.header(WOO_SESSION_HEADER, session);
        }
        builder
    }
}
