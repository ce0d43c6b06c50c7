//! GraphQL proxy.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, instrument};

use crate::state::AppState;
use crate::upstream::{self, Credentials, Upstream, UpstreamPayload};

/// GraphQL-style error envelope: `{"errors":[{"message", "extensions"?}]}`.
fn error_envelope(status: StatusCode, message: &str, extensions: Option<Value>) -> Response {
    let mut error = json!({ "message": message });
    if let Some(extensions) = extensions {
        error["extensions"] = extensions;
    }
    (status, Json(json!({ "errors": [error] }))).into_response()
}

/// Forward a GraphQL request to WordPress.
#[instrument(skip(state, headers, body), fields(method = %method))]
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        let mut response = error_envelope(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed. Use POST for GraphQL requests.",
            None,
        );
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let request = state
        .http()
        .post(&state.config().wordpress.graphql_url)
        .header(header::CONTENT_TYPE, content_type)
        .body(body);
    let request = Credentials::from_headers(&headers).apply(request);

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
                "GraphQL endpoint returned a non-JSON response"
            );
            error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The GraphQL endpoint returned an invalid response. Check the WordPress GraphQL URL configuration.",
                Some(json!({
                    "code": "INVALID_UPSTREAM_RESPONSE",
                    "upstreamStatus": status.as_u16(),
                })),
            )
        }
        UpstreamPayload::UpstreamError { message } => {
            error!(error = %message, "GraphQL endpoint unreachable");
            error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                &message,
                Some(json!({ "code": "UPSTREAM_UNAVAILABLE" })),
            )
        }
    };

    upstream.headers.apply(response.headers_mut());
    response
}
