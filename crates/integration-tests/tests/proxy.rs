//! Proxy route tests against a stubbed WordPress.

use axum::body::Body;
use axum::http::StatusCode;
use pressfront_integration_tests::{COOKIE_DOMAIN, TestContext, request};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const QUERY: &str = r#"{"query":"{ generalSettings { title } }"}"#;

// ============================================================================
// GraphQL
// ============================================================================

#[tokio::test]
async fn test_graphql_rejects_get_with_allow_header() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/graphql", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header("allow"), Some("POST"));
    assert!(response.json()["errors"][0]["message"].is_string());
}

#[tokio::test]
async fn test_graphql_passes_json_and_headers_through() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("cookie", "wordpress_logged_in_abc=u1"))
        .and(header("woocommerce-session", "Session old"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "woocommerce_items_in_cart=1; Path=/")
                .append_header("set-cookie", "wp_woocommerce_session_abc=s; Path=/; HttpOnly")
                .insert_header("woocommerce-session", "Session fresh")
                .set_body_json(json!({ "data": { "generalSettings": { "title": "Shop" } } })),
        )
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/api/graphql",
            &[
                ("content-type", "application/json"),
                ("cookie", "wordpress_logged_in_abc=u1"),
                ("woocommerce-session", "Session old"),
            ],
            Body::from(QUERY),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["generalSettings"]["title"], "Shop");

    let cookies = response.set_cookies();
    assert!(cookies.contains(&"woocommerce_items_in_cart=1; Path=/"));
    assert!(cookies.contains(&"wp_woocommerce_session_abc=s; Path=/; HttpOnly"));
    assert_eq!(response.header("woocommerce-session"), Some("Session fresh"));
}

#[tokio::test]
async fn test_graphql_html_upstream_is_never_forwarded() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("content-type", "text/html; charset=UTF-8")
                .set_body_string("<!DOCTYPE html><html><body>Page not found</body></html>"),
        )
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/api/graphql",
            &[("content-type", "application/json")],
            Body::from(QUERY),
        ))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.text().contains("<!DOCTYPE"));

    let body = response.json();
    let extensions = &body["errors"][0]["extensions"];
    assert_eq!(extensions["code"], "INVALID_UPSTREAM_RESPONSE");
    assert_eq!(extensions["upstreamStatus"], 404);
}

#[tokio::test]
async fn test_graphql_graphql_errors_keep_upstream_status() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Cannot query field \"nope\"" }]
        })))
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request("POST", "/api/graphql", &[], Body::from(QUERY)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["errors"][0]["message"],
        "Cannot query field \"nope\""
    );
}

// ============================================================================
// BuddyPress
// ============================================================================

#[tokio::test]
async fn test_buddypress_derives_bearer_from_auth_cookie() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/buddypress/v1/members"))
        .and(query_param("per_page", "5"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Ada" }])))
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "GET",
            "/api/buddypress/members?per_page=5",
            &[("cookie", "pf-auth-token=tok123; theme=dark")],
            Body::empty(),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()[0]["name"], "Ada");
}

#[tokio::test]
async fn test_buddypress_returns_backend_status_verbatim() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/buddypress/v1/activity"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "bp_rest_authorization_required",
            "message": "Sorry, you are not allowed to create activities.",
            "data": { "status": 401 }
        })))
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/api/buddypress/activity",
            &[("content-type", "application/json")],
            Body::from(r#"{"content":"hi"}"#),
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], "bp_rest_authorization_required");
}

#[tokio::test]
async fn test_buddypress_html_reply_is_bad_gateway() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/buddypress/v1/groups"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>There has been a critical error</body></html>"),
        )
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request("GET", "/api/buddypress/groups", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.json();
    assert_eq!(body["code"], "invalid_upstream_response");
    assert_eq!(body["data"]["status"], 502);
}

#[tokio::test]
async fn test_buddypress_rejects_patch() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("PATCH", "/api/buddypress/members/1", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header("allow"), Some("GET, POST, PUT, DELETE"));
    assert_eq!(response.json()["data"]["status"], 405);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_expires_wordpress_cookies() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/wp-login.php"))
        .and(query_param("action", "logout"))
        .respond_with(
            ResponseTemplate::new(302)
                .append_header("set-cookie", "wordpress_test_cookie=WP%20Cookie%20check; Path=/"),
        )
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/api/logout",
            &[(
                "cookie",
                "wordpress_logged_in_abc=u1; wp_woocommerce_session_abc=s1; theme=dark",
            )],
            Body::empty(),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "success": true }));

    let cookies = response.set_cookies();
    assert!(cookies.contains(&"wordpress_test_cookie=WP%20Cookie%20check; Path=/"));

    let expired = |name: &str| {
        cookies
            .iter()
            .filter(|c| c.starts_with(&format!("{name}=")) && c.contains("Max-Age=0"))
            .count()
    };
    // Three paths, host-only and on the cookie domain.
    assert_eq!(expired("wordpress_logged_in_abc"), 6);
    assert_eq!(expired("wp_woocommerce_session_abc"), 6);
    assert_eq!(expired("woocommerce_items_in_cart"), 6);
    assert_eq!(expired("theme"), 0);

    let domain = COOKIE_DOMAIN.trim_start_matches('.');
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("wordpress_logged_in_abc=") && c.contains(&format!("Domain={domain}")))
    );
    assert!(cookies.iter().any(|c| c.contains("Path=/wp-content/plugins")));
}

#[tokio::test]
async fn test_logout_survives_unreachable_wordpress() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/wp-login.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/api/logout",
            &[("cookie", "wordpress_logged_in_abc=u1")],
            Body::empty(),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.set_cookies().is_empty());
}

#[tokio::test]
async fn test_logout_rejects_get() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/logout", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header("allow"), Some("POST"));
}
