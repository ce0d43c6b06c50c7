//! Page, cart and JSON API tests against a stubbed WordPress.

use axum::body::Body;
use axum::http::StatusCode;
use pressfront_integration_tests::{TestContext, request};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const FORM: (&str, &str) = ("content-type", "application/x-www-form-urlencoded");
const HTMX: (&str, &str) = ("hx-request", "true");

fn product(id: i64, name: &str, price: Option<&str>, size: &str) -> Value {
    json!({
        "__typename": "SimpleProduct",
        "databaseId": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "onSale": false,
        "price": price,
        "productCategories": { "nodes": [{ "slug": "shirts", "name": "Shirts" }] },
        "allPaSize": { "nodes": [{ "slug": size.to_lowercase(), "name": size }] },
        "allPaColor": { "nodes": [] }
    })
}

async fn mount_operation(ctx: &TestContext, operation: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": operation })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&ctx.wordpress)
        .await;
}

async fn mount_catalog(ctx: &TestContext) {
    mount_operation(
        ctx,
        "GetProducts",
        json!({ "data": { "products": {
            "pageInfo": { "hasNextPage": false, "endCursor": null },
            "nodes": [
                product(1, "Linen Shirt", Some("$40.00"), "M"),
                product(2, "Cotton Tee", Some("$10.00 - $20.00"), "S"),
                product(3, "Mystery Box", None, "M"),
                product(4, "Wool Jumper", Some("&#36;65.00"), "L")
            ]
        }}}),
    )
    .await;
}

/// A WooGraphQL cart holding `quantity` linen shirts at $40.
fn cart(quantity: i64) -> Value {
    let nodes = if quantity > 0 {
        json!([{
            "key": "line-1",
            "quantity": quantity,
            "subtotal": format!("${}.00", quantity * 40),
            "product": { "node": {
                "databaseId": 1,
                "name": "Linen Shirt",
                "slug": "linen-shirt",
                "image": null
            }},
            "variation": null
        }])
    } else {
        json!([])
    };
    json!({
        "contents": { "itemCount": quantity, "nodes": nodes },
        "subtotal": format!("${}.00", quantity * 40),
        "totalTax": null,
        "shippingTotal": null,
        "total": format!("${}.00", quantity * 40)
    })
}

async fn mount_cart(ctx: &TestContext, quantity: i64) {
    mount_operation(ctx, "GetCart", json!({ "data": { "cart": cart(quantity) } })).await;
}

/// Respond to the cart mutation `operation` (`addToCart`, ...) with a cart of
/// `quantity` shirts.
async fn mount_mutation(ctx: &TestContext, operation: &str, field: &str, quantity: i64) {
    mount_operation(
        ctx,
        operation,
        json!({ "data": { field: { "cart": cart(quantity) } } }),
    )
    .await;
}

/// Add three shirts over HTMX and return the storefront session cookie.
async fn add_three_shirts(ctx: &TestContext) -> String {
    mount_mutation(ctx, "AddToCart", "addToCart", 3).await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/add",
            &[FORM, HTMX],
            Body::from("product_id=1&quantity=3"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    response.cookie("pf_session").unwrap()
}

async fn cart_count(ctx: &TestContext, cookie: &str) -> String {
    ctx.send(request("GET", "/cart/count", &[("cookie", cookie)], Body::empty()))
        .await
        .text()
}

fn ids(body: &Value) -> Vec<i64> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_api_products_excludes_unpriced_and_sorts() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx).await;

    let response = ctx
        .send(request("GET", "/api/products?sort=price-low", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(ids(&body), vec![2, 1, 4]);
    assert_eq!(body["excluded"], 1);
    assert_eq!(body["products"][0]["parsed_price"], "10.00");
}

#[tokio::test]
async fn test_api_products_applies_range_and_size() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx).await;

    let response = ctx
        .send(request(
            "GET",
            "/api/products?min_price=15&max_price=70&size=m",
            &[],
            Body::empty(),
        ))
        .await;

    assert_eq!(ids(&response.json()), vec![1]);
}

#[tokio::test]
async fn test_api_products_rejects_inverted_range() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request(
            "GET",
            "/api/products?min_price=50&max_price=10",
            &[],
            Body::empty(),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].as_str().unwrap().contains("invalid price range"));
}

#[tokio::test]
async fn test_api_search_is_empty_without_backend() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/api/search?q=shirt", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["query"], "shirt");
    assert_eq!(body["hits"], json!([]));
}

#[tokio::test]
async fn test_api_cart_returns_synced_cart() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 2).await;

    let response = ctx
        .send(request("GET", "/api/cart", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["items"][0]["key"], "line-1");
}

// ============================================================================
// Cart mutations
// ============================================================================

#[tokio::test]
async fn test_htmx_add_returns_badge_and_persists_in_session() {
    let ctx = TestContext::new().await;
    mount_mutation(&ctx, "AddToCart", "addToCart", 3).await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/add",
            &[FORM, HTMX],
            Body::from("product_id=1&quantity=3"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(response.text().contains(">3</span>"));

    let cookie = response.cookie("pf_session").unwrap();
    assert!(cart_count(&ctx, &cookie).await.contains(">3</span>"));

    // Without the cookie the badge belongs to a fresh, empty session.
    let anonymous = ctx
        .send(request("GET", "/cart/count", &[], Body::empty()))
        .await;
    assert!(anonymous.text().contains(">0</span>"));
}

#[tokio::test]
async fn test_add_sends_product_and_quantity() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "AddToCart",
            "variables": { "productId": 1, "quantity": 2, "variationId": 11 }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "addToCart": { "cart": cart(2) } } })),
        )
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/add",
            &[FORM, HTMX],
            Body::from("product_id=1&quantity=2&variation_id=11"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains(">2</span>"));
}

#[tokio::test]
async fn test_plain_form_add_redirects_to_cart() {
    let ctx = TestContext::new().await;
    mount_mutation(&ctx, "AddToCart", "addToCart", 3).await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/add",
            &[FORM],
            Body::from("product_id=1&quantity=3"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/cart"));
    assert!(response.header("hx-trigger").is_none());

    let cookie = response.cookie("pf_session").unwrap();
    assert!(cart_count(&ctx, &cookie).await.contains(">3</span>"));
}

#[tokio::test]
async fn test_cart_page_reuses_woocommerce_session_from_mutation() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": "AddToCart" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("woocommerce-session", "tok-1")
                .set_body_json(json!({ "data": { "addToCart": { "cart": cart(3) } } })),
        )
        .mount(&ctx.wordpress)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": "GetCart" })))
        .and(header("woocommerce-session", "Session tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "cart": cart(3) } })))
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let added = ctx
        .send(request(
            "POST",
            "/cart/add",
            &[FORM, HTMX],
            Body::from("product_id=1&quantity=3"),
        ))
        .await;
    let cookie = added.cookie("pf_session").unwrap();

    let page = ctx
        .send(request("GET", "/cart", &[("cookie", cookie.as_str())], Body::empty()))
        .await;

    assert_eq!(page.status, StatusCode::OK);
    let html = page.text();
    assert!(html.contains("Linen Shirt"));
    assert!(html.contains("$120.00"));
}

#[tokio::test]
async fn test_update_quantity_returns_items_fragment() {
    let ctx = TestContext::new().await;
    let cookie = add_three_shirts(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "UpdateItemQuantities",
            "variables": { "items": [{ "key": "line-1", "quantity": 2 }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updateItemQuantities": { "cart": cart(2) } }
        })))
        .expect(1)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/update",
            &[FORM, HTMX, ("cookie", cookie.as_str())],
            Body::from("key=line-1&quantity=2"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    let html = response.text();
    assert!(html.contains("id=\"cart-items\""));
    assert!(html.contains("$80.00"));
    assert!(cart_count(&ctx, &cookie).await.contains(">2</span>"));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    let cookie = add_three_shirts(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "operationName": "RemoveItemsFromCart",
            "variables": { "keys": ["line-1"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "removeItemsFromCart": { "cart": cart(0) } }
        })))
        .expect(1)
        .mount(&ctx.wordpress)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": "UpdateItemQuantities" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&ctx.wordpress)
        .await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/update",
            &[FORM, HTMX, ("cookie", cookie.as_str())],
            Body::from("key=line-1&quantity=0"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Your cart is empty"));
    assert!(cart_count(&ctx, &cookie).await.contains(">0</span>"));
}

#[tokio::test]
async fn test_remove_line_then_cart_page_is_empty() {
    let ctx = TestContext::new().await;
    let cookie = add_three_shirts(&ctx).await;
    mount_mutation(&ctx, "RemoveItemsFromCart", "removeItemsFromCart", 0).await;
    mount_cart(&ctx, 0).await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/remove",
            &[FORM, HTMX, ("cookie", cookie.as_str())],
            Body::from("key=line-1"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(response.text().contains("Your cart is empty"));
    assert!(cart_count(&ctx, &cookie).await.contains(">0</span>"));

    let page = ctx
        .send(request("GET", "/cart", &[("cookie", cookie.as_str())], Body::empty()))
        .await;
    assert!(page.text().contains("Your cart is empty"));
}

#[tokio::test]
async fn test_plain_form_remove_redirects_to_cart() {
    let ctx = TestContext::new().await;
    let cookie = add_three_shirts(&ctx).await;
    mount_mutation(&ctx, "RemoveItemsFromCart", "removeItemsFromCart", 0).await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/remove",
            &[FORM, ("cookie", cookie.as_str())],
            Body::from("key=line-1"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/cart"));
    assert!(cart_count(&ctx, &cookie).await.contains(">0</span>"));
}

#[tokio::test]
async fn test_failed_htmx_mutation_keeps_stored_cart() {
    let ctx = TestContext::new().await;
    let cookie = add_three_shirts(&ctx).await;
    mount_operation(
        &ctx,
        "RemoveItemsFromCart",
        json!({ "errors": [{ "message": "Cart item not found" }] }),
    )
    .await;

    let response = ctx
        .send(request(
            "POST",
            "/cart/remove",
            &[FORM, HTMX, ("cookie", cookie.as_str())],
            Body::from("key=missing"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.header("hx-trigger").is_none());
    assert!(cart_count(&ctx, &cookie).await.contains(">3</span>"));
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_shop_page_renders_listing() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx).await;
    mount_cart(&ctx, 0).await;

    let response = ctx.send(request("GET", "/shop", &[], Body::empty())).await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Linen Shirt"));
    assert!(html.contains("From $10.00"));
    assert!(!html.contains("Mystery Box"));
}

#[tokio::test]
async fn test_shop_page_survives_broken_backend() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<!DOCTYPE html><p>Maintenance</p>"),
        )
        .mount(&ctx.wordpress)
        .await;

    let response = ctx.send(request("GET", "/", &[], Body::empty())).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("temporarily unavailable"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_returns_to_cart() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;

    let response = ctx
        .send(request("GET", "/checkout", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/cart"));
}

#[tokio::test]
async fn test_checkout_with_items_goes_to_woocommerce() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 1).await;

    let response = ctx
        .send(request("GET", "/checkout", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let expected = format!("{}/checkout", ctx.wordpress.uri());
    assert_eq!(response.header("location"), Some(expected.as_str()));
}

#[tokio::test]
async fn test_account_requires_login() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;

    let response = ctx
        .send(request("GET", "/account", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/login?redirect=%2Faccount"));
}

#[tokio::test]
async fn test_account_renders_viewer_orders() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;
    mount_operation(
        &ctx,
        "GetAccount",
        json!({ "data": {
            "viewer": { "databaseId": 9, "name": "Ada Lovelace", "email": "ada@example.com" },
            "customer": { "orders": { "nodes": [{
                "databaseId": 77,
                "orderNumber": "1077",
                "date": "2026-02-14T09:30:00",
                "status": "COMPLETED",
                "total": "$40.00"
            }]}}
        }}),
    )
    .await;

    let response = ctx
        .send(request(
            "GET",
            "/account",
            &[("cookie", "wordpress_logged_in_abc=ada")],
            Body::empty(),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("#1077"));
    assert!(html.contains("Completed"));
}

#[tokio::test]
async fn test_login_redirects_to_wordpress() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/login?redirect=/account", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let expected = format!(
        "{}/wp-login.php?redirect_to=http%3A%2F%2Fshop.example.com%2Faccount",
        ctx.wordpress.uri()
    );
    assert_eq!(response.header("location"), Some(expected.as_str()));
}

#[tokio::test]
async fn test_login_returns_to_page_that_required_it() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;

    let bounced = ctx
        .send(request("GET", "/account?tab=orders", &[], Body::empty()))
        .await;
    assert_eq!(bounced.status, StatusCode::SEE_OTHER);
    let cookie = bounced.cookie("pf_session").unwrap();

    let response = ctx
        .send(request("GET", "/login", &[("cookie", cookie.as_str())], Body::empty()))
        .await;

    let location = response.header("location").unwrap();
    assert!(location.ends_with(
        "redirect_to=http%3A%2F%2Fshop.example.com%2Faccount%3Ftab%3Dorders"
    ));
}

#[tokio::test]
async fn test_login_ignores_offsite_redirect() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(request("GET", "/login?redirect=//evil.example", &[], Body::empty()))
        .await;

    let location = response.header("location").unwrap();
    assert!(location.ends_with("redirect_to=http%3A%2F%2Fshop.example.com%2F"));
}

#[tokio::test]
async fn test_unknown_path_renders_cms_page() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;
    mount_operation(
        &ctx,
        "GetPageByUri",
        json!({ "data": { "page": {
            "databaseId": 12,
            "title": "About us",
            "content": "<p>We print shirts.</p>",
            "uri": "/about/"
        }}}),
    )
    .await;

    let response = ctx.send(request("GET", "/about", &[], Body::empty())).await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("About us"));
    assert!(html.contains("<p>We print shirts.</p>"));
}

#[tokio::test]
async fn test_missing_cms_page_is_404() {
    let ctx = TestContext::new().await;
    mount_cart(&ctx, 0).await;
    mount_operation(&ctx, "GetPageByUri", json!({ "data": { "page": null } })).await;

    let response = ctx
        .send(request("GET", "/no-such-page", &[], Body::empty()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().contains("Page not found"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;
    mount_operation(
        &ctx,
        "Ping",
        json!({ "data": { "generalSettings": { "title": "Shop" } } }),
    )
    .await;

    let live = ctx.send(request("GET", "/health", &[], Body::empty())).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.text(), "ok");

    let ready = ctx
        .send(request("GET", "/health/ready", &[], Body::empty()))
        .await;
    assert_eq!(ready.status, StatusCode::OK);
}
