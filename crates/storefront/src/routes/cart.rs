//! Cart route handlers.
//!
//! Cart mutations go to WooCommerce and the returned cart replaces the
//! session's snapshot in the [`crate::cart::CartStore`]. HTMX requests get
//! fragments plus an `HX-Trigger: cart-updated` header; plain form posts are
//! redirected back to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use pressfront_core::Cart;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::cart::{cart_credentials, store_mutation_result};
use crate::error::{AppError, add_breadcrumb};
use crate::models::cart_key;
use crate::routes::view::{CartView, PageContext};
use crate::state::AppState;
use crate::upstream::Credentials;
use crate::wordpress::{AddToCartInput, CartLineUpdate, WithSession, WordPressError};

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some_and(|v| v == "true")
}

/// The session's stored cart.
async fn stored_cart(state: &AppState, session: &Session) -> std::sync::Arc<Cart> {
    match cart_key(session).await {
        Ok(key) => state.carts().get(&key).await,
        Err(e) => {
            warn!(error = %e, "No session available to read cart");
            std::sync::Arc::new(Cart::empty())
        }
    }
}

/// Response for a finished cart mutation.
///
/// `fragment` renders the HTMX reply from the updated cart.
fn mutation_response(
    headers: &HeaderMap,
    result: Result<Cart, WordPressError>,
    fragment: impl FnOnce(&Cart) -> Response,
) -> Response {
    match (result, is_htmx(headers)) {
        (Ok(cart), true) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            fragment(&cart),
        )
            .into_response(),
        (Ok(_), false) => Redirect::to("/cart").into_response(),
        (Err(e), true) => {
            tracing::error!(error = %e, "Cart update failed");
            (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"cart-error\">Could not update your cart</span>"),
            )
                .into_response()
        }
        (Err(e), false) => AppError::from(e).into_response(),
    }
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = stored_cart(&state, &session).await;
    CartShowTemplate {
        page: PageContext::load(&state, &session, "Cart").await,
        cart: CartView::from(cart.as_ref()),
    }
}

/// Add item to cart.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(input): Form<AddToCartInput>,
) -> Response {
    let product_id = input.product_id.to_string();
    let credentials = cart_credentials(&session, Credentials::from_headers(&headers)).await;
    let result = state.wordpress().add_to_cart(&credentials, input).await;
    let result = store_mutation_result(&state, &session, result).await;

    if result.is_ok() {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    }

    mutation_response(&headers, result, |cart| {
        CartCountTemplate {
            count: cart.item_count,
        }
        .into_response()
    })
}

/// Update cart line quantity. A quantity of zero removes the line.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartLineUpdate>,
) -> Response {
    let credentials = cart_credentials(&session, Credentials::from_headers(&headers)).await;
    let client = state.wordpress();

    let result: Result<WithSession<Cart>, WordPressError> = if form.quantity == 0 {
        client
            .remove_items(&credentials, std::slice::from_ref(&form.key))
            .await
    } else {
        client
            .update_item_quantities(&credentials, std::slice::from_ref(&form))
            .await
    };
    let result = store_mutation_result(&state, &session, result).await;

    if result.is_ok() {
        add_breadcrumb("cart", "Updated cart line", Some(&[("key", form.key.as_str())]));
    }

    mutation_response(&headers, result, |cart| {
        CartItemsTemplate {
            cart: CartView::from(cart),
        }
        .into_response()
    })
}

/// Remove item from cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let credentials = cart_credentials(&session, Credentials::from_headers(&headers)).await;
    let result = state
        .wordpress()
        .remove_items(&credentials, std::slice::from_ref(&form.key))
        .await;
    let result = store_mutation_result(&state, &session, result).await;

    if result.is_ok() {
        add_breadcrumb("cart", "Removed from cart", Some(&[("key", form.key.as_str())]));
    }

    mutation_response(&headers, result, |cart| {
        CartItemsTemplate {
            cart: CartView::from(cart),
        }
        .into_response()
    })
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: stored_cart(&state, &session).await.item_count,
    }
}

/// Redirect to the WooCommerce checkout, or back to the cart when it is empty.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Redirect {
    if stored_cart(&state, &session).await.is_empty() {
        return Redirect::to("/cart");
    }
    Redirect::to(&state.config().wordpress.checkout_url())
}
