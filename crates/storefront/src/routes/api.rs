//! JSON API route handlers.
//!
//! Read-only JSON views of the catalog, the session cart and search, for
//! client-side widgets. The GraphQL and BuddyPress proxies live in
//! [`crate::proxy`].

use axum::{
    Json,
    extract::{Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use pressfront_core::filter::{self, Facets, Listing};
use pressfront_core::Cart;
use serde::Serialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{cart_credentials, sync_cart};
use crate::error::AppError;
use crate::models::{cart_key, store_woo_session};
use crate::routes::products::{filter_state, run_filter};
use crate::routes::search::SearchQuery;
use crate::search::SearchResults;
use crate::state::AppState;
use crate::upstream::Credentials;

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Listing>,
    /// Number of products left out for lack of a usable price.
    pub excluded: usize,
    pub facets: Facets,
}

/// Filtered product listing.
///
/// Accepts the same query string as the shop page; malformed filters are a
/// 400 with `{"error": "..."}`.
#[instrument(skip(state, query))]
pub async fn products(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let selections = match filter_state(query.as_deref()) {
        Ok(selections) => selections,
        Err(e) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response());
        }
    };

    let catalog = state.wordpress().get_products().await?;
    let outcome = run_filter(&state, &catalog, &selections);

    Ok(Json(ProductsResponse {
        excluded: outcome.excluded.len(),
        products: outcome.products,
        facets: filter::facets(&catalog),
    })
    .into_response())
}

/// The session's cart, refreshed from WooCommerce.
///
/// A failed refresh returns the last stored cart.
#[instrument(skip(state, session, headers))]
pub async fn cart(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<Cart>, AppError> {
    let key = cart_key(&session).await?;
    let credentials = cart_credentials(&session, Credentials::from_headers(&headers)).await;

    if let Some(woo) = sync_cart(state.wordpress(), state.carts(), &key, &credentials).await {
        store_woo_session(&session, &woo).await?;
    }

    Ok(Json(state.carts().get(&key).await.as_ref().clone()))
}

/// Product search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, AppError> {
    Ok(Json(state.search().search(&query.q, query.limit()).await?))
}
