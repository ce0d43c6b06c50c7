//! WordPress GraphQL client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Catalog data and CMS pages are cached in
//! `moka` (5-minute TTL); cart and account calls forward the browser's
//! credentials and are never cached.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header;
use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use pressfront_core::{Cart, Product};
use tracing::{debug, instrument, warn};

use crate::config::WordPressConfig;
use crate::upstream::{self, Credentials, PassThroughHeaders, UpstreamPayload};

use super::cache::{CacheValue, page_key, product_key, products_key};
use super::conversions::{
    convert_cart, convert_order, convert_page, convert_product, convert_product_detail,
    convert_viewer,
};
use super::queries::{
    AddToCart, GetAccount, GetCart, GetPageByUri, GetProductBySlug, GetProducts, Ping,
    RemoveItemsFromCart, UpdateItemQuantities, add_to_cart, get_account, get_cart,
    get_page_by_uri, get_product_by_slug, get_products, ping, remove_items_from_cart,
    update_item_quantities,
};
use super::types::{Account, AddToCartInput, CartLineUpdate, Page, ProductDetail, WithSession};
use super::{GraphQLError, WordPressError, format_graphql_errors};

/// Products requested per page when walking the catalog.
const PAGE_SIZE: i64 = 100;

/// Upper bound on catalog pages fetched for one listing.
const MAX_PAGES: usize = 10;

/// Orders shown on the account page.
const ORDER_HISTORY_LEN: i64 = 20;

// =============================================================================
// WordPressClient
// =============================================================================

/// Client for the WPGraphQL endpoint.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct WordPressClient {
    inner: Arc<WordPressClientInner>,
}

struct WordPressClientInner {
    http: reqwest::Client,
    endpoint: String,
    cache: Cache<String, CacheValue>,
}

impl WordPressClient {
    /// Create a new client sharing the given HTTP client.
    #[must_use]
    pub fn new(config: &WordPressConfig, http: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            inner: Arc::new(WordPressClientInner {
                http,
                endpoint: config.graphql_url.clone(),
                cache,
            }),
        }
    }

    /// GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    ///
    /// Partial responses (data plus errors) are logged and the data is used.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
        credentials: Option<&Credentials>,
    ) -> Result<WithSession<Q::ResponseData>, WordPressError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;

        let mut request = self.inner.http.post(&self.inner.endpoint).json(&request_body);
        if let Some(credentials) = credentials {
            request = credentials.apply(request);
        }

        let response = request.send().await?;
        let status = response.status();
        let session = PassThroughHeaders::from_upstream(response.headers()).woo_session();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        let body = match upstream::classify(status, content_type.as_deref(), &bytes) {
            UpstreamPayload::Json { body, .. } => body,
            UpstreamPayload::ParseError { status, snippet } => {
                tracing::error!(
                    operation,
                    status = %status,
                    body = %snippet,
                    "WordPress returned a non-JSON response; check WORDPRESS_GRAPHQL_URL"
                );
                return Err(WordPressError::InvalidResponse {
                    status: status.as_u16(),
                    snippet,
                });
            }
            UpstreamPayload::UpstreamError { message } => {
                return Err(WordPressError::GraphQL(vec![GraphQLError::message(message)]));
            }
        };

        let response: Response<Q::ResponseData> = serde_json::from_value(body).map_err(|e| {
            tracing::error!(
                operation,
                error = %e,
                "Failed to parse WordPress GraphQL response"
            );
            WordPressError::Parse(e)
        })?;

        let errors: Vec<GraphQLError> = response
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(GraphQLError::from)
            .collect();

        match response.data {
            Some(data) => {
                if !errors.is_empty() {
                    warn!(
                        operation,
                        errors = %format_graphql_errors(&errors),
                        "GraphQL response carried errors alongside data"
                    );
                }
                Ok(WithSession {
                    value: data,
                    session,
                })
            }
            None if !errors.is_empty() => {
                debug!(operation, errors = ?errors, "GraphQL errors in response");
                Err(WordPressError::GraphQL(errors))
            }
            None => {
                tracing::error!(
                    operation,
                    status = %status,
                    "WordPress GraphQL response has no data and no errors"
                );
                Err(WordPressError::GraphQL(vec![GraphQLError::message(format!(
                    "HTTP {status}: no data in response"
                ))]))
            }
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get every published product, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, WordPressError> {
        let cache_key = products_key();
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut products = Vec::new();
        let mut after = None;

        for _ in 0..MAX_PAGES {
            let variables = get_products::Variables {
                first: PAGE_SIZE,
                after: after.take(),
            };
            let data = self.execute::<GetProducts>(variables, None).await?.value;
            let Some(page) = data.products else {
                break;
            };

            let fetched = page.nodes.len();
            products.extend(page.nodes.into_iter().filter_map(convert_product));
            debug!(fetched, total = products.len(), "Fetched product page");

            match page.page_info.end_cursor {
                Some(cursor) if page.page_info.has_next_page => after = Some(cursor),
                _ => break,
            }
        }

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `WordPressError::NotFound` if no product has the slug.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<ProductDetail, WordPressError> {
        let cache_key = product_key(slug);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_slug::Variables {
            slug: slug.to_string(),
        };
        let data = self.execute::<GetProductBySlug>(variables, None).await?.value;

        let product = data
            .product
            .and_then(convert_product_detail)
            .ok_or_else(|| WordPressError::NotFound(format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart for the session identified by `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend has no cart.
    #[instrument(skip(self, credentials))]
    pub async fn get_cart(
        &self,
        credentials: &Credentials,
    ) -> Result<WithSession<Cart>, WordPressError> {
        let response = self
            .execute::<GetCart>(get_cart::Variables {}, Some(credentials))
            .await?;
        let cart = response
            .value
            .cart
            .ok_or_else(|| WordPressError::NotFound("Cart not found".to_string()))?;
        Ok(WithSession {
            value: convert_cart(cart),
            session: response.session,
        })
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails.
    #[instrument(skip(self, credentials), fields(product_id = %input.product_id))]
    pub async fn add_to_cart(
        &self,
        credentials: &Credentials,
        input: AddToCartInput,
    ) -> Result<WithSession<Cart>, WordPressError> {
        let variables = add_to_cart::Variables {
            product_id: input.product_id.as_i64(),
            quantity: Some(i64::from(input.quantity.max(1))),
            variation_id: input.variation_id.map(|v| v.as_i64()),
        };
        let response = self
            .execute::<AddToCart>(variables, Some(credentials))
            .await?;
        mutation_cart(response.map(|data| data.add_to_cart.and_then(|payload| payload.cart)))
    }

    /// Set quantities for existing cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails.
    #[instrument(skip(self, credentials, updates), fields(lines = updates.len()))]
    pub async fn update_item_quantities(
        &self,
        credentials: &Credentials,
        updates: &[CartLineUpdate],
    ) -> Result<WithSession<Cart>, WordPressError> {
        let variables = update_item_quantities::Variables {
            items: updates
                .iter()
                .map(|u| update_item_quantities::CartItemQuantityInput {
                    key: u.key.clone(),
                    quantity: i64::from(u.quantity),
                })
                .collect(),
        };
        let response = self
            .execute::<UpdateItemQuantities>(variables, Some(credentials))
            .await?;
        mutation_cart(
            response.map(|data| data.update_item_quantities.and_then(|payload| payload.cart)),
        )
    }

    /// Remove cart lines by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails.
    #[instrument(skip(self, credentials, keys), fields(lines = keys.len()))]
    pub async fn remove_items(
        &self,
        credentials: &Credentials,
        keys: &[String],
    ) -> Result<WithSession<Cart>, WordPressError> {
        let variables = remove_items_from_cart::Variables {
            keys: keys.to_vec(),
        };
        let response = self
            .execute::<RemoveItemsFromCart>(variables, Some(credentials))
            .await?;
        mutation_cart(
            response.map(|data| data.remove_items_from_cart.and_then(|payload| payload.cart)),
        )
    }

    // =========================================================================
    // Content and account
    // =========================================================================

    /// Resolve a CMS page by URI. Missing pages are `Ok(None)` and not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(uri = %uri))]
    pub async fn get_page(&self, uri: &str) -> Result<Option<Page>, WordPressError> {
        let cache_key = page_key(uri);
        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for page");
            return Ok(Some(*page));
        }

        let variables = get_page_by_uri::Variables {
            uri: uri.to_string(),
        };
        let data = self.execute::<GetPageByUri>(variables, None).await?.value;

        let Some(page) = data.page.map(convert_page) else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(Box::new(page.clone())))
            .await;

        Ok(Some(page))
    }

    /// Load the logged-in viewer and their recent orders.
    ///
    /// Returns `Ok(None)` when WordPress does not recognise the credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, credentials))]
    pub async fn get_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Account>, WordPressError> {
        let variables = get_account::Variables {
            first: ORDER_HISTORY_LEN,
        };
        let data = self
            .execute::<GetAccount>(variables, Some(credentials))
            .await?
            .value;

        let Some(viewer) = data.viewer else {
            return Ok(None);
        };

        let orders = data
            .customer
            .and_then(|c| c.orders)
            .map(|o| o.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(convert_order)
            .collect();

        Ok(Some(Account {
            viewer: convert_viewer(viewer),
            orders,
        }))
    }

    /// Run a trivial query to check the endpoint is reachable and speaks GraphQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not answer with GraphQL JSON.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), WordPressError> {
        self.execute::<Ping>(ping::Variables {}, None).await?;
        Ok(())
    }
}

/// Unwrap the cart a mutation payload returned.
fn mutation_cart<C: Into<Cart>>(
    response: WithSession<Option<C>>,
) -> Result<WithSession<Cart>, WordPressError> {
    let session = response.session;
    let cart = response
        .value
        .ok_or_else(|| WordPressError::NotFound("Mutation returned no cart".to_string()))?;
    Ok(WithSession {
        value: convert_cart(cart),
        session,
    })
}
